pub mod base;
pub mod configs;
pub mod factory;
pub mod marker;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod utils;
