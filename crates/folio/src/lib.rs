pub mod agent;
pub mod cards;
pub mod content;
pub mod errors;
pub mod models;
pub mod prompt_template;
pub mod providers;
pub mod tools;
