use strum_macros::EnumIter;

use super::base::Provider;
use super::configs::ProviderConfig;
use super::ollama::OllamaProvider;
use super::openai::OpenAiProvider;
use crate::errors::ProviderError;

#[derive(EnumIter, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    OpenAi,
    Ollama,
}

/// Build the one active provider from the resolved configuration.
pub fn get_provider(config: ProviderConfig) -> Result<Box<dyn Provider>, ProviderError> {
    match config {
        ProviderConfig::OpenAi(openai_config) => Ok(Box::new(OpenAiProvider::new(openai_config)?)),
        ProviderConfig::Ollama(ollama_config) => Ok(Box::new(OllamaProvider::new(ollama_config)?)),
    }
}
