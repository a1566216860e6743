use super::{
    base::TextGenerationProvider,
    configs::{GoogleProviderConfig, GroqProviderConfig, ProviderConfig},
    google::GoogleProvider,
    groq::GroqProvider,
};
use crate::errors::ProviderError;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(EnumIter, EnumString, Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ProviderType {
    Groq,
    Google,
}

impl ProviderType {
    /// Model used when a caller names only the provider
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Groq => "llama-3.3-70b-versatile",
            ProviderType::Google => "gemini-2.5-flash",
        }
    }

    /// Environment variable holding this provider's API key
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderType::Groq => "GROQ_API_KEY",
            ProviderType::Google => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }

    pub fn config_from_env(&self) -> Result<ProviderConfig, ProviderError> {
        Ok(match self {
            ProviderType::Groq => ProviderConfig::Groq(GroqProviderConfig::from_env()?),
            ProviderType::Google => ProviderConfig::Google(GoogleProviderConfig::from_env()?),
        })
    }
}

pub fn get_provider(
    config: ProviderConfig,
) -> Result<Box<dyn TextGenerationProvider>, ProviderError> {
    match config {
        ProviderConfig::Groq(groq_config) => Ok(Box::new(GroqProvider::new(groq_config)?)),
        ProviderConfig::Google(google_config) => Ok(Box::new(GoogleProvider::new(google_config)?)),
    }
}
