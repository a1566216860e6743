use std::env;

use crate::errors::ProviderError;

pub const GROQ_HOST: &str = "https://api.groq.com";
pub const GOOGLE_HOST: &str = "https://generativelanguage.googleapis.com";

// Unified enum to wrap different provider configurations
#[derive(Debug, Clone)]
pub enum ProviderConfig {
    Groq(GroqProviderConfig),
    Google(GoogleProviderConfig),
}

#[derive(Clone)]
pub struct GroqProviderConfig {
    pub host: String,
    pub api_key: String,
}

#[derive(Clone)]
pub struct GoogleProviderConfig {
    pub host: String,
    pub api_key: String,
}

// Keys stay out of debug output
impl std::fmt::Debug for GroqProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqProviderConfig")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for GoogleProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleProviderConfig")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}

impl GroqProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        Self { host, api_key }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = get_env("GROQ_API_KEY", true, None)?
            .ok_or_else(|| ProviderError::Configuration("Groq API key should be present".into()))?;
        let host = get_env("GROQ_API_HOST", false, Some(GROQ_HOST.to_string()))?
            .unwrap_or_else(|| GROQ_HOST.to_string());

        Ok(Self::new(host, api_key))
    }
}

impl GoogleProviderConfig {
    pub fn new(host: String, api_key: String) -> Self {
        Self { host, api_key }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = get_env("GOOGLE_GENERATIVE_AI_API_KEY", true, None)?.ok_or_else(|| {
            ProviderError::Configuration("Google API key should be present".into())
        })?;
        let host = get_env("GOOGLE_API_HOST", false, Some(GOOGLE_HOST.to_string()))?
            .unwrap_or_else(|| GOOGLE_HOST.to_string());

        Ok(Self::new(host, api_key))
    }
}

/// Helper function to get environment variables with error handling
pub fn get_env(
    key: &str,
    required: bool,
    default: Option<String>,
) -> Result<Option<String>, ProviderError> {
    match env::var(key) {
        Ok(value) if !value.is_empty() => Ok(Some(value)),
        Ok(_) | Err(env::VarError::NotPresent) if !required => Ok(default),
        Ok(_) | Err(env::VarError::NotPresent) => Err(ProviderError::Configuration(format!(
            "Environment variable '{}' is required but not set.",
            key
        ))),
        Err(e) => Err(ProviderError::Configuration(format!("{}: {}", key, e))),
    }
}
