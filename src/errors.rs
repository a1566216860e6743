use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised while talking to a text-generation provider.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Missing configuration: {0}")]
    Configuration(String),
}

/// Failures raised while persisting a report to disk.
#[derive(Error, Debug)]
#[error("Failed to {action} {}: {source}", path.display())]
pub struct FilesystemError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

impl FilesystemError {
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Tool failures are recorded per invocation rather than aborting a run,
/// so they are cloneable and serializable like the rest of a result.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tool execution failed: {0}")]
    ExecutionError(String),

    #[error("Invalid tool registration: {0}")]
    Registration(String),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Everything a report run can fail with.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Filesystem(#[from] FilesystemError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {env_var}")]
    MissingEnvVar { env_var: String },

    #[error("Configuration error: {0}")]
    Other(#[from] config::ConfigError),
}

/// Map a dotted settings key to the environment variable that sets it.
pub fn to_env_var(field_path: &str) -> String {
    format!("QUILL_{}", field_path.replace('.', "__").to_uppercase())
}
