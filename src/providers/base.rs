use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ProviderError;
use crate::models::generation::{GenerationRequest, GenerationResult};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: total_tokens.or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            }),
        }
    }
}

/// Base trait for hosted text-generation services (groq, google)
#[async_trait]
pub trait TextGenerationProvider: Send + Sync {
    /// Short provider name for display and logs
    fn name(&self) -> &'static str;

    /// Run one generation request. Any tool calls the model makes are executed
    /// against the request's registry and surface in `tool_results`.
    async fn generate(&self, request: &GenerationRequest)
        -> Result<GenerationResult, ProviderError>;
}
