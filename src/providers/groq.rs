use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{TextGenerationProvider, Usage};
use super::configs::GroqProviderConfig;
use super::utils::{
    execute_tool_calls, handle_response, messages_to_openai_spec, openai_tool_call,
    tools_to_openai_spec,
};
use crate::errors::ProviderError;
use crate::models::generation::{GenerationRequest, GenerationResult, Source};

/// Groq serves an OpenAI-compatible chat completions API
pub struct GroqProvider {
    client: Client,
    config: GroqProviderConfig,
}

impl GroqProvider {
    pub fn new(config: GroqProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Option<Usage> {
        let usage = data.get("usage")?;

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        Some(Usage::new(input_tokens, output_tokens, total_tokens))
    }

    /// Compound models run web search server-side and report what they
    /// found under `executed_tools`.
    fn get_sources(message: &Value) -> Vec<Source> {
        message
            .get("executed_tools")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|tool| tool["search_results"]["results"].as_array())
            .flatten()
            .filter_map(|result| {
                let url = result.get("url")?.as_str()?;
                let title = result
                    .get("title")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                Some(Source::new(url, title))
            })
            .collect()
    }

    async fn post(&self, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/openai/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );
        tracing::debug!(%url, model = %payload["model"], "posting chat completion");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl TextGenerationProvider for GroqProvider {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        if request.search_grounding {
            tracing::debug!("groq models search on their own; search grounding flag ignored");
        }

        let messages = messages_to_openai_spec(
            &request.prompt.to_messages(),
            request.system.as_deref(),
        );
        let tools_spec = tools_to_openai_spec(&request.declared_tools())?;

        let mut payload = json!({
            "model": request.model,
            "messages": messages
        });
        if !tools_spec.is_empty() {
            payload["tools"] = json!(tools_spec);
        }

        let response = self.post(payload).await?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::Api(error.to_string()));
        }

        let message = response
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| {
                ProviderError::MalformedResponse("No choices in Groq response".to_string())
            })?;

        let text = message
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default();

        let calls: Vec<_> = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| calls.iter().map(openai_tool_call).collect())
            .unwrap_or_default();
        let tool_results = execute_tool_calls(request.tools.as_ref(), calls).await;

        let mut result = GenerationResult::new(text)
            .with_sources(Self::get_sources(message))
            .with_tool_results(tool_results);
        if let Some(usage) = Self::get_usage(&response) {
            result = result.with_usage(usage);
        }

        Ok(result)
    }
}
