use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::base::{TextGenerationProvider, Usage};
use super::configs::GoogleProviderConfig;
use super::utils::{execute_tool_calls, handle_response, tools_to_google_spec, ParsedToolCall};
use crate::errors::{ProviderError, ToolError};
use crate::models::generation::{GenerationRequest, GenerationResult, Source};
use crate::models::message::{Message, Role};
use crate::models::tool::ToolCall;

/// Gemini models through the Generative Language `generateContent` API
pub struct GoogleProvider {
    client: Client,
    config: GoogleProviderConfig,
}

impl GoogleProvider {
    pub fn new(config: GoogleProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    /// Gemini has no system role inside `contents`; system turns are folded
    /// into `systemInstruction` and assistant turns become `model`.
    fn messages_to_google_spec(
        messages: &[Message],
        system: Option<&str>,
    ) -> (Vec<Value>, Option<Value>) {
        let mut instructions: Vec<&str> = system.filter(|s| !s.is_empty()).into_iter().collect();
        let mut contents = Vec::with_capacity(messages.len());

        for message in messages {
            let role = match message.role {
                Role::System => {
                    instructions.push(&message.content);
                    continue;
                }
                Role::User => "user",
                Role::Assistant => "model",
            };
            contents.push(json!({
                "role": role,
                "parts": [{ "text": message.content }]
            }));
        }

        let system_instruction = (!instructions.is_empty()).then(|| {
            json!({
                "parts": instructions
                    .iter()
                    .map(|text| json!({ "text": text }))
                    .collect::<Vec<_>>()
            })
        });

        (contents, system_instruction)
    }

    fn get_usage(data: &Value) -> Option<Usage> {
        let usage = data.get("usageMetadata")?;
        let count = |key: &str| usage.get(key).and_then(Value::as_i64).map(|v| v as i32);

        Some(Usage::new(
            count("promptTokenCount"),
            count("candidatesTokenCount"),
            count("totalTokenCount"),
        ))
    }

    fn get_sources(candidate: &Value) -> Vec<Source> {
        candidate["groundingMetadata"]["groundingChunks"]
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|chunk| {
                let web = chunk.get("web")?;
                let url = web.get("uri")?.as_str()?;
                let title = web
                    .get("title")
                    .and_then(Value::as_str)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string);
                Some(Source::new(url, title))
            })
            .collect()
    }

    fn function_call(index: usize, part: &Value) -> ParsedToolCall {
        let call = &part["functionCall"];
        let id = call
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("call_{}", index));
        let name = call["name"].as_str().unwrap_or_default().to_string();
        let arguments = call.get("args").cloned().unwrap_or_else(|| json!({}));

        if name.is_empty() {
            let error = ToolError::NotFound("Function call without a name".to_string());
            return Err((ToolCall::new(id, name, arguments), error));
        }
        Ok(ToolCall::new(id, name, arguments))
    }

    fn build_payload(request: &GenerationRequest) -> Result<Value, ProviderError> {
        let (contents, system_instruction) =
            Self::messages_to_google_spec(&request.prompt.to_messages(), request.system.as_deref());
        let declarations = tools_to_google_spec(&request.declared_tools())?;

        let mut payload = json!({ "contents": contents });
        if let Some(system_instruction) = system_instruction {
            payload["systemInstruction"] = system_instruction;
        }

        // generateContent rejects search grounding combined with function
        // declarations, so declared tools win.
        if !declarations.is_empty() {
            if request.search_grounding {
                tracing::warn!("search grounding disabled because the request declares tools");
            }
            payload["tools"] = json!([{ "functionDeclarations": declarations }]);
        } else if request.search_grounding {
            payload["tools"] = json!([{ "google_search": {} }]);
        }

        Ok(payload)
    }

    async fn post(&self, model: &str, payload: Value) -> Result<Value, ProviderError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.host.trim_end_matches('/'),
            model
        );
        tracing::debug!(%url, "posting generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&payload)
            .send()
            .await?;

        handle_response(response).await
    }
}

#[async_trait]
impl TextGenerationProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResult, ProviderError> {
        let payload = Self::build_payload(request)?;
        let response = self.post(&request.model, payload).await?;

        if let Some(error) = response.get("error") {
            return Err(ProviderError::Api(error.to_string()));
        }

        let candidate = response
            .get("candidates")
            .and_then(|c| c.get(0))
            .ok_or_else(|| {
                let reason = response["promptFeedback"]["blockReason"]
                    .as_str()
                    .unwrap_or("no candidates in Google response");
                ProviderError::MalformedResponse(reason.to_string())
            })?;

        let parts: &[Value] = candidate["content"]["parts"]
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default();

        let text: String = parts
            .iter()
            .filter(|part| !part["thought"].as_bool().unwrap_or(false))
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        let calls: Vec<_> = parts
            .iter()
            .filter(|part| part.get("functionCall").is_some())
            .enumerate()
            .map(|(index, part)| Self::function_call(index, part))
            .collect();
        let tool_results = execute_tool_calls(request.tools.as_ref(), calls).await;

        let mut result = GenerationResult::new(text)
            .with_sources(Self::get_sources(candidate))
            .with_tool_results(tool_results);
        if let Some(usage) = Self::get_usage(&response) {
            result = result.with_usage(usage);
        }

        Ok(result)
    }
}
