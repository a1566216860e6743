use std::collections::HashSet;

use reqwest::{Response, StatusCode};
use serde_json::{json, Value};

use crate::errors::{ProviderError, ToolError};
use crate::models::message::Message;
use crate::models::tool::{Tool, ToolCall, ToolOutcome};
use crate::tools::{is_valid_tool_name, ToolRegistry};

/// Convert internal messages to the OpenAI chat completions message specification,
/// with the system prompt (if any) first.
pub fn messages_to_openai_spec(messages: &[Message], system: Option<&str>) -> Vec<Value> {
    let mut spec = Vec::with_capacity(messages.len() + 1);

    if let Some(system) = system.filter(|s| !s.is_empty()) {
        spec.push(json!({ "role": "system", "content": system }));
    }

    for message in messages {
        spec.push(json!({
            "role": message.role,
            "content": message.content
        }));
    }

    spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[&Tool]) -> Result<Vec<Value>, ProviderError> {
    check_unique_names(tools)?;

    Ok(tools
        .iter()
        .map(|tool| {
            json!({
                "type": "function",
                "function": {
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": tool.parameters,
                }
            })
        })
        .collect())
}

/// Convert internal Tool format to Gemini function declarations
pub fn tools_to_google_spec(tools: &[&Tool]) -> Result<Vec<Value>, ProviderError> {
    check_unique_names(tools)?;

    Ok(tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            })
        })
        .collect())
}

fn check_unique_names(tools: &[&Tool]) -> Result<(), ProviderError> {
    let mut tool_names = HashSet::new();
    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(ProviderError::RequestFailed(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }
    }
    Ok(())
}

/// A tool call as parsed from a provider response. Calls that could not be
/// interpreted keep what was received alongside the reason.
pub type ParsedToolCall = Result<ToolCall, (ToolCall, ToolError)>;

/// Turn an OpenAI-style `tool_calls` entry into a ToolCall. Arguments arrive
/// as a JSON-encoded string.
pub fn openai_tool_call(tool_call: &Value) -> ParsedToolCall {
    let id = tool_call["id"].as_str().unwrap_or_default().to_string();
    let name = tool_call["function"]["name"]
        .as_str()
        .unwrap_or_default()
        .to_string();
    let arguments = tool_call["function"]["arguments"]
        .as_str()
        .unwrap_or_default();

    if !is_valid_tool_name(&name) {
        let error = ToolError::NotFound(format!(
            "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
            name
        ));
        return Err((ToolCall::new(id, name, Value::Null), error));
    }

    match serde_json::from_str::<Value>(arguments) {
        Ok(params) => Ok(ToolCall::new(id, name, params)),
        Err(e) => {
            let error = ToolError::InvalidParameters(format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, e
            ));
            Err((ToolCall::new(id, name, json!(arguments)), error))
        }
    }
}

/// Execute every requested call in order against the request's registry.
/// Calls that could not even be parsed are recorded as failed outcomes.
pub async fn execute_tool_calls(
    registry: Option<&ToolRegistry>,
    calls: Vec<ParsedToolCall>,
) -> Vec<ToolOutcome> {
    let mut outcomes = Vec::with_capacity(calls.len());
    for call in calls {
        let outcome = match (call, registry) {
            (Ok(call), Some(registry)) => registry.execute(call).await,
            (Ok(call), None) => {
                let output = Err(ToolError::NotFound(call.name.clone()));
                ToolOutcome { call, output }
            }
            (Err((call, error)), _) => ToolOutcome {
                call,
                output: Err(error),
            },
        };
        outcomes.push(outcome);
    }
    outcomes
}

/// Map the HTTP status of a provider response to a ProviderError,
/// returning the decoded JSON body on success.
pub async fn handle_response(response: Response) -> Result<Value, ProviderError> {
    let status = response.status();
    if status == StatusCode::OK {
        return response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| format!("{} - {}", status, body));

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Authentication(message),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::RateLimited(message),
        status if status.is_server_error() => ProviderError::Server(message),
        _ => ProviderError::RequestFailed(message),
    })
}

/// Both providers wrap failures as `{"error": {"message": ...}}`
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{add_numbers, add_numbers_tool};

    const OPENAI_TOOL_CALL: &str = r#"{
        "id": "1",
        "type": "function",
        "function": {
            "name": "example_fn",
            "arguments": "{\"param\": \"value\"}"
        }
    }"#;

    #[test]
    fn test_messages_to_openai_spec() {
        let spec = messages_to_openai_spec(&[Message::user("Hello")], None);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["role"], "user");
        assert_eq!(spec[0]["content"], "Hello");
    }

    #[test]
    fn test_messages_to_openai_spec_with_system() {
        let messages = vec![Message::user("Hello"), Message::assistant("Hi!")];
        let spec = messages_to_openai_spec(&messages, Some("You are terse."));

        assert_eq!(spec.len(), 3);
        assert_eq!(spec[0]["role"], "system");
        assert_eq!(spec[0]["content"], "You are terse.");
        assert_eq!(spec[2]["role"], "assistant");
    }

    #[test]
    fn test_tools_to_openai_spec() -> Result<(), ProviderError> {
        let tool = add_numbers_tool();
        let spec = tools_to_openai_spec(&[&tool])?;

        assert_eq!(spec.len(), 1);
        assert_eq!(spec[0]["type"], "function");
        assert_eq!(spec[0]["function"]["name"], "add_numbers");
        assert_eq!(spec[0]["function"]["parameters"]["required"], json!(["num1", "num2"]));
        Ok(())
    }

    #[test]
    fn test_tools_spec_duplicate() {
        let tool = add_numbers_tool();
        let result = tools_to_google_spec(&[&tool, &tool]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Duplicate tool name"));
    }

    #[test]
    fn test_openai_tool_call_valid() {
        let value: Value = serde_json::from_str(OPENAI_TOOL_CALL).unwrap();
        let call = openai_tool_call(&value).unwrap();
        assert_eq!(call.id, "1");
        assert_eq!(call.name, "example_fn");
        assert_eq!(call.arguments, json!({"param": "value"}));
    }

    #[test]
    fn test_openai_tool_call_invalid_name() {
        let mut value: Value = serde_json::from_str(OPENAI_TOOL_CALL).unwrap();
        value["function"]["name"] = json!("invalid fn");

        match openai_tool_call(&value) {
            Err((_, ToolError::NotFound(msg))) => {
                assert!(msg.starts_with("The provided function name"))
            }
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_openai_tool_call_json_decode_error() {
        let mut value: Value = serde_json::from_str(OPENAI_TOOL_CALL).unwrap();
        value["function"]["arguments"] = json!("invalid json {");

        match openai_tool_call(&value) {
            Err((_, ToolError::InvalidParameters(msg))) => {
                assert!(msg.starts_with("Could not interpret tool use parameters"))
            }
            _ => panic!("Expected InvalidParameters error"),
        }
    }

    #[tokio::test]
    async fn test_execute_tool_calls_without_registry() {
        let calls = vec![Ok(ToolCall::new("1", "add_numbers", json!({"num1": 1, "num2": 2})))];
        let outcomes = execute_tool_calls(None, calls).await;
        assert_eq!(
            outcomes[0].output,
            Err(ToolError::NotFound("add_numbers".to_string()))
        );
    }

    #[tokio::test]
    async fn test_execute_tool_calls_in_order() {
        let registry = ToolRegistry::new()
            .with_tool(add_numbers_tool(), add_numbers)
            .unwrap();
        let calls = vec![
            Ok(ToolCall::new("a", "add_numbers", json!({"num1": 1, "num2": 2}))),
            Err((
                ToolCall::new("b", "bad fn", Value::Null),
                ToolError::NotFound("bad fn".to_string()),
            )),
            Ok(ToolCall::new("c", "add_numbers", json!({"num1": 3, "num2": 4}))),
        ];

        let outcomes = execute_tool_calls(Some(&registry), calls).await;
        let ids: Vec<_> = outcomes.iter().map(|o| o.call.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(outcomes[0].output, Ok(json!(3.0)));
        assert!(outcomes[1].output.is_err());
        assert_eq!(outcomes[2].output, Ok(json!(7.0)));
    }

    #[test]
    fn test_error_message() {
        let body = r#"{"error": {"message": "Invalid API Key", "type": "invalid_request_error"}}"#;
        assert_eq!(error_message(body).as_deref(), Some("Invalid API Key"));
        assert_eq!(error_message("not json"), None);
    }
}
