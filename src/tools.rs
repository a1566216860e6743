use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Map, Value};

use crate::errors::{ToolError, ToolResult};
use crate::models::tool::{Tool, ToolCall, ToolOutcome};

/// Something that can run a tool call.
///
/// Plain closures `Fn(Value) -> ToolResult<Value>` implement this directly;
/// handlers that need to await implement the trait themselves.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, arguments: Value) -> ToolResult<Value>;
}

#[async_trait]
impl<F> ToolHandler for F
where
    F: Fn(Value) -> ToolResult<Value> + Send + Sync,
{
    async fn call(&self, arguments: Value) -> ToolResult<Value> {
        (self)(arguments)
    }
}

struct RegisteredTool {
    tool: Tool,
    handler: Arc<dyn ToolHandler>,
}

/// The capability table a request carries: tool name -> schema + handler.
///
/// Registration order is preserved so tool declarations go out to the
/// provider in the order they were added.
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
}

impl Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|entry| &entry.tool))
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, tool: Tool, handler: H) -> ToolResult<()>
    where
        H: ToolHandler + 'static,
    {
        if !is_valid_tool_name(&tool.name) {
            return Err(ToolError::Registration(format!(
                "The tool name '{}' has invalid characters, it must match [a-zA-Z0-9_-]+",
                tool.name
            )));
        }
        if self.get(&tool.name).is_some() {
            return Err(ToolError::Registration(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }
        if tool.parameters.get("type").and_then(Value::as_str) != Some("object") {
            return Err(ToolError::Registration(format!(
                "Parameters of '{}' must be a schema of type object",
                tool.name
            )));
        }
        self.entries.push(RegisteredTool {
            tool,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Builder form of [`ToolRegistry::register`]
    pub fn with_tool<H>(mut self, tool: Tool, handler: H) -> ToolResult<Self>
    where
        H: ToolHandler + 'static,
    {
        self.register(tool, handler)?;
        Ok(self)
    }

    pub fn tools(&self) -> impl Iterator<Item = &Tool> {
        self.entries.iter().map(|entry| &entry.tool)
    }

    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools().find(|tool| tool.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Validate and run a call requested by the model. Failures are recorded
    /// in the outcome; they never abort the generation.
    pub async fn execute(&self, call: ToolCall) -> ToolOutcome {
        let output = match self.entries.iter().find(|entry| entry.tool.name == call.name) {
            None => Err(ToolError::NotFound(call.name.clone())),
            Some(entry) => match validate_arguments(&entry.tool.parameters, &call.arguments) {
                Ok(()) => entry.handler.call(call.arguments.clone()).await,
                Err(e) => Err(e),
            },
        };

        if let Err(e) = &output {
            tracing::warn!(tool = %call.name, error = %e, "tool call failed");
        }

        ToolOutcome { call, output }
    }
}

pub(crate) fn is_valid_tool_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

/// Check arguments against the subset of JSON schema tool declarations use:
/// an object with `required` keys and primitive `type`s per property.
pub fn validate_arguments(schema: &Value, arguments: &Value) -> ToolResult<()> {
    let arguments = arguments.as_object().ok_or_else(|| {
        ToolError::InvalidParameters(format!("Expected an object, got {}", arguments))
    })?;

    let empty = Map::new();
    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for key in required.iter().filter_map(Value::as_str) {
            if !arguments.contains_key(key) {
                return Err(ToolError::InvalidParameters(format!(
                    "Missing required parameter '{}'",
                    key
                )));
            }
        }
    }

    for (key, value) in arguments {
        let Some(expected) = properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(Value::as_str)
        else {
            continue;
        };
        if !matches_type(expected, value) {
            return Err(ToolError::InvalidParameters(format!(
                "Parameter '{}' must be of type {}, got {}",
                key, expected, value
            )));
        }
    }

    Ok(())
}

fn matches_type(expected: &str, value: &Value) -> bool {
    match expected {
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    }
}

/// The arithmetic tool used by the function-calling report
pub fn add_numbers_tool() -> Tool {
    Tool::new(
        "add_numbers",
        "Add two numbers",
        json!({
            "type": "object",
            "properties": {
                "num1": { "type": "number", "description": "The first addend" },
                "num2": { "type": "number", "description": "The second addend" }
            },
            "required": ["num1", "num2"]
        }),
    )
}

pub fn add_numbers(arguments: Value) -> ToolResult<Value> {
    let operand = |key: &str| {
        arguments.get(key).and_then(Value::as_f64).ok_or_else(|| {
            ToolError::InvalidParameters(format!("'{}' must be a number", key))
        })
    };
    Ok(json!(operand("num1")? + operand("num2")?))
}
