use serde::{Deserialize, Serialize};

use super::message::{Message, Role};
use super::tool::ToolOutcome;
use crate::providers::base::Usage;
use crate::tools::ToolRegistry;

/// What the model is asked: a bare prompt or an ordered conversation
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    Text(String),
    Messages(Vec<Message>),
}

impl Prompt {
    /// Expand into the message list every provider ultimately sends
    pub fn to_messages(&self) -> Vec<Message> {
        match self {
            Prompt::Text(text) => vec![Message::user(text.as_str())],
            Prompt::Messages(messages) => messages.clone(),
        }
    }

    /// The text of the last user turn, used as the report query
    pub fn query(&self) -> Option<&str> {
        match self {
            Prompt::Text(text) => Some(text),
            Prompt::Messages(messages) => messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.as_str()),
        }
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Prompt::Text(text.to_string())
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Prompt::Text(text)
    }
}

impl From<Vec<Message>> for Prompt {
    fn from(messages: Vec<Message>) -> Self {
        Prompt::Messages(messages)
    }
}

/// A single generation call. Built fresh for each invocation.
#[derive(Debug)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: Prompt,
    pub system: Option<String>,
    pub tools: Option<ToolRegistry>,
    /// Ask the provider to ground the answer in web search results
    pub search_grounding: bool,
}

impl GenerationRequest {
    pub fn new<M: Into<String>, P: Into<Prompt>>(model: M, prompt: P) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            system: None,
            tools: None,
            search_grounding: false,
        }
    }

    pub fn with_system<S: Into<String>>(mut self, system: S) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_search_grounding(mut self) -> Self {
        self.search_grounding = true;
        self
    }

    /// Tools declared on this request, empty when none were attached
    pub fn declared_tools(&self) -> Vec<&crate::models::tool::Tool> {
        self.tools
            .as_ref()
            .map(|registry| registry.tools().collect())
            .unwrap_or_default()
    }
}

/// A citation returned alongside generated text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Source {
    pub fn new<U: Into<String>>(url: U, title: Option<String>) -> Self {
        Self {
            url: url.into(),
            title,
        }
    }
}

/// What a provider hands back. Read-only to everything above the provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub tool_results: Vec<ToolOutcome>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl GenerationResult {
    pub fn new<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_sources(mut self, sources: Vec<Source>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_tool_results(mut self, tool_results: Vec<ToolOutcome>) -> Self {
        self.tool_results = tool_results;
        self
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }
}
