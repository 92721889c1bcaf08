use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Chat message sent to a pipe
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
}

/// Reference to a Langbase memory (the knowledge source a pipe searches)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryRef {
    pub name: String,
}

/// Body of `POST /v1/pipes/run`
#[derive(Debug, Clone, Serialize)]
pub struct PipeRequest {
    pub name: String,
    pub messages: Vec<Message>,
    /// Always false; the pipeline needs whole completions.
    pub stream: bool,
    /// Values substituted into `{{name}}` placeholders of the pipe prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<MemoryRef>>,
    /// Per-run JSON output mode, overriding the pipe definition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

/// Response of a pipe run. Only the fields the pipeline reads are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct PipeResponse {
    pub success: bool,
    pub completion: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

impl PipeRequest {
    /// Create a non-streaming run request
    pub fn new(name: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            name: name.into(),
            messages,
            stream: false,
            variables: None,
            memory: None,
            json: None,
        }
    }

    /// Add a single prompt variable
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Attach a memory the pipe retrieves from
    pub fn with_memory(mut self, name: impl Into<String>) -> Self {
        self.memory
            .get_or_insert_with(Vec::new)
            .push(MemoryRef { name: name.into() });
        self
    }

    /// Force JSON output for this run
    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }
}

/// Body of `POST /v1/pipes` used to upsert the research pipes
#[derive(Debug, Clone, Serialize)]
pub struct CreatePipeRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upsert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<MemoryRef>>,
}

/// Response from creating a pipe
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePipeResponse {
    pub name: String,
    pub url: String,
}

impl CreatePipeRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            model: None,
            upsert: None,
            json: None,
            temperature: None,
            max_tokens: None,
            messages: None,
            memory: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set model (e.g., "openai:gpt-4o-mini")
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Update the pipe if it already exists
    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = Some(upsert);
        self
    }

    pub fn with_json_output(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = Some(messages);
        self
    }

    /// Bind the pipe to a memory
    pub fn with_memory(mut self, name: impl Into<String>) -> Self {
        self.memory
            .get_or_insert_with(Vec::new)
            .push(MemoryRef { name: name.into() });
        self
    }
}
