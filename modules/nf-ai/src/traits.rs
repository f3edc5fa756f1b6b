use async_trait::async_trait;
use nf_common::AdapterErrorKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into() }
    }
}

/// A single chat completion, with an optional JSON-schema constraint for
/// structured output. Providers that enforce schemas natively (OpenAI's
/// `response_format`) use it directly; providers that don't (Claude, via
/// forced tool-use) build the constraint into the request shape themselves.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub json_schema: Option<(String, serde_json::Value)>,
}

#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub text: String,
    pub cost_usd: f64,
}

/// Provider-agnostic LLM collaborator ('s "opaque prompt → typed
/// result" contract, and's adapter error taxonomy).
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AdapterErrorKind>;
}

#[async_trait]
pub trait EmbedAgent: Send + Sync {
    async fn embed(&self, text: &str) -> Result<(Vec<f32>, f64), AdapterErrorKind>;
}
