use crate::traits::{ChatRequest, ChatResponse, LlmClient, MessageRole};
use async_trait::async_trait;
use nf_common::AdapterErrorKind;
use serde_json::json;

/// Reporting-only estimate; must never be used for billing.
const COST_PER_1K_TOKENS_USD: f64 = 0.005;

pub struct OpenAiClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.openai.com/v1".to_string(), model }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AdapterErrorKind> {
        if self.api_key.is_empty() {
            return Err(AdapterErrorKind::ConfigMissing);
        }

        let messages: Vec<_> = request
            .messages
            .iter()
            .map(|m| {
                let role = match m.role {
                    MessageRole::System => "system",
                    MessageRole::User => "user",
                    MessageRole::Assistant => "assistant",
                };
                json!({ "role": role, "content": m.content })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if let Some((name, schema)) = &request.json_schema {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": { "name": name, "schema": schema, "strict": true },
            });
        }

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|_| AdapterErrorKind::Timeout)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdapterErrorKind::Auth);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AdapterErrorKind::RateLimited);
        }
        if status.is_server_error() {
            return Err(AdapterErrorKind::Upstream5xx);
        }
        if status.is_client_error() {
            return Err(AdapterErrorKind::Upstream4xx);
        }

        let payload: serde_json::Value = response.json().await.map_err(|_| AdapterErrorKind::Parse)?;
        let prompt_tokens = payload["usage"]["prompt_tokens"].as_u64().unwrap_or(0);
        let completion_tokens = payload["usage"]["completion_tokens"].as_u64().unwrap_or(0);
        let cost_usd = ((prompt_tokens + completion_tokens) as f64 / 1000.0) * COST_PER_1K_TOKENS_USD;

        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(AdapterErrorKind::Parse)?
            .to_string();

        Ok(ChatResponse { text, cost_usd })
    }
}
