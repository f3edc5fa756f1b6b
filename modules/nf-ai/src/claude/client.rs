use crate::traits::{ChatRequest, ChatResponse, LlmClient, MessageRole};
use async_trait::async_trait;
use nf_common::AdapterErrorKind;
use serde_json::json;

const CLAUDE_VERSION: &str = "2023-06-01";
/// Reporting-only estimate; must never be used for billing.
const COST_PER_1K_TOKENS_USD: f64 = 0.003;

pub struct ClaudeClient {
    api_key: String,
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.anthropic.com/v1".to_string(), model }
    }

    fn headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-api-key", self.api_key.parse().unwrap());
        headers.insert("anthropic-version", CLAUDE_VERSION.parse().unwrap());
        headers.insert("content-type", "application/json".parse().unwrap());
        headers
    }
}

#[async_trait]
impl LlmClient for ClaudeClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, AdapterErrorKind> {
        if self.api_key.is_empty() {
            return Err(AdapterErrorKind::ConfigMissing);
        }

        let (system, messages): (Option<String>, Vec<_>) = {
            let mut system = None;
            let mut rest = Vec::new();
            for m in &request.messages {
                if m.role == MessageRole::System {
                    system = Some(m.content.clone());
                } else {
                    let role = if m.role == MessageRole::User { "user" } else { "assistant" };
                    rest.push(json!({ "role": role, "content": m.content }));
                }
            }
            (system, rest)
        };

        let mut body = json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "messages": messages,
        });
        if let Some(system) = system {
            body["system"] = json!(system);
        }
        if let Some((name, schema)) = &request.json_schema {
            body["tools"] = json!([{
                "name": name,
                "description": format!("Return a {name} object."),
                "input_schema": schema,
            }]);
            body["tool_choice"] = json!({ "type": "tool", "name": name });
        }

        let response = self
            .http
            .post(format!("{}/messages", self.base_url))
            .headers(self.headers())
            .json(&body)
            .send()
            .await
            .map_err(|_| AdapterErrorKind::Timeout)?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
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
        let input_tokens = payload["usage"]["input_tokens"].as_u64().unwrap_or(0);
        let output_tokens = payload["usage"]["output_tokens"].as_u64().unwrap_or(0);
        let cost_usd = ((input_tokens + output_tokens) as f64 / 1000.0) * COST_PER_1K_TOKENS_USD;

        let text = if request.json_schema.is_some() {
            payload["content"]
                .as_array()
                .and_then(|blocks| blocks.iter().find(|b| b["type"] == "tool_use"))
                .map(|b| b["input"].to_string())
                .ok_or(AdapterErrorKind::Parse)?
        } else {
            payload["content"][0]["text"].as_str().ok_or(AdapterErrorKind::Parse)?.to_string()
        };

        Ok(ChatResponse { text, cost_usd })
    }
}
