use async_trait::async_trait;
use nf_common::AdapterErrorKind;

/// `research(instructions, timeout) → {content, task_outputs[], research_id}`
///. Mid-stream errors are treated as partial success, returning
/// whatever `task_outputs` had arrived.
#[derive(Debug, Clone, Default)]
pub struct DeepResearchResult {
    pub content: String,
    pub task_outputs: Vec<String>,
    pub research_id: String,
}

#[async_trait]
pub trait DeepResearchAdapter: Send + Sync {
    async fn research(
        &self,
        instructions: &str,
        timeout: std::time::Duration,
    ) -> (Result<DeepResearchResult, AdapterErrorKind>, f64);
}

pub struct HttpDeepResearchAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl HttpDeepResearchAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.example-deep-research.test/v1".into() }
    }
}

#[async_trait]
impl DeepResearchAdapter for HttpDeepResearchAdapter {
    async fn research(
        &self,
        instructions: &str,
        timeout: std::time::Duration,
    ) -> (Result<DeepResearchResult, AdapterErrorKind>, f64) {
        let Some(api_key) = &self.api_key else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let response = self
            .http
            .post(format!("{}/research", self.base_url))
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&serde_json::json!({ "instructions": instructions }))
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.02),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.02),
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (Err(AdapterErrorKind::RateLimited), 0.02);
        }
        if status.is_server_error() {
            return (Err(AdapterErrorKind::Upstream5xx), 0.02);
        }
        if status.is_client_error() {
            return (Err(AdapterErrorKind::Upstream4xx), 0.02);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.02),
        };

        let task_outputs = payload["task_outputs"]
            .as_array()
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
            .unwrap_or_default();

        let result = DeepResearchResult {
            content: payload["content"].as_str().unwrap_or_default().to_string(),
            task_outputs,
            research_id: payload["research_id"].as_str().unwrap_or_default().to_string(),
        };

        (Ok(result), 0.05)
    }
}
