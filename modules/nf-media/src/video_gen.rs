use async_trait::async_trait;
use nf_common::AdapterErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    Standard,
    Premium,
}

/// `generate(prompt (≤2000 chars), duration_s, resolution, aspect_ratio,
/// model_tier, reference_image_url?) → video_url`. Prompts are
/// truncated to 2000 characters before submission — a correctness
/// requirement of the model, not a style choice.
#[async_trait]
pub trait VideoGenAdapter: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        duration_s: f64,
        resolution: &str,
        aspect_ratio: &str,
        model_tier: ModelTier,
        reference_image_url: Option<&str>,
    ) -> (Result<String, AdapterErrorKind>, f64);
}

pub const MAX_VIDEO_PROMPT_CHARS: usize = 2000;

pub struct HttpVideoGenAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl HttpVideoGenAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.example-video-gen.test/v1".to_string() }
    }
}

#[async_trait]
impl VideoGenAdapter for HttpVideoGenAdapter {
    async fn generate(
        &self,
        prompt: &str,
        duration_s: f64,
        resolution: &str,
        aspect_ratio: &str,
        model_tier: ModelTier,
        reference_image_url: Option<&str>,
    ) -> (Result<String, AdapterErrorKind>, f64) {
        let Some(api_key) = &self.api_key else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let truncated = nf_common::text::truncate_chars(prompt, MAX_VIDEO_PROMPT_CHARS);
        let tier = match model_tier {
            ModelTier::Standard => "standard",
            ModelTier::Premium => "premium",
        };

        let mut body = serde_json::json!({
            "prompt": truncated,
            "duration_s": duration_s,
            "resolution": resolution,
            "aspect_ratio": aspect_ratio,
            "model_tier": tier,
        });
        if let Some(reference) = reference_image_url {
            body["reference_image_url"] = serde_json::json!(reference);
        }

        let response = match self.http.post(format!("{}/generate", self.base_url)).bearer_auth(api_key).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.5),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.5),
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return (Err(AdapterErrorKind::RateLimited), 0.5);
        }
        if status.is_server_error() {
            return (Err(AdapterErrorKind::Upstream5xx), 0.5);
        }
        if status.is_client_error() {
            return (Err(AdapterErrorKind::Upstream4xx), 0.5);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.5),
        };

        match payload["video_url"].as_str() {
            Some(url) => (Ok(url.to_string()), 1.2),
            None => (Err(AdapterErrorKind::Parse), 0.5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_over_2000_chars_are_truncated() {
        let prompt = "a".repeat(3000);
        let truncated = nf_common::text::truncate_chars(&prompt, MAX_VIDEO_PROMPT_CHARS);
        assert_eq!(truncated.chars().count(), MAX_VIDEO_PROMPT_CHARS);
    }
}
