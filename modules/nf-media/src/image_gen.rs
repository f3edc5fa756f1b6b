use async_trait::async_trait;
use nf_common::AdapterErrorKind;

/// `generate(prompt, aspect_ratio, context_image_url?, model_tier) →
/// image_url`. `context_image_url` is the sequential-consistency
/// mechanism: when set, the adapter conditions generation on the prior
/// image.
#[async_trait]
pub trait ImageGenAdapter: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        context_image_url: Option<&str>,
        model_tier: &str,
    ) -> (Result<String, AdapterErrorKind>, f64);
}

/// Explicit chaining combinator: the first prompt is
/// unconditioned, each later prompt passes the previous image URL as
/// `context_image_url` to preserve character/style continuity.
pub async fn chain(
    adapter: &dyn ImageGenAdapter,
    prompts: &[String],
    aspect_ratio: &str,
    model_tier: &str,
    initial_context: Option<String>,
) -> Vec<(Result<String, AdapterErrorKind>, f64)> {
    let mut results = Vec::with_capacity(prompts.len());
    let mut context = initial_context;

    for prompt in prompts {
        let (outcome, cost) = adapter.generate(prompt, aspect_ratio, context.as_deref(), model_tier).await;
        if let Ok(url) = &outcome {
            context = Some(url.clone());
        }
        results.push((outcome, cost));
    }

    results
}

pub struct HttpImageGenAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl HttpImageGenAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.example-image-gen.test/v1".to_string() }
    }
}

#[async_trait]
impl ImageGenAdapter for HttpImageGenAdapter {
    async fn generate(
        &self,
        prompt: &str,
        aspect_ratio: &str,
        context_image_url: Option<&str>,
        model_tier: &str,
    ) -> (Result<String, AdapterErrorKind>, f64) {
        let Some(api_key) = &self.api_key else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let mut body = serde_json::json!({
            "prompt": prompt,
            "aspect_ratio": aspect_ratio,
            "model_tier": model_tier,
        });
        if let Some(context) = context_image_url {
            body["context_image_url"] = serde_json::json!(context);
        }

        let response = match self.http.post(format!("{}/generate", self.base_url)).bearer_auth(api_key).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.04),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.04),
        };

        if !response.status().is_success() {
            return (Err(AdapterErrorKind::Upstream5xx), 0.04);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.04),
        };

        match payload["image_url"].as_str() {
            Some(url) => (Ok(url.to_string()), 0.04),
            None => (Err(AdapterErrorKind::Parse), 0.04),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingAdapter {
        seen_contexts: Mutex<Vec<Option<String>>>,
    }

    #[async_trait]
    impl ImageGenAdapter for RecordingAdapter {
        async fn generate(
            &self,
            _prompt: &str,
            _aspect_ratio: &str,
            context_image_url: Option<&str>,
            _model_tier: &str,
        ) -> (Result<String, AdapterErrorKind>, f64) {
            self.seen_contexts.lock().unwrap().push(context_image_url.map(str::to_string));
            (Ok(format!("https://cdn.test/{}", self.seen_contexts.lock().unwrap().len())), 0.01)
        }
    }

    #[tokio::test]
    async fn chain_passes_prior_output_as_next_context() {
        let adapter = RecordingAdapter { seen_contexts: Mutex::new(vec![]) };
        let prompts = vec!["first".to_string(), "second".to_string(), "third".to_string()];
        let results = chain(&adapter, &prompts, "1:1", "standard", None).await;
        assert_eq!(results.len(), 3);

        let seen = adapter.seen_contexts.into_inner().unwrap();
        assert_eq!(seen[0], None);
        assert_eq!(seen[1], Some("https://cdn.test/1".to_string()));
        assert_eq!(seen[2], Some("https://cdn.test/2".to_string()));
    }
}
