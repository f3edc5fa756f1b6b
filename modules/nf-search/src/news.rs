use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nf_common::AdapterErrorKind;
use nf_world::{RawSource, SourceKind};

/// `search(keywords, region, freshness) → RawSource[]` and
/// `search_for_topic(query, region, limit) → RawSource[]`. Must
/// return ISO timestamps when available.
#[async_trait]
pub trait NewsSearchAdapter: Send + Sync {
    async fn search(
        &self,
        keywords: &[String],
        region: Option<&str>,
        freshness: Option<&str>,
    ) -> (Result<Vec<RawSource>, AdapterErrorKind>, f64);

    async fn search_for_topic(
        &self,
        query: &str,
        region: Option<&str>,
        limit: usize,
    ) -> (Result<Vec<RawSource>, AdapterErrorKind>, f64);
}

pub struct HttpNewsSearchAdapter {
    api_key: Option<String>,
    http: reqwest::Client,
    base_url: String,
}

impl HttpNewsSearchAdapter {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key, http: reqwest::Client::new(), base_url: "https://api.example-news-search.test/v1".into() }
    }

    fn classify_status(status: reqwest::StatusCode) -> AdapterErrorKind {
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            AdapterErrorKind::Auth
        } else if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            AdapterErrorKind::RateLimited
        } else if status.is_server_error() {
            AdapterErrorKind::Upstream5xx
        } else {
            AdapterErrorKind::Upstream4xx
        }
    }

    async fn run_query(&self, query: &str, region: Option<&str>, limit: usize) -> (Result<Vec<RawSource>, AdapterErrorKind>, f64) {
        let Some(api_key) = &self.api_key else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let response = self
            .http
            .get(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .query(&[("q", query), ("region", region.unwrap_or("us")), ("limit", &limit.to_string())])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.001),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.001),
        };

        let status = response.status();
        if !status.is_success() {
            return (Err(Self::classify_status(status)), 0.001);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.001),
        };

        let Some(items) = payload["results"].as_array() else {
            return (Err(AdapterErrorKind::Parse), 0.001);
        };

        let sources = items
            .iter()
            .enumerate()
            .map(|(i, item)| RawSource {
                source_id: format!("news_{i}"),
                source_kind: SourceKind::News,
                url: item["url"].as_str().unwrap_or_default().to_string(),
                title: item["title"].as_str().unwrap_or_default().to_string(),
                content_text: item["snippet"].as_str().unwrap_or_default().to_string(),
                published_at: item["published_at"].as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|dt| dt.with_timezone(&Utc)),
                relevance_score: item["relevance_score"].as_f64(),
                author: item["author"].as_str().map(str::to_string),
            })
            .collect();

        (Ok(sources), 0.002)
    }
}

#[async_trait]
impl NewsSearchAdapter for HttpNewsSearchAdapter {
    async fn search(
        &self,
        keywords: &[String],
        region: Option<&str>,
        _freshness: Option<&str>,
    ) -> (Result<Vec<RawSource>, AdapterErrorKind>, f64) {
        self.run_query(&keywords.join(" "), region, 50).await
    }

    async fn search_for_topic(
        &self,
        query: &str,
        region: Option<&str>,
        limit: usize,
    ) -> (Result<Vec<RawSource>, AdapterErrorKind>, f64) {
        self.run_query(query, region, limit).await
    }
}
