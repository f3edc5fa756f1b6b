use async_trait::async_trait;
use nf_common::AdapterErrorKind;
use std::time::Duration;

/// Deterministic URL grammar, built client-side from `playback_id`.
/// Pure: same args always yield the same URL.
pub fn stream_url(playback_id: &str) -> String {
    format!("https://stream.mux.com/{playback_id}.m3u8")
}

pub fn thumbnail_url(playback_id: &str, time_s: f64, width: u32, height: Option<u32>) -> String {
    let mut url = format!("https://image.mux.com/{playback_id}/thumbnail.jpg?time={time_s}&width={width}");
    if let Some(h) = height {
        url.push_str(&format!("&height={h}&fit_mode=smartcrop"));
    }
    url
}

pub fn animated_url(playback_id: &str, start_s: f64, end_s: f64, width: u32, fps: u32, format: &str) -> String {
    format!("https://image.mux.com/{playback_id}/animated.{format}?start={start_s}&end={end_s}&width={width}&fps={fps}")
}

#[derive(Debug, Clone)]
pub struct AssetInfo {
    pub asset_id: String,
    pub playback_id: String,
    pub duration_s: f64,
}

#[derive(Debug, Clone, Default)]
pub struct DashboardMeta {
    pub title: String,
    pub country: Option<String>,
    pub mode: String,
    pub app: String,
}

/// `upload`, `delete`, and the pure URL builders above.
#[async_trait]
pub trait MediaHostAdapter: Send + Sync {
    async fn upload(
        &self,
        video_url: &str,
        passthrough_metadata: &str,
        dashboard_meta: DashboardMeta,
    ) -> (Result<AssetInfo, AdapterErrorKind>, f64);

    async fn delete(&self, asset_id: &str) -> Result<(), AdapterErrorKind>;
}

/// Builds `"{title[:80]} | {mode} | {country} | app:{app} | cluster:{cluster_id[:8]} | id:{article_id}"`,
/// clamped to 255 chars.
pub fn build_passthrough(
    title: &str,
    mode: &str,
    country: Option<&str>,
    app: &str,
    cluster_id: Option<&str>,
    article_id: &str,
) -> String {
    let title_clip = nf_common::text::truncate_chars(title, 80);
    let country_clip = nf_common::text::truncate_chars(country.unwrap_or(""), 20);
    let cluster_clip: String = cluster_id.unwrap_or("").chars().take(8).collect();
    let full = format!("{title_clip} | {mode} | {country_clip} | app:{app} | cluster:{cluster_clip} | id:{article_id}");
    nf_common::text::truncate_chars(&full, 255)
}

pub struct HttpMediaHostAdapter {
    token: Option<String>,
    http: reqwest::Client,
    base_url: String,
    poll_interval: Duration,
    poll_max_attempts: u32,
}

impl HttpMediaHostAdapter {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token,
            http: reqwest::Client::new(),
            base_url: "https://api.mux.com/video/v1".to_string(),
            poll_interval: Duration::from_secs(2),
            poll_max_attempts: 60,
        }
    }

    async fn poll_until_ready(&self, asset_id: &str) -> Result<AssetInfo, AdapterErrorKind> {
        let token = self.token.as_ref().ok_or(AdapterErrorKind::ConfigMissing)?;

        for attempt in 0..self.poll_max_attempts {
            let response = self
                .http
                .get(format!("{}/assets/{asset_id}", self.base_url))
                .bearer_auth(token)
                .send()
                .await
                .map_err(|_| AdapterErrorKind::Upstream5xx)?;

            if !response.status().is_success() {
                return Err(AdapterErrorKind::Upstream5xx);
            }

            let payload: serde_json::Value = response.json().await.map_err(|_| AdapterErrorKind::Parse)?;
            let status = payload["data"]["status"].as_str().unwrap_or_default();

            if status == "ready" {
                let playback_id = payload["data"]["playback_ids"][0]["id"]
                    .as_str()
                    .ok_or(AdapterErrorKind::Parse)?
                    .to_string();
                let duration_s = payload["data"]["duration"].as_f64().unwrap_or(0.0);
                return Ok(AssetInfo { asset_id: asset_id.to_string(), playback_id, duration_s });
            }
            if status == "errored" {
                return Err(AdapterErrorKind::Upstream5xx);
            }

            tracing::debug!(asset_id, attempt, "media host asset not ready yet");
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(AdapterErrorKind::Timeout)
    }
}

#[async_trait]
impl MediaHostAdapter for HttpMediaHostAdapter {
    async fn upload(
        &self,
        video_url: &str,
        passthrough_metadata: &str,
        dashboard_meta: DashboardMeta,
    ) -> (Result<AssetInfo, AdapterErrorKind>, f64) {
        let Some(token) = &self.token else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let body = serde_json::json!({
            "input": [{ "url": video_url }],
            "passthrough": passthrough_metadata,
            "meta": {
                "title": dashboard_meta.title,
                "creator_id": dashboard_meta.app,
                "external_id": dashboard_meta.mode,
            },
            "playback_policy": ["public"],
        });

        let response = match self.http.post(format!("{}/assets", self.base_url)).bearer_auth(token).json(&body).send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.05),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.05),
        };

        if !response.status().is_success() {
            return (Err(AdapterErrorKind::Upstream5xx), 0.05);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.05),
        };

        let Some(asset_id) = payload["data"]["id"].as_str().map(str::to_string) else {
            return (Err(AdapterErrorKind::Parse), 0.05);
        };

        match self.poll_until_ready(&asset_id).await {
            Ok(info) => (Ok(info), 0.05),
            Err(kind) => (Err(kind), 0.05),
        }
    }

    async fn delete(&self, asset_id: &str) -> Result<(), AdapterErrorKind> {
        let token = self.token.as_ref().ok_or(AdapterErrorKind::ConfigMissing)?;
        let response = self
            .http
            .delete(format!("{}/assets/{asset_id}", self.base_url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|_| AdapterErrorKind::Upstream5xx)?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(AdapterErrorKind::Upstream5xx)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_builders_are_pure_and_deterministic() {
        let a = thumbnail_url("pb123", 1.5, 640, None);
        let b = thumbnail_url("pb123", 1.5, 640, None);
        assert_eq!(a, b);
        assert_eq!(a, "https://image.mux.com/pb123/thumbnail.jpg?time=1.5&width=640");
        assert_eq!(stream_url("pb123"), "https://stream.mux.com/pb123.m3u8");
    }

    #[test]
    fn passthrough_is_clamped_to_255_chars() {
        let title = "x".repeat(500);
        let passthrough = build_passthrough(&title, "guide", Some("Slovakia"), "relocation", Some("abcdef1234"), "art-1");
        assert!(passthrough.chars().count() <= 255);
        assert!(passthrough.contains("app:relocation"));
        assert!(passthrough.contains("cluster:abcdef12"));
    }
}
