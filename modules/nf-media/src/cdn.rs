use async_trait::async_trait;
use nf_common::AdapterErrorKind;

/// `upload(image_url_or_bytes, folder, public_id, overwrite=true) →
/// secure_url`. Idempotent on `(folder, public_id)`.
#[async_trait]
pub trait CdnAdapter: Send + Sync {
    async fn upload(&self, image_url: &str, folder: &str, public_id: &str) -> (Result<String, AdapterErrorKind>, f64);
}

/// Deterministic public-ids for sequential stand-alone images:
/// `"{slug}_{role}_{index}"`.
pub fn sequential_public_id(slug: &str, role: &str, index: usize) -> String {
    format!("{slug}_{role}_{index}")
}

pub struct HttpCdnAdapter {
    api_key: Option<String>,
    api_secret: Option<String>,
    cloud_name: Option<String>,
    http: reqwest::Client,
}

impl HttpCdnAdapter {
    pub fn new(api_key: Option<String>, api_secret: Option<String>, cloud_name: Option<String>) -> Self {
        Self { api_key, api_secret, cloud_name, http: reqwest::Client::new() }
    }
}

#[async_trait]
impl CdnAdapter for HttpCdnAdapter {
    async fn upload(&self, image_url: &str, folder: &str, public_id: &str) -> (Result<String, AdapterErrorKind>, f64) {
        let (Some(cloud_name), Some(api_key), Some(api_secret)) = (&self.cloud_name, &self.api_key, &self.api_secret) else {
            return (Err(AdapterErrorKind::ConfigMissing), 0.0);
        };

        let full_public_id = format!("{}/{}", folder.trim_matches('/'), public_id);
        let response = self
            .http
            .post(format!("https://api.cloudinary.com/v1_1/{cloud_name}/image/upload"))
            .basic_auth(api_key, Some(api_secret))
            .form(&[("file", image_url), ("public_id", &full_public_id), ("overwrite", "true")])
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return (Err(AdapterErrorKind::Timeout), 0.0),
            Err(_) => return (Err(AdapterErrorKind::Upstream5xx), 0.0),
        };

        if !response.status().is_success() {
            return (Err(AdapterErrorKind::Upstream5xx), 0.0);
        }

        let payload: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(_) => return (Err(AdapterErrorKind::Parse), 0.0),
        };

        match payload["secure_url"].as_str() {
            Some(url) => (Ok(url.to_string()), 0.0),
            None => (Err(AdapterErrorKind::Parse), 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_public_id_is_deterministic() {
        assert_eq!(sequential_public_id("cyprus-guide", "section", 2), "cyprus-guide_section_2");
    }
}
