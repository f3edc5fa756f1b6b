use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubStatus {
    Draft,
    Published,
}

/// The country-level aggregation page. Upserted on `(country_code, slug)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub country_code: String,
    pub location_name: String,
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub hub_content: String,
    pub payload: HubPayload,
    pub seo_data: serde_json::Value,
    pub video_playback_id: Option<String>,
    pub status: HubStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HubPayload {
    pub cluster_articles: Vec<HubClusterArticle>,
    pub faq: Vec<HubFaqEntry>,
    pub voices: Vec<String>,
    pub quick_stats: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubClusterArticle {
    pub article_id: uuid::Uuid,
    pub title: String,
    pub slug: String,
    pub section: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubFaqEntry {
    pub question: String,
    pub answer: String,
}
