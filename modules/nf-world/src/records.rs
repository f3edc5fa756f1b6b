use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only log of news-monitor/company scrape runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeHistory {
    pub id: Uuid,
    pub board_id: Option<Uuid>,
    pub status: String,
    pub jobs_found: u32,
    pub execution_time_ms: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: Uuid,
    pub title: String,
    pub company_slug: String,
    pub url: String,
    pub normalized_url: String,
    pub last_scraped_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub app: String,
    pub featured_image_url: Option<String>,
    pub meta_description: Option<String>,
    pub payload: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentArticleSummary {
    pub id: Uuid,
    pub title: String,
    pub url: Option<String>,
    pub normalized_url: Option<String>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
}
