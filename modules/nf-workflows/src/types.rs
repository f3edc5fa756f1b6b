//! Shared request/response types for pipeline workflows. All types
//! implement `serde::{Serialize, Deserialize}` plus the Restate SDK
//! serialization traits via `impl_restate_serde!`.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Workflow phases
// ---------------------------------------------------------------------------

/// Named phases of Workflow A, used as status strings in Restate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowPhase {
    Pending,
    Researching,
    Narrating,
    AnalyzingSections,
    GeneratingVideo,
    InjectingImages,
    Persisting,
    SyncingGraph,
    Complete,
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Researching => write!(f, "Researching..."),
            Self::Narrating => write!(f, "Generating narrative..."),
            Self::AnalyzingSections => write!(f, "Analyzing sections..."),
            Self::GeneratingVideo => write!(f, "Generating video..."),
            Self::InjectingImages => write!(f, "Injecting section images..."),
            Self::Persisting => write!(f, "Persisting draft..."),
            Self::SyncingGraph => write!(f, "Syncing knowledge graph..."),
            Self::Complete => write!(f, "Article complete"),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Empty request for `get_status` shared handlers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyRequest;

/// Input for the article workflow: `{topic, article_type, app,
/// target_word_count, jurisdiction}` seed variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
    pub article_type: String,
    pub app: String,
    pub target_word_count: u32,
    pub jurisdiction: Option<String>,
    pub target_keywords: Vec<String>,
    pub four_act: bool,
    pub cluster_id: Option<uuid::Uuid>,
    pub parent_id: Option<uuid::Uuid>,
    pub target_keyword: Option<String>,
    pub reused_video_playback_id: Option<String>,
    pub reused_four_act_content: Option<Vec<nf_world::payload::FourActEntry>>,
    /// URL of the news story that triggered this article, if any. Carried
    /// through to the persisted payload so future news-monitor scans can
    /// exclude stories already covered.
    pub origin_url: Option<String>,
}

impl ArticleRequest {
    pub fn new(topic: String, article_type: String, app: String, target_word_count: u32) -> Self {
        Self {
            topic,
            article_type,
            app,
            target_word_count,
            jurisdiction: None,
            target_keywords: Vec::new(),
            four_act: false,
            cluster_id: None,
            parent_id: None,
            target_keyword: None,
            reused_video_playback_id: None,
            reused_four_act_content: None,
            origin_url: None,
        }
    }
}

/// `status` is one of `"created"`, `"created_with_warnings"`, or `"failed"`.
/// `errors` carries a code per degraded phase (e.g. `"video_generation_failed"`)
/// and is empty on a clean run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResult {
    pub status: String,
    pub article_id: uuid::Uuid,
    pub slug: String,
    pub word_count: u32,
    pub video_playback_id: Option<String>,
    pub total_cost: f64,
    pub errors: Vec<String>,
}

/// Input for the news-monitor workflow: `{app, scheduled=true}` seed variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsMonitorRequest {
    pub app: String,
    pub keywords: Vec<String>,
    pub min_relevance: f64,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsMonitorResult {
    pub stories_seen: u32,
    pub children_spawned: u32,
    pub status: String,
}

/// Input for the country-guide workflow: `{country_name, country_code, app}`
/// seed variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryGuideRequest {
    pub country_name: String,
    pub country_code: String,
    pub app: String,
    pub target_keywords: Vec<CountryGuideKeyword>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryGuideKeyword {
    pub keyword: String,
    pub keyword_volume: Option<u64>,
    pub planning_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryGuideResult {
    pub hub_id: uuid::Uuid,
    pub slug: String,
    pub segments_generated: u32,
    pub topic_clusters_spawned: u32,
    pub status: String,
}

/// Input for the company-profile workflow: `{url, app, category}` seed
/// variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfileRequest {
    pub url: String,
    pub app: String,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfileResult {
    pub status: String,
    pub company_id: Option<uuid::Uuid>,
    pub slug: Option<String>,
    pub needs_manual_review: bool,
}

/// Input for Workflow E, a child of Workflow C.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentVideoRequest {
    pub country_name: String,
    pub segment: String,
    pub article_id: uuid::Uuid,
    pub app: String,
    pub video_quality: String,
    pub four_act_content: Vec<nf_world::payload::FourActEntry>,
    pub character_reference_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentVideoResult {
    pub segment: String,
    pub video_narrative: nf_world::video::VideoNarrative,
    pub character_reference_url: Option<String>,
}

/// Input for Workflow F, a child of Workflow C.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicClusterRequest {
    pub app: String,
    pub country_name: String,
    pub cluster_id: uuid::Uuid,
    pub parent_id: uuid::Uuid,
    pub parent_playback_id: String,
    pub parent_four_act_content: Vec<nf_world::payload::FourActEntry>,
    pub target_keyword: String,
    pub keyword_volume: Option<u64>,
    pub planning_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicClusterResult {
    pub article_id: uuid::Uuid,
    pub slug: String,
    pub status: String,
}

// ---------------------------------------------------------------------------
// Restate serde impls
// ---------------------------------------------------------------------------

crate::impl_restate_serde!(EmptyRequest);
crate::impl_restate_serde!(ArticleRequest);
crate::impl_restate_serde!(ArticleResult);
crate::impl_restate_serde!(NewsMonitorRequest);
crate::impl_restate_serde!(NewsMonitorResult);
crate::impl_restate_serde!(CountryGuideRequest);
crate::impl_restate_serde!(CountryGuideResult);
crate::impl_restate_serde!(CompanyProfileRequest);
crate::impl_restate_serde!(CompanyProfileResult);
crate::impl_restate_serde!(SegmentVideoRequest);
crate::impl_restate_serde!(SegmentVideoResult);
crate::impl_restate_serde!(TopicClusterRequest);
crate::impl_restate_serde!(TopicClusterResult);
