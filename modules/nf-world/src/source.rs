use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    News,
    DeepResearch,
    CrawledPage,
    KnowledgeGraphEdge,
}

impl SourceKind {
    /// Tie-break priority for curated ordering: crawled > deep_research > news.
    /// Lower is higher priority.
    pub fn tie_break_rank(self) -> u8 {
        match self {
            SourceKind::CrawledPage => 0,
            SourceKind::DeepResearch => 1,
            SourceKind::News => 2,
            SourceKind::KnowledgeGraphEdge => 3,
        }
    }
}

/// A single retrieved document. Produced by adapters, consumed by
/// curation; never persisted directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSource {
    pub source_id: String,
    pub source_kind: SourceKind,
    pub url: String,
    pub title: String,
    pub content_text: String,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub relevance_score: Option<f64>,
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedEntry {
    pub source_id: String,
    pub relevance_score: f64,
    pub summary: String,
    pub key_quote: Option<String>,
    pub full_content: String,
    pub url: String,
    pub source_kind: SourceKind,
}

/// Output of the curation step. Not persisted; carried in-workflow.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CuratedSourceSet {
    pub entries: Vec<CuratedEntry>,
    pub key_facts: Vec<String>,
    pub perspectives: Vec<String>,
    pub duplicate_groups: Vec<Vec<String>>,
    pub curation_failed: bool,
}
