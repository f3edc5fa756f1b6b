use crate::video::VideoNarrative;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleMode {
    Story,
    Guide,
    Yolo,
    Voices,
    Topic,
    Hub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleStatus {
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub index: u32,
    pub title: String,
    pub content: String,
    pub word_count: u32,
    pub sentiment: Option<String>,
    pub visual_moment: Option<String>,
    pub should_generate_image: Option<bool>,
    /// Supplemented from the original content model: narrative-quality
    /// fields used by the image-prompt builder, dropped by the distilled
    /// section shape but present in the source's per-section metadata.
    pub business_context: Option<String>,
    pub visual_tone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FourActEntry {
    pub title: String,
    pub hint: String,
    pub factoid: String,
    pub visual_hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataSourceStat {
    pub count: u32,
    pub cost: f64,
    pub success: bool,
}

/// Supplemented from the original `ArticlePayload.mentioned_companies`;
/// backs the `article_companies` join table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyMention {
    pub company_name: String,
    pub relevance_score: f64,
    pub mention_count: u32,
    pub is_primary: bool,
}

/// Supplemented from the original content model: completeness/confidence
/// scoring and narrative-arc classification the distillation dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NarrativeQuality {
    pub completeness_score: Option<f64>,
    pub confidence_score: Option<f64>,
    pub narrative_arc: Option<String>,
}

/// The article/hub/company content object, with strict schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrativePayload {
    // identity
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub target_keywords: Vec<String>,
    pub word_count: u32,
    pub reading_time_minutes: u32,

    // body
    pub content: String,
    pub sections: Vec<Section>,

    // media prompts
    pub featured_image_prompt: String,
    pub section_image_prompts: Vec<String>,
    pub four_act_content: Option<Vec<FourActEntry>>,

    // media bindings (filled after media phase)
    pub video_playback_id: Option<String>,
    pub video_asset_id: Option<String>,
    pub hero_asset_url: Option<String>,
    pub featured_asset_url: Option<String>,
    pub content_image_urls: BTreeMap<u32, (String, String)>, // index -> (url, alt)
    pub video_narrative: Option<VideoNarrative>,

    // classification
    pub app: String,
    pub article_format: String,
    pub article_mode: ArticleMode,
    pub cluster_id: Option<uuid::Uuid>,
    pub parent_id: Option<uuid::Uuid>,
    pub target_keyword: Option<String>,
    pub keyword_volume: Option<u64>,
    pub keyword_difficulty: Option<f64>,

    // provenance
    pub research_cost: f64,
    pub data_sources: BTreeMap<String, DataSourceStat>,
    pub sources: Vec<String>,
    /// URL of the triggering story, when this article was spawned from a
    /// news-monitor candidate. Used to filter that story out of future scans.
    pub origin_url: Option<String>,

    // status
    pub status: ArticleStatus,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,

    // supplemented quality/company fields
    pub quality: NarrativeQuality,
    pub mentioned_companies: Vec<CompanyMention>,

    // forward-compatible passthrough for unknown fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl NarrativePayload {
    /// Invariant 5: if a playback id is set, a thumbnail-derived asset is too.
    pub fn has_consistent_video_bindings(&self) -> bool {
        if self.video_playback_id.is_some() {
            self.hero_asset_url.is_some() || self.featured_asset_url.is_some()
        } else {
            true
        }
    }

    /// Invariant 7.
    pub fn has_valid_description_lengths(&self) -> bool {
        self.meta_description.chars().count() <= 160 && self.excerpt.chars().count() <= 400
    }

    /// Invariant 3: dense 0-based section indices.
    pub fn has_dense_section_indices(&self) -> bool {
        self.sections.iter().enumerate().all(|(i, s)| s.index == i as u32)
    }

    /// Invariant 3: section word counts sum to `word_count` within ±5%.
    pub fn section_word_counts_within_tolerance(&self) -> bool {
        if self.sections.is_empty() {
            return true;
        }
        let total: u32 = self.sections.iter().map(|s| s.word_count).sum();
        if self.word_count == 0 {
            return total == 0;
        }
        let delta = (total as f64 - self.word_count as f64).abs();
        delta <= self.word_count as f64 * 0.05
    }

    /// Invariant 6: a child's cluster_id must equal its parent's.
    pub fn has_consistent_cluster_lineage(&self, parent_cluster_id: Option<uuid::Uuid>) -> bool {
        if self.parent_id.is_some() {
            self.cluster_id == parent_cluster_id
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_payload() -> NarrativePayload {
        NarrativePayload {
            title: "T".into(),
            slug: "t".into(),
            excerpt: "e".into(),
            meta_description: "m".into(),
            tags: vec![],
            target_keywords: vec![],
            word_count: 0,
            reading_time_minutes: 1,
            content: String::new(),
            sections: vec![],
            featured_image_prompt: "p".into(),
            section_image_prompts: vec![],
            four_act_content: None,
            video_playback_id: None,
            video_asset_id: None,
            hero_asset_url: None,
            featured_asset_url: None,
            content_image_urls: BTreeMap::new(),
            video_narrative: None,
            app: "relocation".into(),
            article_format: "article".into(),
            article_mode: ArticleMode::Guide,
            cluster_id: None,
            parent_id: None,
            target_keyword: None,
            keyword_volume: None,
            keyword_difficulty: None,
            research_cost: 0.0,
            data_sources: BTreeMap::new(),
            sources: vec![],
            origin_url: None,
            status: ArticleStatus::Draft,
            published_at: None,
            quality: NarrativeQuality::default(),
            mentioned_companies: vec![],
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn video_binding_invariant_requires_thumbnail_asset() {
        let mut p = minimal_payload();
        p.video_playback_id = Some("pb123".into());
        assert!(!p.has_consistent_video_bindings());
        p.hero_asset_url = Some("https://image.mux.com/pb123/thumbnail.jpg".into());
        assert!(p.has_consistent_video_bindings());
    }

    #[test]
    fn unknown_fields_round_trip_through_extra() {
        let mut p = minimal_payload();
        p.extra.insert("zep_fact_count".to_string(), serde_json::json!(3));
        let json = serde_json::to_string(&p).unwrap();
        let back: NarrativePayload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.extra.get("zep_fact_count"), Some(&serde_json::json!(3)));
    }
}
