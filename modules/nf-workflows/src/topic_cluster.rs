//! Workflow F — topic cluster: a narrower narrative spawned from a
//! country guide's high-value keywords. Skips video generation entirely and
//! reuses the parent segment's video for section images.

use std::collections::BTreeMap;
use std::sync::Arc;

use restate_sdk::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;

use nf_pipeline::{kg, media, narrative, research};
use nf_world::payload::{ArticleMode, ArticleStatus, DataSourceStat, NarrativePayload, Section};
use nf_world::video::VideoNarrative;

use crate::retry::phase_retry_policy;
use crate::types::{EmptyRequest, TopicClusterRequest, TopicClusterResult};
use crate::PipelineDeps;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct ClusterDraftSchema {
    title: String,
    slug: String,
    excerpt: String,
    meta_description: String,
    tags: Vec<String>,
    content: String,
    sections: Vec<ClusterDraftSection>,
    featured_image_prompt: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct ClusterDraftSection {
    index: u32,
    title: String,
    content: String,
    word_count: u32,
}

#[restate_sdk::workflow]
#[name = "TopicClusterWorkflow"]
pub trait TopicClusterWorkflow {
    async fn run(req: TopicClusterRequest) -> Result<TopicClusterResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct TopicClusterWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl TopicClusterWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

impl TopicClusterWorkflow for TopicClusterWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: TopicClusterRequest) -> Result<TopicClusterResult, HandlerError> {
        ctx.set("status", "Researching cluster keyword...".to_string());

        let graph_id = self.deps.graph_id_for(&req.app);
        let region = self.deps.search_region_for(&req.app);

        let deps = self.deps.clone();
        let keyword = req.target_keyword.clone();
        let graph_id_for_research = graph_id.clone();
        let research_output = ctx
            .run(|| async move {
                let input = research::ResearchInput {
                    keywords: vec![keyword.clone()],
                    topic_query: keyword,
                    region: Some(region.as_str()),
                    graph_id: &graph_id_for_research,
                };
                research::research(input, deps.news_search.as_ref(), deps.deep_research.as_ref(), deps.graph.as_ref(), deps.crawler.as_ref(), deps.llm.as_ref(), &deps.blocked_domains)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("cluster research failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        ctx.set("status", "Generating cluster narrative...".to_string());
        let prompt = narrative::build_prompt_context(&narrative::GenerateArticleInput {
            topic: &req.target_keyword,
            article_type: "topic_cluster",
            app: &req.app,
            target_word_count: 600,
            jurisdiction: Some(req.country_name.as_str()),
            target_keywords: std::slice::from_ref(&req.target_keyword),
            research: &research_output.curated,
            four_act: false,
        });

        let deps = self.deps.clone();
        let (draft, narrative_cost) = ctx
            .run(|| async move {
                narrative::generate_article_payload::<ClusterDraftSchema>(deps.llm.as_ref(), prompt)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("cluster narrative generation failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        if draft.content.trim().is_empty() {
            return Err(TerminalError::new("cluster narrative generation returned empty content").into());
        }

        let slug = narrative::normalize_slug(&draft.slug, &draft.title);
        let (word_count, reading_time_minutes) = narrative::normalize_word_count_and_reading_time(&draft.content);

        let mut data_sources = BTreeMap::new();
        for (service, count) in &research_output.raw_counts_by_source {
            data_sources.insert(service.clone(), DataSourceStat { count: *count, cost: 0.0, success: *count > 0 });
        }

        let reused_video = VideoNarrative {
            playback_id: req.parent_playback_id.clone(),
            asset_id: None,
            duration_seconds: 3.0 * req.parent_four_act_content.len().max(1) as f64,
            acts: Vec::new(),
            mux_urls: Default::default(),
            prompt_used: String::new(),
            template_name: "four_act".to_string(),
            reused_from_parent: true,
        };

        ctx.set("status", "Injecting reused section images...".to_string());
        let (preamble, sections) = media::split_content_by_h2(&draft.content);
        let times = media::even_distribution_times(sections.len(), reused_video.duration_seconds);
        let content = media::inject_section_images(&preamble, &sections, &times, &reused_video.playback_id, 640);

        let mut payload = NarrativePayload {
            title: draft.title,
            slug,
            excerpt: draft.excerpt,
            meta_description: draft.meta_description,
            tags: draft.tags,
            target_keywords: vec![req.target_keyword.clone()],
            word_count,
            reading_time_minutes,
            content,
            sections: draft
                .sections
                .into_iter()
                .map(|s| Section {
                    index: s.index,
                    title: s.title,
                    content: s.content,
                    word_count: s.word_count,
                    sentiment: None,
                    visual_moment: None,
                    should_generate_image: None,
                    business_context: None,
                    visual_tone: None,
                })
                .collect(),
            featured_image_prompt: draft.featured_image_prompt,
            section_image_prompts: Vec::new(),
            four_act_content: Some(req.parent_four_act_content.clone()),
            video_playback_id: Some(req.parent_playback_id.clone()),
            video_asset_id: None,
            hero_asset_url: None,
            featured_asset_url: None,
            content_image_urls: BTreeMap::new(),
            video_narrative: Some(reused_video),
            app: req.app.clone(),
            article_format: "topic_cluster".to_string(),
            article_mode: ArticleMode::Topic,
            cluster_id: Some(req.cluster_id),
            parent_id: Some(req.parent_id),
            target_keyword: Some(req.target_keyword.clone()),
            keyword_volume: req.keyword_volume,
            keyword_difficulty: None,
            research_cost: research_output.total_cost,
            data_sources,
            sources: research_output.curated.entries.iter().map(|e| e.url.clone()).filter(|u| !u.is_empty()).collect(),
            status: ArticleStatus::Published,
            published_at: None,
            quality: Default::default(),
            mentioned_companies: Vec::new(),
            extra: serde_json::Map::new(),
        };

        ctx.set("status", "Persisting cluster article...".to_string());
        let deps = self.deps.clone();
        let persist_payload = payload.clone();
        let article_id = ctx
            .run(|| async move {
                deps.persistence
                    .upsert_article(&persist_payload)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("cluster persistence failed: {e}")).into() })
            })
            .await?;
        payload.status = ArticleStatus::Published;

        ctx.set("status", "Syncing knowledge graph...".to_string());
        let deps = self.deps.clone();
        let app = req.app.clone();
        let graph_id_for_sync = graph_id.clone();
        let episode_uuid = article_id.to_string();
        let episode_body = payload.content.clone();
        ctx.run(|| async move {
            kg::sync_to_graph(&deps.graph, &app, &graph_id_for_sync, &episode_uuid, &episode_body, deps.llm.as_ref()).await;
            Ok::<(), HandlerError>(())
        })
        .await?;

        let _ = narrative_cost;
        ctx.set("status", "Topic cluster complete".to_string());
        Ok(TopicClusterResult { article_id, slug: payload.slug, status: "published".to_string() })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_world::payload::FourActEntry;

    fn four_act(n: usize) -> Vec<FourActEntry> {
        (0..n).map(|i| FourActEntry { title: format!("Act {i}"), hint: String::new(), factoid: String::new(), visual_hint: String::new() }).collect()
    }

    #[test]
    fn reused_video_duration_tracks_parent_act_count() {
        let acts = four_act(4);
        let duration = 3.0 * acts.len().max(1) as f64;
        assert_eq!(duration, 12.0);
    }

    #[test]
    fn reused_video_duration_never_zero_with_no_acts() {
        let acts = four_act(0);
        let duration = 3.0 * acts.len().max(1) as f64;
        assert_eq!(duration, 3.0);
    }
}
