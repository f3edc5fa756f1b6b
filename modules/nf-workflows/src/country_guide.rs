//! Workflow C — country guide: a hub page built from a hero segment
//! (awaited synchronously so its video establishes a character reference),
//! further segments generated in parallel against that reference, and
//! high-value keywords spawned off as detached topic-cluster children.

use std::sync::Arc;

use futures::future::join_all;
use restate_sdk::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;

use nf_pipeline::{narrative, research};
use nf_world::hub::{Hub, HubPayload, HubStatus};
use nf_world::payload::FourActEntry;

use crate::retry::phase_retry_policy;
use crate::segment_video::SegmentVideoWorkflow;
use crate::topic_cluster::TopicClusterWorkflow;
use crate::types::{CountryGuideRequest, CountryGuideResult, EmptyRequest, SegmentVideoRequest, TopicClusterRequest};
use crate::PipelineDeps;

/// The five fixed segments of a country guide. `hero` runs first and its
/// video establishes the character-reference image the remaining four
/// segments generate against for visual continuity.
const GUIDE_SEGMENTS: &[&str] = &["hero", "family", "finance", "daily", "yolo"];

/// Keyword volume above which a topic cluster is worth a dedicated child
/// article rather than folding into the hub's FAQ section.
const HIGH_VALUE_KEYWORD_VOLUME: u64 = 500;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct GuideDraftSchema {
    title: String,
    slug: String,
    excerpt: String,
    meta_description: String,
    content: String,
    segments: Vec<GuideSegmentDraft>,
    faq: Vec<GuideFaqDraft>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct GuideSegmentDraft {
    name: String,
    four_act_content: Vec<FourActEntry>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct GuideFaqDraft {
    question: String,
    answer: String,
}

#[restate_sdk::workflow]
#[name = "CountryGuideWorkflow"]
pub trait CountryGuideWorkflow {
    async fn run(req: CountryGuideRequest) -> Result<CountryGuideResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct CountryGuideWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl CountryGuideWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

impl CountryGuideWorkflow for CountryGuideWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: CountryGuideRequest) -> Result<CountryGuideResult, HandlerError> {
        ctx.set("status", "Researching country guide...".to_string());

        let graph_id = self.deps.graph_id_for(&req.app);
        let region = self.deps.search_region_for(&req.app);
        let deps = self.deps.clone();
        let country_name = req.country_name.clone();
        let graph_id_for_research = graph_id.clone();
        let research_output = ctx
            .run(|| async move {
                let input = research::ResearchInput {
                    keywords: vec![country_name.clone(), "relocation guide".to_string()],
                    topic_query: format!("moving to {country_name}"),
                    region: Some(region.as_str()),
                    graph_id: &graph_id_for_research,
                };
                research::research(input, deps.news_search.as_ref(), deps.deep_research.as_ref(), deps.graph.as_ref(), deps.crawler.as_ref(), deps.llm.as_ref(), &deps.blocked_domains)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("country guide research failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        ctx.set("status", "Generating guide narrative...".to_string());
        let segment_names = GUIDE_SEGMENTS.join(", ");
        let prompt = format!(
            "{}\n\nWrite a country relocation guide with one four-act video treatment per segment ({segment_names}), plus an FAQ section.",
            narrative::build_prompt_context(&narrative::GenerateArticleInput {
                topic: &req.country_name,
                article_type: "country_guide",
                app: &req.app,
                target_word_count: 2200,
                jurisdiction: Some(req.country_code.as_str()),
                target_keywords: &req.target_keywords.iter().map(|k| k.keyword.clone()).collect::<Vec<_>>(),
                research: &research_output.curated,
                four_act: true,
            })
        );

        let deps = self.deps.clone();
        let (draft, _narrative_cost) = ctx
            .run(|| async move {
                narrative::generate_article_payload::<GuideDraftSchema>(deps.llm.as_ref(), prompt)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("guide narrative generation failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        if draft.segments.is_empty() {
            return Err(TerminalError::new("country guide narrative returned no segments").into());
        }

        let slug = narrative::normalize_slug(&draft.slug, &draft.title);

        // Reserve the hub's real id before spawning any children, so their
        // `article_id`/`parent_id` point at the row that will actually exist
        // once the hub is published. Persistence upserts on `(country_code,
        // slug)`, so this draft row is the same row the final upsert below
        // updates.
        ctx.set("status", "Reserving hub row...".to_string());
        let draft_hub = Hub {
            country_code: req.country_code.clone(),
            location_name: req.country_name.clone(),
            slug: slug.clone(),
            title: draft.title.clone(),
            meta_description: draft.meta_description.clone(),
            hub_content: draft.content.clone(),
            payload: HubPayload::default(),
            seo_data: serde_json::Value::Null,
            video_playback_id: None,
            status: HubStatus::Draft,
        };
        let deps = self.deps.clone();
        let draft_hub_for_persist = draft_hub.clone();
        let hub_id = ctx
            .run(|| async move {
                deps.persistence
                    .upsert_hub(&draft_hub_for_persist)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("hub reservation failed: {e}")).into() })
            })
            .await?;

        ctx.set("status", format!("Generating hero segment ({})...", draft.segments[0].name));
        let hero = &draft.segments[0];
        let hero_request = SegmentVideoRequest {
            country_name: req.country_name.clone(),
            segment: hero.name.clone(),
            article_id: hub_id,
            app: req.app.clone(),
            video_quality: "premium".to_string(),
            four_act_content: hero.four_act_content.clone(),
            character_reference_url: None,
        };
        let hero_result = ctx
            .workflow_client::<SegmentVideoWorkflow>(format!("guide-{}-hero", req.country_code))
            .run(hero_request)
            .call()
            .await?;
        let character_reference_url = hero_result.character_reference_url.clone();

        ctx.set("status", "Generating remaining segments...".to_string());
        let remaining_futures = draft.segments[1..].iter().enumerate().map(|(i, segment)| {
            let ctx = &ctx;
            let country_code = req.country_code.clone();
            let request = SegmentVideoRequest {
                country_name: req.country_name.clone(),
                segment: segment.name.clone(),
                article_id: hub_id,
                app: req.app.clone(),
                video_quality: "standard".to_string(),
                four_act_content: segment.four_act_content.clone(),
                character_reference_url: character_reference_url.clone(),
            };
            async move { ctx.workflow_client::<SegmentVideoWorkflow>(format!("guide-{country_code}-seg-{i}")).run(request).call().await }
        });
        let remaining_results: Vec<_> = join_all(remaining_futures).await.into_iter().collect::<Result<Vec<_>, _>>()?;

        let mut segment_results = vec![hero_result];
        segment_results.extend(remaining_results);

        ctx.set("status", "Spawning topic clusters...".to_string());
        // One cluster_id for every topic-cluster child spawned from this guide
        // run: they are siblings under the same Cluster, not separate clusters.
        let cluster_id = uuid::Uuid::new_v4();
        let mut topic_clusters_spawned = 0u32;
        for keyword in &req.target_keywords {
            if keyword.keyword_volume.unwrap_or(0) < HIGH_VALUE_KEYWORD_VOLUME {
                continue;
            }
            let request = TopicClusterRequest {
                app: req.app.clone(),
                country_name: req.country_name.clone(),
                cluster_id,
                parent_id: hub_id,
                parent_playback_id: segment_results[0].video_narrative.playback_id.clone(),
                parent_four_act_content: hero.four_act_content.clone(),
                target_keyword: keyword.keyword.clone(),
                keyword_volume: keyword.keyword_volume,
                planning_type: keyword.planning_type.clone(),
            };
            // `cluster_id` is shared across every child spawned here; the
            // workflow key still needs to be unique per child, so it's keyed
            // on the keyword rather than the (shared) cluster_id.
            let workflow_id = format!("cluster-{}-{}", req.country_code, narrative::normalize_slug("", &keyword.keyword));
            ctx.workflow_client::<TopicClusterWorkflow>(workflow_id).run(request).send();
            topic_clusters_spawned += 1;
        }

        ctx.set("status", "Persisting hub...".to_string());
        let hub = Hub {
            country_code: req.country_code.clone(),
            location_name: req.country_name.clone(),
            slug: slug.clone(),
            title: draft.title,
            meta_description: draft.meta_description,
            hub_content: draft.content,
            payload: HubPayload {
                cluster_articles: Vec::new(),
                faq: draft.faq.into_iter().map(|f| nf_world::hub::HubFaqEntry { question: f.question, answer: f.answer }).collect(),
                voices: Vec::new(),
                quick_stats: serde_json::Value::Null,
            },
            seo_data: serde_json::json!({ "excerpt": draft.excerpt }),
            video_playback_id: Some(segment_results[0].video_narrative.playback_id.clone()),
            status: HubStatus::Published,
        };

        let deps = self.deps.clone();
        let hub_for_persist = hub.clone();
        // Same `(country_code, slug)` as the reservation above, so this
        // updates the already-reserved row rather than creating a new one;
        // `hub_id` is intentionally not rebound here.
        ctx.run(|| async move {
            deps.persistence
                .upsert_hub(&hub_for_persist)
                .await
                .map_err(|e| -> HandlerError { TerminalError::new(format!("hub persistence failed: {e}")).into() })
        })
        .await?;

        ctx.set("status", "Country guide complete".to_string());
        Ok(CountryGuideResult {
            hub_id,
            slug,
            segments_generated: segment_results.len() as u32,
            topic_clusters_spawned,
            status: "published".to_string(),
        })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_is_first_of_five_fixed_segments() {
        assert_eq!(GUIDE_SEGMENTS.len(), 5);
        assert_eq!(GUIDE_SEGMENTS[0], "hero");
        assert_eq!(GUIDE_SEGMENTS, &["hero", "family", "finance", "daily", "yolo"]);
    }

    #[test]
    fn high_value_threshold_excludes_low_volume_keywords() {
        assert!(100 < HIGH_VALUE_KEYWORD_VOLUME);
        assert!(500 >= HIGH_VALUE_KEYWORD_VOLUME);
    }
}
