//! Workflow A — article creation: research → narrative → section
//! analysis → video → section-image injection → persist draft → republish
//! published → KG sync best-effort.

use std::collections::BTreeMap;
use std::sync::Arc;

use restate_sdk::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;

use nf_pipeline::{kg, media, narrative, research};
use nf_world::payload::{ArticleMode, ArticleStatus, DataSourceStat, FourActEntry, NarrativePayload, Section};

use crate::retry::phase_retry_policy;
use crate::types::{ArticleRequest, ArticleResult, EmptyRequest, WorkflowPhase};
use crate::PipelineDeps;

/// The LLM-generated slice of a `NarrativePayload`; everything else
/// (media bindings, provenance, status) is filled in by the workflow once
/// the draft is normalized.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct ArticleDraftSchema {
    title: String,
    slug: String,
    excerpt: String,
    meta_description: String,
    tags: Vec<String>,
    content: String,
    sections: Vec<DraftSection>,
    featured_image_prompt: String,
    section_image_prompts: Vec<String>,
    four_act_content: Option<Vec<FourActEntry>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct DraftSection {
    index: u32,
    title: String,
    content: String,
    word_count: u32,
}

#[restate_sdk::workflow]
#[name = "ArticleWorkflow"]
pub trait ArticleWorkflow {
    async fn run(req: ArticleRequest) -> Result<ArticleResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct ArticleWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl ArticleWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

impl ArticleWorkflow for ArticleWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: ArticleRequest) -> Result<ArticleResult, HandlerError> {
        let article_id = uuid::Uuid::new_v4();
        ctx.set("status", WorkflowPhase::Researching.to_string());

        let graph_id = self.deps.graph_id_for(&req.app);
        let region = self.deps.search_region_for(&req.app);
        let mut total_cost = 0.0;

        let deps = self.deps.clone();
        let req_for_research = req.clone();
        let graph_id_for_research = graph_id.clone();
        let research_output = ctx
            .run(|| async move {
                let input = research::ResearchInput {
                    keywords: req_for_research.target_keywords.clone(),
                    topic_query: req_for_research.topic.clone(),
                    region: Some(region.as_str()),
                    graph_id: &graph_id_for_research,
                };
                research::research(
                    input,
                    deps.news_search.as_ref(),
                    deps.deep_research.as_ref(),
                    deps.graph.as_ref(),
                    deps.crawler.as_ref(),
                    deps.llm.as_ref(),
                    &deps.blocked_domains,
                )
                .await
                .map_err(|e| -> HandlerError { TerminalError::new(format!("research failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        total_cost += research_output.total_cost;
        ctx.set("status", WorkflowPhase::Narrating.to_string());

        let prompt = narrative::build_prompt_context(&narrative::GenerateArticleInput {
            topic: &req.topic,
            article_type: &req.article_type,
            app: &req.app,
            target_word_count: req.target_word_count,
            jurisdiction: req.jurisdiction.as_deref(),
            target_keywords: &req.target_keywords,
            research: &research_output.curated,
            four_act: req.four_act,
        });

        let deps = self.deps.clone();
        let (draft, narrative_cost) = ctx
            .run(|| async move {
                narrative::generate_article_payload::<ArticleDraftSchema>(deps.llm.as_ref(), prompt)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("narrative generation failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;
        total_cost += narrative_cost;

        if draft.content.trim().is_empty() {
            return Err(TerminalError::new("narrative generation returned empty content").into());
        }

        let slug = narrative::normalize_slug(&draft.slug, &draft.title);
        let (word_count, reading_time_minutes) = narrative::normalize_word_count_and_reading_time(&draft.content);
        let featured_image_prompt = if draft.featured_image_prompt.trim().is_empty() {
            narrative::default_featured_image_prompt(&draft.title, &req.app)
        } else {
            draft.featured_image_prompt.clone()
        };

        let mut data_sources = BTreeMap::new();
        for (service, count) in &research_output.raw_counts_by_source {
            data_sources.insert(service.clone(), DataSourceStat { count: *count, cost: 0.0, success: *count > 0 });
        }

        let mut payload = NarrativePayload {
            title: draft.title,
            slug,
            excerpt: draft.excerpt,
            meta_description: draft.meta_description,
            tags: draft.tags,
            target_keywords: req.target_keywords.clone(),
            word_count,
            reading_time_minutes,
            content: draft.content,
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
            featured_image_prompt,
            section_image_prompts: draft.section_image_prompts,
            four_act_content: draft.four_act_content,
            video_playback_id: None,
            video_asset_id: None,
            hero_asset_url: None,
            featured_asset_url: None,
            content_image_urls: BTreeMap::new(),
            video_narrative: None,
            app: req.app.clone(),
            article_format: req.article_type.clone(),
            article_mode: if req.parent_id.is_some() { ArticleMode::Topic } else { ArticleMode::Story },
            cluster_id: req.cluster_id,
            parent_id: req.parent_id,
            target_keyword: req.target_keyword.clone(),
            keyword_volume: None,
            keyword_difficulty: None,
            research_cost: research_output.total_cost,
            data_sources,
            sources: research_output.curated.entries.iter().map(|e| e.url.clone()).filter(|u| !u.is_empty()).collect(),
            origin_url: req.origin_url.clone(),
            status: ArticleStatus::Draft,
            published_at: None,
            quality: Default::default(),
            mentioned_companies: Vec::new(),
            extra: serde_json::Map::new(),
        };

        let mut errors: Vec<String> = Vec::new();

        if let Some(hints) = payload.four_act_content.clone() {
            ctx.set("status", WorkflowPhase::GeneratingVideo.to_string());
            let visual_hints: Vec<String> = hints.iter().map(|h| h.visual_hint.clone()).collect();
            let deps = self.deps.clone();
            let title = payload.title.clone();
            let app = req.app.clone();
            let cluster_id = payload.cluster_id.map(|c| c.to_string());
            let article_id_str = article_id.to_string();

            // Video generation degrades gracefully: a failure here (even
            // after exhausting the retryable kinds) still lets the rest of
            // the otherwise-complete narrative persist, with
            // `video_playback_id` left null and the failure recorded below
            // rather than aborting the whole article.
            let video_attempt = ctx
                .run(|| async move {
                    media::make_video(
                        &media::MakeVideoInput {
                            visual_hints: &visual_hints,
                            app_style_directive: style_directive_for_app(&app),
                            title: &title,
                            mode: "story",
                            country: None,
                            app: &app,
                            cluster_id: cluster_id.as_deref(),
                            article_id: &article_id_str,
                            model_tier: nf_media::video_gen::ModelTier::Standard,
                        },
                        deps.video_gen.as_ref(),
                        deps.media_host.as_ref(),
                    )
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("video generation failed: {e:?}")).into() })
                })
                .retry_policy(phase_retry_policy())
                .await;

            match video_attempt {
                Ok((video_narrative, media_cost)) => {
                    total_cost += media_cost;

                    payload.video_playback_id = Some(video_narrative.playback_id.clone());
                    payload.video_asset_id = video_narrative.asset_id.clone();
                    payload.hero_asset_url = Some(video_narrative.mux_urls.hero_thumb.clone());
                    payload.featured_asset_url = Some(video_narrative.mux_urls.hero_thumb.clone());

                    ctx.set("status", WorkflowPhase::AnalyzingSections.to_string());
                    let (preamble, sections) = media::split_content_by_h2(&payload.content);
                    let section_titles: Vec<String> = sections.iter().map(|s| s.title.clone()).collect();
                    let deps = self.deps.clone();
                    let video_for_classify = video_narrative.clone();
                    let (times, classify_cost) = ctx
                        .run(|| async move { Ok::<_, HandlerError>(media::choose_section_times(&section_titles, &video_for_classify, deps.llm.as_ref()).await) })
                        .await?;
                    total_cost += classify_cost;

                    ctx.set("status", WorkflowPhase::InjectingImages.to_string());
                    payload.content = media::inject_section_images(&preamble, &sections, &times, &video_narrative.playback_id, 640);
                    payload.video_narrative = Some(video_narrative);
                }
                Err(_) => {
                    errors.push("video_generation_failed".to_string());
                }
            }
        }

        ctx.set("status", WorkflowPhase::Persisting.to_string());
        let deps = self.deps.clone();
        let draft_payload = payload.clone();
        let article_id = ctx
            .run(|| async move {
                deps.persistence
                    .upsert_article(&draft_payload)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("persistence failed: {e}")).into() })
            })
            .await?;

        payload.status = ArticleStatus::Published;
        payload.published_at = Some(chrono_now_placeholder());

        let deps = self.deps.clone();
        let published_payload = payload.clone();
        ctx.run(|| async move {
            deps.persistence
                .upsert_article(&published_payload)
                .await
                .map_err(|e| -> HandlerError { TerminalError::new(format!("republish failed: {e}")).into() })
        })
        .await?;

        if let Some(jurisdiction) = req.jurisdiction.clone() {
            let deps = self.deps.clone();
            ctx.run(|| async move {
                deps.persistence
                    .link_article_to_country(article_id, &jurisdiction, "primary")
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("country link failed: {e}")).into() })
            })
            .await?;
        }

        ctx.set("status", WorkflowPhase::SyncingGraph.to_string());
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

        ctx.set("status", WorkflowPhase::Complete.to_string());

        let status = if errors.is_empty() { "created" } else { "created_with_warnings" };

        Ok(ArticleResult {
            status: status.to_string(),
            article_id,
            slug: payload.slug,
            word_count: payload.word_count,
            video_playback_id: payload.video_playback_id,
            total_cost,
            errors,
        })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

fn style_directive_for_app(app: &str) -> &'static str {
    match app {
        "relocation" => "Warm documentary style, natural light, everyday moments of settling into a new country.",
        "jobs" | "recruiter" => "Clean, modern office and workplace photography style.",
        _ => "Neutral, professional editorial style.",
    }
}

/// Workflow code must not call `Utc::now()` directly;
/// this placeholder documents where an activity-wrapped clock read belongs
/// once the engine's journaled time API is wired in `nf-worker`.
fn chrono_now_placeholder() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::UNIX_EPOCH
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_directive_is_picked_per_app() {
        assert!(style_directive_for_app("relocation").contains("documentary"));
        assert!(style_directive_for_app("jobs").contains("office"));
        assert!(style_directive_for_app("recruiter").contains("office"));
        assert!(style_directive_for_app("finance").contains("editorial"));
    }

    #[test]
    fn article_mode_depends_on_parent_id() {
        let mode_for = |parent_id: Option<uuid::Uuid>| if parent_id.is_some() { ArticleMode::Topic } else { ArticleMode::Story };
        assert_eq!(mode_for(Some(uuid::Uuid::new_v4())), ArticleMode::Topic);
        assert_eq!(mode_for(None), ArticleMode::Story);
    }
}
