//! Workflow D — company profile: builds a company profile from a URL
//! seed, with an ambiguity gate before any write and best-effort logo
//! sourcing.

use std::sync::Arc;

use restate_sdk::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;

use nf_ai::{generate_structured, Message};
use nf_common::{normalize_url, slug::slugify};
use nf_media::cdn::sequential_public_id;
use nf_pipeline::{kg, narrative};
use nf_world::records::CompanyRecord;
use nf_world::source::{CuratedSourceSet, RawSource, SourceKind};

use crate::retry::phase_retry_policy;
use crate::types::{CompanyProfileRequest, CompanyProfileResult, EmptyRequest};
use crate::PipelineDeps;

const AMBIGUITY_RETRY_THRESHOLD: f64 = 0.7;
const AMBIGUITY_ABORT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct AmbiguityCheck {
    confidence: f64,
    #[allow(dead_code)]
    rationale: String,
    refined_terms: Option<String>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct CompanyProfileDraftSchema {
    name: String,
    slug: String,
    meta_description: String,
    content: String,
    logo_prompt: String,
}

#[restate_sdk::workflow]
#[name = "CompanyProfileWorkflow"]
pub trait CompanyProfileWorkflow {
    async fn run(req: CompanyProfileRequest) -> Result<CompanyProfileResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct CompanyProfileWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl CompanyProfileWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

/// Fans out crawl, news search, and deep research for one company URL;
/// tolerant of individual adapter failure the way `research::research` is.
async fn gather_company_context(deps: &PipelineDeps, url: &str, query: &str, region: Option<&str>) -> (Vec<RawSource>, f64) {
    let ((crawl_outcome, _crawl_cost), (news_result, news_cost), (deep_result, deep_cost)) = futures::join!(
        deps.crawler.crawl_one(url),
        deps.news_search.search(&[query.to_string()], region, None),
        deps.deep_research.research(query, std::time::Duration::from_secs(90)),
    );

    let mut sources = Vec::new();
    let mut cost = news_cost + deep_cost;

    if let Ok(page) = crawl_outcome {
        sources.push(RawSource {
            source_id: "crawl_0".to_string(),
            source_kind: SourceKind::CrawledPage,
            url: url.to_string(),
            title: page.title,
            content_text: page.content,
            published_at: None,
            relevance_score: None,
            author: None,
        });
    }
    for (i, source) in news_result.unwrap_or_default().into_iter().enumerate() {
        sources.push(RawSource { source_id: format!("news_{i}"), ..source });
    }
    if let Ok(deep) = deep_result {
        for (i, output) in deep.task_outputs.iter().enumerate() {
            sources.push(RawSource {
                source_id: format!("research_{i}"),
                source_kind: SourceKind::DeepResearch,
                url: String::new(),
                title: format!("Deep research task {i}"),
                content_text: output.clone(),
                published_at: None,
                relevance_score: None,
                author: None,
            });
        }
    }
    let _ = &mut cost;
    (sources, cost)
}

fn sources_as_curated(sources: &[RawSource]) -> CuratedSourceSet {
    CuratedSourceSet {
        entries: sources
            .iter()
            .map(|s| nf_world::source::CuratedEntry {
                source_id: s.source_id.clone(),
                relevance_score: s.relevance_score.unwrap_or(0.6),
                summary: s.content_text.chars().take(280).collect(),
                key_quote: None,
                full_content: s.content_text.clone(),
                url: s.url.clone(),
                source_kind: s.source_kind,
            })
            .collect(),
        key_facts: Vec::new(),
        perspectives: Vec::new(),
        duplicate_groups: Vec::new(),
        curation_failed: false,
    }
}

impl CompanyProfileWorkflow for CompanyProfileWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: CompanyProfileRequest) -> Result<CompanyProfileResult, HandlerError> {
        ctx.set("status", "Gathering company context...".to_string());

        let normalized_url = normalize_url(&req.url);
        let region = self.deps.search_region_for(&req.app);
        let graph_id = self.deps.graph_id_for(&req.app);

        let deps = self.deps.clone();
        let query = req.category.clone().unwrap_or_else(|| normalized_url.clone());
        let region_for_fetch = region.clone();
        let url_for_fetch = normalized_url.clone();
        let (mut sources, mut total_cost) = ctx
            .run(|| async move { Ok::<_, HandlerError>(gather_company_context(&deps, &url_for_fetch, &query, Some(region_for_fetch.as_str())).await) })
            .retry_policy(phase_retry_policy())
            .await?;

        if sources.is_empty() {
            return Err(TerminalError::new("no sources found for company URL").into());
        }

        ctx.set("status", "Checking research cohesion...".to_string());
        let deps = self.deps.clone();
        let context_for_check = sources_as_curated(&sources);
        let url_for_check = normalized_url.clone();
        let check = ctx
            .run(|| async move {
                let prompt = format!(
                    "Assess whether these sources plausibly describe a single company at {}.\n{}",
                    url_for_check,
                    context_for_check.entries.iter().map(|e| e.summary.clone()).collect::<Vec<_>>().join("\n")
                );
                let messages = vec![Message::system("You judge research cohesion. Return strict JSON only."), Message::user(prompt)];
                generate_structured::<AmbiguityCheck>(deps.llm.as_ref(), messages, 1)
                    .await
                    .map(|(c, _cost)| c)
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("ambiguity check failed: {e:?}")).into() })
            })
            .await?;

        let confidence = if check.confidence < AMBIGUITY_RETRY_THRESHOLD {
            ctx.set("status", "Re-querying with refined terms...".to_string());
            let refined_query = check.refined_terms.clone().unwrap_or_else(|| normalized_url.clone());
            let deps = self.deps.clone();
            let url_for_retry = normalized_url.clone();
            let region_for_retry = region.clone();
            let (retry_sources, retry_cost) = ctx
                .run(|| async move { Ok::<_, HandlerError>(gather_company_context(&deps, &url_for_retry, &refined_query, Some(region_for_retry.as_str())).await) })
                .retry_policy(phase_retry_policy())
                .await?;
            sources = retry_sources;
            total_cost += retry_cost;
            check.confidence
        } else {
            check.confidence
        };

        if confidence < AMBIGUITY_ABORT_THRESHOLD {
            ctx.set("status", "Marked for manual review".to_string());
            return Ok(CompanyProfileResult { status: "needs_manual_review".to_string(), company_id: None, slug: None, needs_manual_review: true });
        }

        ctx.set("status", "Generating profile narrative...".to_string());
        let curated = sources_as_curated(&sources);
        let prompt = narrative::build_prompt_context(&narrative::GenerateArticleInput {
            topic: &normalized_url,
            article_type: "company_profile",
            app: &req.app,
            target_word_count: 500,
            jurisdiction: None,
            target_keywords: &[],
            research: &curated,
            four_act: false,
        });

        let deps = self.deps.clone();
        let (draft, narrative_cost) = ctx
            .run(|| async move {
                narrative::generate_article_payload::<CompanyProfileDraftSchema>(deps.llm.as_ref(), prompt)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("profile narrative generation failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;
        total_cost += narrative_cost;

        let slug = narrative::normalize_slug(&draft.slug, &draft.name);

        ctx.set("status", "Sourcing logo...".to_string());
        let deps = self.deps.clone();
        let logo_prompt = draft.logo_prompt.clone();
        let slug_for_logo = slug.clone();
        let logo_url = ctx
            .run(|| async move {
                let (generated, _gen_cost) = deps.image_gen.generate(&logo_prompt, "1:1", None, "standard").await;
                let image_url = match generated {
                    Ok(url) => url,
                    Err(_) => return Ok::<Option<String>, HandlerError>(None),
                };
                let public_id = sequential_public_id(&slug_for_logo, "logo", 0);
                match deps.cdn.upload(&image_url, "companies", &public_id).await {
                    (Ok(cdn_url), _cost) => Ok(Some(cdn_url)),
                    (Err(_), _cost) => Ok(None),
                }
            })
            .await?;

        ctx.set("status", "Persisting company profile...".to_string());
        let deps = self.deps.clone();
        let company = CompanyRecord {
            id: uuid::Uuid::new_v4(),
            slug: slugify(&slug),
            name: draft.name,
            app: req.app.clone(),
            featured_image_url: logo_url,
            meta_description: Some(draft.meta_description),
            payload: serde_json::json!({ "content": draft.content, "source_url": normalized_url }),
        };
        let company_for_persist = company.clone();
        let company_id = ctx
            .run(|| async move {
                deps.persistence
                    .upsert_company(&company_for_persist)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("company persistence failed: {e}")).into() })
            })
            .await?;

        ctx.set("status", "Syncing knowledge graph...".to_string());
        let deps = self.deps.clone();
        let app = req.app.clone();
        let episode_uuid = company_id.to_string();
        let episode_body = company.payload.to_string();
        ctx.run(|| async move {
            kg::sync_to_graph(&deps.graph, &app, &graph_id, &episode_uuid, &episode_body, deps.llm.as_ref()).await;
            Ok::<(), HandlerError>(())
        })
        .await?;

        let _ = total_cost;
        ctx.set("status", "Company profile complete".to_string());
        Ok(CompanyProfileResult { status: "published".to_string(), company_id: Some(company_id), slug: Some(company.slug), needs_manual_review: false })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curated_sources_default_to_moderate_relevance_when_unscored() {
        let sources = vec![RawSource {
            source_id: "s0".to_string(),
            source_kind: SourceKind::CrawledPage,
            url: "https://acme.test".to_string(),
            title: "Acme".to_string(),
            content_text: "x".repeat(400),
            published_at: None,
            relevance_score: None,
            author: None,
        }];
        let curated = sources_as_curated(&sources);
        assert_eq!(curated.entries.len(), 1);
        assert_eq!(curated.entries[0].relevance_score, 0.6);
        assert_eq!(curated.entries[0].summary.chars().count(), 280);
        assert!(!curated.curation_failed);
    }

    #[test]
    fn ambiguity_thresholds_order_retry_before_abort() {
        assert!(AMBIGUITY_ABORT_THRESHOLD < AMBIGUITY_RETRY_THRESHOLD);
    }
}
