//! Workflow B — news monitor: scheduled fan-out-and-spawn. Fetches
//! candidate stories, assesses relevance against recent articles, and
//! starts a child Workflow A per top-ranked story.

use std::collections::HashMap;
use std::sync::Arc;

use restate_sdk::prelude::*;
use schemars::JsonSchema;
use serde::Deserialize;

use nf_ai::{generate_structured, Message};
use nf_common::normalize_url;
use nf_world::source::RawSource;

use crate::article::ArticleWorkflow;
use crate::retry::phase_retry_policy;
use crate::types::{ArticleRequest, EmptyRequest, NewsMonitorRequest, NewsMonitorResult};
use crate::PipelineDeps;

const RECENT_ARTICLE_DAYS_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct StoryAssessment {
    story_index: usize,
    priority: Priority,
    relevance_score: f64,
    #[allow(dead_code)]
    rationale: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
struct RelevanceResponse {
    assessments: Vec<StoryAssessment>,
}

/// Merges two story batches, deduped by normalized URL, preferring whichever
/// duplicate carries a timestamp.
fn merge_deduped_by_normalized_url(primary: Vec<RawSource>, secondary: Vec<RawSource>) -> Vec<RawSource> {
    let mut by_url: HashMap<String, RawSource> = HashMap::new();

    for source in primary.into_iter().chain(secondary) {
        let key = normalize_url(&source.url);
        match by_url.get(&key) {
            Some(existing) if existing.published_at.is_some() => {}
            _ => {
                by_url.insert(key, source);
            }
        }
    }

    by_url.into_values().collect()
}

fn build_relevance_prompt(stories: &[RawSource], app: &str, recent_titles: &[String], min_relevance: f64) -> String {
    let mut prompt = format!(
        "App context: {app}\nMinimum relevance: {min_relevance}\n\nRecently published (avoid duplicates):\n{}\n\nCandidate stories:\n",
        recent_titles.join("\n")
    );
    for (i, story) in stories.iter().enumerate() {
        prompt.push_str(&format!("[{i}] {} — {}\n", story.title, story.content_text.chars().take(300).collect::<String>()));
    }
    prompt.push_str("\nFor each story index, return priority (high/medium/low), relevance_score (0-10), and a one-line rationale.");
    prompt
}

#[restate_sdk::workflow]
#[name = "NewsMonitorWorkflow"]
pub trait NewsMonitorWorkflow {
    async fn run(req: NewsMonitorRequest) -> Result<NewsMonitorResult, HandlerError>;
    #[shared]
    async fn get_status(req: EmptyRequest) -> Result<String, HandlerError>;
}

pub struct NewsMonitorWorkflowImpl {
    deps: Arc<PipelineDeps>,
}

impl NewsMonitorWorkflowImpl {
    pub fn with_deps(deps: Arc<PipelineDeps>) -> Self {
        Self { deps }
    }
}

impl NewsMonitorWorkflow for NewsMonitorWorkflowImpl {
    async fn run(&self, ctx: WorkflowContext<'_>, req: NewsMonitorRequest) -> Result<NewsMonitorResult, HandlerError> {
        ctx.set("status", "Scanning news...".to_string());

        let region = self.deps.search_region_for(&req.app);
        let deps = self.deps.clone();
        let keywords = req.keywords.clone();
        let region_for_fetch = region.clone();
        let (primary, secondary) = ctx
            .run(|| async move {
                let (primary_result, _cost_a) = deps.news_search.search(&keywords, Some(region_for_fetch.as_str()), None).await;
                let topic_query = keywords.join(" ");
                let (secondary_result, _cost_b) = deps.news_search.search_for_topic(&topic_query, Some(region_for_fetch.as_str()), 25).await;
                Ok::<_, HandlerError>((primary_result.unwrap_or_default(), secondary_result.unwrap_or_default()))
            })
            .retry_policy(phase_retry_policy())
            .await?;

        let stories = merge_deduped_by_normalized_url(primary, secondary);
        let stories_seen = stories.len() as u32;

        ctx.set("status", "Loading recent articles...".to_string());
        let deps = self.deps.clone();
        let app = req.app.clone();
        let recent = ctx
            .run(|| async move {
                deps.persistence
                    .get_recent_articles(&app, RECENT_ARTICLE_DAYS_LIMIT)
                    .await
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("loading recent articles failed: {e}")).into() })
            })
            .await?;
        let recent_urls: std::collections::HashSet<String> = recent.iter().filter_map(|r| r.normalized_url.clone()).collect();
        let recent_titles: Vec<String> = recent.into_iter().map(|r| r.title).collect();

        let stories: Vec<RawSource> = stories.into_iter().filter(|s| !recent_urls.contains(&normalize_url(&s.url))).collect();

        if stories.is_empty() {
            ctx.set("status", "No stories found".to_string());
            return Ok(NewsMonitorResult { stories_seen: 0, children_spawned: 0, status: "no_stories".to_string() });
        }

        ctx.set("status", "Assessing relevance...".to_string());
        let prompt = build_relevance_prompt(&stories, &req.app, &recent_titles, req.min_relevance);
        let deps = self.deps.clone();
        let assessed = ctx
            .run(|| async move {
                let messages = vec![
                    Message::system("You triage news stories for editorial follow-up. Return strict JSON only."),
                    Message::user(prompt),
                ];
                generate_structured::<RelevanceResponse>(deps.llm.as_ref(), messages, 1)
                    .await
                    .map(|(r, _cost)| r.assessments)
                    .map_err(|e| -> HandlerError { TerminalError::new(format!("relevance assessment failed: {e:?}")).into() })
            })
            .retry_policy(phase_retry_policy())
            .await?;

        let mut ranked: Vec<&StoryAssessment> = assessed.iter().filter(|a| a.relevance_score >= req.min_relevance).collect();
        ranked.sort_by(|a, b| a.priority.cmp(&b.priority).then(b.relevance_score.partial_cmp(&a.relevance_score).unwrap_or(std::cmp::Ordering::Equal)));

        let top_k = if req.top_k == 0 { 3 } else { req.top_k };
        let mut children_spawned = 0u32;

        ctx.set("status", "Spawning article workflows...".to_string());
        for assessment in ranked.into_iter().take(top_k) {
            let Some(story) = stories.get(assessment.story_index) else { continue };
            let mut child_request = ArticleRequest::new(story.title.clone(), "news".to_string(), req.app.clone(), 900);
            child_request.origin_url = Some(story.url.clone());
            let workflow_id = format!("news-{}-{}", req.app, normalize_url(&story.url));
            ctx.workflow_client::<ArticleWorkflow>(workflow_id).run(child_request).send();
            children_spawned += 1;
        }

        ctx.set("status", "News monitor complete".to_string());
        Ok(NewsMonitorResult { stories_seen, children_spawned, status: "complete".to_string() })
    }

    async fn get_status(&self, ctx: SharedWorkflowContext<'_>, _req: EmptyRequest) -> Result<String, HandlerError> {
        crate::read_workflow_status(&ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(url: &str, title: &str, published: bool) -> RawSource {
        RawSource {
            source_id: url.to_string(),
            source_kind: nf_world::source::SourceKind::News,
            url: url.to_string(),
            title: title.to_string(),
            content_text: "body".to_string(),
            published_at: published.then(|| chrono::DateTime::UNIX_EPOCH),
            relevance_score: None,
            author: None,
        }
    }

    #[test]
    fn dedupes_by_normalized_url_preferring_timestamped() {
        let primary = vec![source("https://www.example.com/a?utm_source=x", "A (no date)", false)];
        let secondary = vec![source("https://example.com/a", "A (dated)", true)];
        let merged = merge_deduped_by_normalized_url(primary, secondary);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].title, "A (dated)");
    }

    #[test]
    fn keeps_distinct_urls() {
        let primary = vec![source("https://example.com/a", "A", false)];
        let secondary = vec![source("https://example.com/b", "B", false)];
        assert_eq!(merge_deduped_by_normalized_url(primary, secondary).len(), 2);
    }

    #[test]
    fn filters_stories_already_covered_by_recent_articles() {
        let stories = vec![source("https://example.com/a?utm_source=x", "A", false), source("https://example.com/b", "B", false)];
        let recent_urls: std::collections::HashSet<String> = [normalize_url("https://www.example.com/a")].into_iter().collect();
        let remaining: Vec<_> = stories.into_iter().filter(|s| !recent_urls.contains(&normalize_url(&s.url))).collect();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "B");
    }

    #[test]
    fn priority_orders_high_before_low() {
        let mut priorities = vec![Priority::Low, Priority::High, Priority::Medium];
        priorities.sort();
        assert_eq!(priorities, vec![Priority::High, Priority::Medium, Priority::Low]);
    }
}
