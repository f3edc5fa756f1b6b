//! Fan-out search/crawl/KG context, curate into a `CuratedSourceSet`.

use futures::future::join_all;
use nf_ai::{generate_structured, LlmClient, Message};
use nf_common::{normalize_url, AdapterErrorKind};
use nf_crawl::CrawlAdapter;
use nf_graph::KnowledgeGraphAdapter;
use nf_search::{DeepResearchAdapter, NewsSearchAdapter};
use nf_world::source::{CuratedEntry, CuratedSourceSet, RawSource, SourceKind};
use schemars::JsonSchema;
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_TOP_K_URLS: usize = 30;
pub const DEFAULT_CRAWL_PARALLELISM: usize = 5;
pub const DEFAULT_CRAWL_DELAY_MS: u64 = 500;
pub const DEFAULT_CURATION_MAX_ENTRIES: usize = 20;

#[derive(Debug, Clone)]
pub struct ResearchInput<'a> {
    pub keywords: Vec<String>,
    pub topic_query: String,
    pub region: Option<&'a str>,
    pub graph_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct ResearchOutput {
    pub curated: CuratedSourceSet,
    pub raw_counts_by_source: std::collections::BTreeMap<String, u32>,
    pub total_cost: f64,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CurationEntryOut {
    source_id: String,
    relevance_score: f64,
    summary: String,
    key_quote: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct CurationResponse {
    entries: Vec<CurationEntryOut>,
    key_facts: Vec<String>,
    perspectives: Vec<String>,
    duplicate_groups: Vec<Vec<String>>,
}

/// Runs every future to completion, tolerating individual failures instead
/// of short-circuiting on the first error.
pub async fn gather_settled<T>(futures: Vec<impl std::future::Future<Output = T>>) -> Vec<T> {
    join_all(futures).await
}

/// Normalizes, deduplicates, filters blocked domains, caps to `top_k`.
pub fn select_urls(urls: impl IntoIterator<Item = String>, blocked_domains: &[String], top_k: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut selected = Vec::new();

    for url in urls {
        let normalized = normalize_url(&url);
        if !seen.insert(normalized.clone()) {
            continue;
        }
        if blocked_domains.iter().any(|d| normalized.contains(d.as_str())) {
            continue;
        }
        selected.push(normalized);
        if selected.len() >= top_k {
            break;
        }
    }
    selected
}

/// Ordering: relevance desc, then source_kind tie-break, then shorter URL.
pub fn order_curated_entries(entries: &mut [CuratedEntry]) {
    entries.sort_by(|a, b| {
        b.relevance_score
            .partial_cmp(&a.relevance_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.source_kind.tie_break_rank().cmp(&b.source_kind.tie_break_rank()))
            .then_with(|| a.url.len().cmp(&b.url.len()))
    });
}

/// Within a duplicate-group cluster, keep only the entry with the longest `full_content`.
pub fn collapse_duplicate_groups(entries: Vec<CuratedEntry>, duplicate_groups: &[Vec<String>]) -> Vec<CuratedEntry> {
    let mut dropped: HashSet<String> = HashSet::new();
    for group in duplicate_groups {
        let mut best: Option<&String> = None;
        let mut best_len = 0usize;
        for source_id in group {
            if let Some(entry) = entries.iter().find(|e| &e.source_id == source_id) {
                if entry.full_content.len() > best_len {
                    best_len = entry.full_content.len();
                    best = Some(source_id);
                }
            }
        }
        for source_id in group {
            if Some(source_id) != best {
                dropped.insert(source_id.clone());
            }
        }
    }
    entries.into_iter().filter(|e| !dropped.contains(&e.source_id)).collect()
}

pub async fn research(
    input: ResearchInput<'_>,
    news: &dyn NewsSearchAdapter,
    deep_research: &dyn DeepResearchAdapter,
    graph: &dyn KnowledgeGraphAdapter,
    crawler: &dyn CrawlAdapter,
    llm: &dyn LlmClient,
    blocked_domains: &[String],
) -> Result<ResearchOutput, AdapterErrorKind> {
    let ((news_result, news_cost), (deep_result, deep_cost), kg_result) = futures::join!(
        news.search(&input.keywords, input.region, None),
        deep_research.research(&input.topic_query, std::time::Duration::from_secs(120)),
        graph.search_edges(input.graph_id, &input.topic_query, 10)
    );

    let mut total_cost = news_cost + deep_cost;
    let mut raw_counts_by_source = std::collections::BTreeMap::new();

    if news_result.is_err() && deep_result.is_err() && kg_result.is_err() {
        return Err(AdapterErrorKind::Upstream5xx);
    }

    let news_sources = news_result.unwrap_or_default();
    raw_counts_by_source.insert("news".to_string(), news_sources.len() as u32);

    let mut candidate_urls: Vec<String> = news_sources.iter().map(|s| s.url.clone()).collect();
    let deep_research_output = deep_result.ok();
    if let Some(dr) = &deep_research_output {
        candidate_urls.extend(dr.task_outputs.iter().filter(|t| t.starts_with("http")).cloned());
    }

    let selected_urls = select_urls(candidate_urls, blocked_domains, DEFAULT_TOP_K_URLS);
    let crawl_results = crawler.crawl_many(&selected_urls, DEFAULT_CRAWL_PARALLELISM, DEFAULT_CRAWL_DELAY_MS).await;

    let mut raw_sources: Vec<RawSource> = Vec::new();
    for (i, source) in news_sources.into_iter().enumerate() {
        raw_sources.push(RawSource { source_id: format!("news_{i}"), ..source });
    }

    let mut crawl_success = 0u32;
    for (i, result) in crawl_results.into_iter().enumerate() {
        total_cost += result.cost_usd;
        if let Ok(page) = result.outcome {
            crawl_success += 1;
            raw_sources.push(RawSource {
                source_id: format!("crawl_{i}"),
                source_kind: SourceKind::CrawledPage,
                url: result.url,
                title: page.title,
                content_text: page.content,
                published_at: None,
                relevance_score: None,
                author: None,
            });
        }
    }
    raw_counts_by_source.insert("crawl".to_string(), crawl_success);

    if let Some(dr) = &deep_research_output {
        for (i, output) in dr.task_outputs.iter().enumerate() {
            raw_sources.push(RawSource {
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
    raw_counts_by_source.insert("research".to_string(), deep_research_output.as_ref().map(|d| d.task_outputs.len()).unwrap_or(0) as u32);

    if let Ok(edges) = kg_result {
        for (i, edge) in edges.into_iter().filter(|e| e.is_valid()).enumerate() {
            raw_sources.push(RawSource {
                source_id: format!("kg_{i}"),
                source_kind: SourceKind::KnowledgeGraphEdge,
                url: String::new(),
                title: "Knowledge graph fact".to_string(),
                content_text: edge.fact,
                published_at: None,
                relevance_score: None,
                author: None,
            });
        }
    }

    if raw_sources.is_empty() {
        return Err(AdapterErrorKind::Upstream5xx);
    }

    let curated = curate(&raw_sources, llm, &mut total_cost).await;

    Ok(ResearchOutput { curated, raw_counts_by_source, total_cost })
}

async fn curate(raw_sources: &[RawSource], llm: &dyn LlmClient, total_cost: &mut f64) -> CuratedSourceSet {
    let prompt = build_curation_prompt(raw_sources);
    let messages = vec![
        Message::system("You curate research sources into a ranked summary. Return strict JSON only."),
        Message::user(prompt),
    ];

    match generate_structured::<CurationResponse>(llm, messages, 2).await {
        Ok((response, cost)) => {
            *total_cost += cost;
            let mut entries: Vec<CuratedEntry> = response
                .entries
                .into_iter()
                .filter_map(|e| {
                    let source = raw_sources.iter().find(|s| s.source_id == e.source_id)?;
                    Some(CuratedEntry {
                        source_id: e.source_id,
                        relevance_score: e.relevance_score,
                        summary: e.summary,
                        key_quote: e.key_quote,
                        full_content: source.content_text.clone(),
                        url: source.url.clone(),
                        source_kind: source.source_kind,
                    })
                })
                .collect();

            entries = collapse_duplicate_groups(entries, &response.duplicate_groups);
            order_curated_entries(&mut entries);
            entries.truncate(DEFAULT_CURATION_MAX_ENTRIES);

            CuratedSourceSet {
                entries,
                key_facts: response.key_facts,
                perspectives: response.perspectives,
                duplicate_groups: response.duplicate_groups,
                curation_failed: false,
            }
        }
        Err(_) => fallback_curation(raw_sources),
    }
}

/// first N raw sources verbatim, `curation_failed=true`.
fn fallback_curation(raw_sources: &[RawSource]) -> CuratedSourceSet {
    let entries = raw_sources
        .iter()
        .take(DEFAULT_CURATION_MAX_ENTRIES)
        .map(|s| CuratedEntry {
            source_id: s.source_id.clone(),
            relevance_score: s.relevance_score.unwrap_or(0.5),
            summary: s.content_text.chars().take(280).collect(),
            key_quote: None,
            full_content: s.content_text.clone(),
            url: s.url.clone(),
            source_kind: s.source_kind,
        })
        .collect();

    CuratedSourceSet { entries, key_facts: vec![], perspectives: vec![], duplicate_groups: vec![], curation_failed: true }
}

fn build_curation_prompt(raw_sources: &[RawSource]) -> String {
    let mut prompt = String::from("Curate the following sources. Reference each by source_id.\n\n");
    for source in raw_sources {
        prompt.push_str(&format!(
            "--- {} ({:?}) ---\nURL: {}\nTitle: {}\n{}\n\n",
            source.source_id, source.source_kind, source.url, source.title, source.content_text
        ));
    }
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use nf_world::source::SourceKind;

    fn entry(id: &str, score: f64, kind: SourceKind, url: &str, content: &str) -> CuratedEntry {
        CuratedEntry {
            source_id: id.into(),
            relevance_score: score,
            summary: String::new(),
            key_quote: None,
            full_content: content.into(),
            url: url.into(),
            source_kind: kind,
        }
    }

    #[test]
    fn select_urls_dedupes_normalizes_and_caps() {
        let urls = vec![
            "https://www.Example.com/a?utm_source=x".to_string(),
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        let selected = select_urls(urls, &[], 10);
        assert_eq!(selected.len(), 2);
    }

    #[test]
    fn select_urls_filters_blocked_domains() {
        let urls = vec!["https://paywalled.test/story".to_string(), "https://open.test/story".to_string()];
        let selected = select_urls(urls, &["paywalled.test".to_string()], 10);
        assert_eq!(selected, vec!["https://open.test/story"]);
    }

    #[test]
    fn order_curated_entries_breaks_ties_by_kind_then_url_length() {
        let mut entries = vec![
            entry("a", 0.9, SourceKind::News, "https://x.test/long-url-here", "x"),
            entry("b", 0.9, SourceKind::CrawledPage, "https://x.test/short", "x"),
            entry("c", 0.5, SourceKind::CrawledPage, "https://x.test", "x"),
        ];
        order_curated_entries(&mut entries);
        assert_eq!(entries[0].source_id, "b");
        assert_eq!(entries[1].source_id, "a");
        assert_eq!(entries[2].source_id, "c");
    }

    #[test]
    fn collapse_duplicate_groups_keeps_longest_content() {
        let entries = vec![entry("a", 0.9, SourceKind::News, "u1", "short"), entry("b", 0.8, SourceKind::News, "u2", "much longer content here")];
        let groups = vec![vec!["a".to_string(), "b".to_string()]];
        let collapsed = collapse_duplicate_groups(entries, &groups);
        assert_eq!(collapsed.len(), 1);
        assert_eq!(collapsed[0].source_id, "b");
    }
}
