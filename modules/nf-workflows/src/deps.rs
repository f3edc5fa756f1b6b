//! Shared dependency container for all pipeline workflows: long-lived,
//! cloneable resources handed to every workflow impl as `Arc<PipelineDeps>`.

use nf_ai::LlmClient;
use nf_common::AppConfig;
use nf_crawl::CrawlAdapter;
use nf_graph::Neo4jKnowledgeGraph;
use nf_media::cdn::CdnAdapter;
use nf_media::image_gen::ImageGenAdapter;
use nf_media::media_host::MediaHostAdapter;
use nf_media::video_gen::VideoGenAdapter;
use nf_persist::PersistenceAdapter;
use nf_search::{DeepResearchAdapter, NewsSearchAdapter};
use std::sync::Arc;
use typed_builder::TypedBuilder;

#[derive(Clone, TypedBuilder)]
pub struct PipelineDeps {
    pub news_search: Arc<dyn NewsSearchAdapter>,
    pub deep_research: Arc<dyn DeepResearchAdapter>,
    pub crawler: Arc<dyn CrawlAdapter>,
    pub llm: Arc<dyn LlmClient>,
    pub video_gen: Arc<dyn VideoGenAdapter>,
    pub media_host: Arc<dyn MediaHostAdapter>,
    pub image_gen: Arc<dyn ImageGenAdapter>,
    pub cdn: Arc<dyn CdnAdapter>,
    pub graph: Arc<Neo4jKnowledgeGraph>,
    pub persistence: Arc<dyn PersistenceAdapter>,
    #[builder(default)]
    pub blocked_domains: Vec<String>,
    #[builder(default)]
    pub graph_id_overrides: Vec<(String, String)>,
    #[builder(default)]
    pub search_region_overrides: Vec<(String, String)>,
    #[builder(default = 3)]
    pub news_monitor_top_k: usize,
}

impl PipelineDeps {
    pub fn graph_id_for(&self, app: &str) -> String {
        nf_common::maps::graph_id_for_app(app, &self.graph_id_overrides)
    }

    pub fn search_region_for(&self, app: &str) -> String {
        nf_common::maps::search_region_for_app(app, &self.search_region_overrides)
    }
}

/// Convenience constructor mirroring `ScoutDeps::from_config`, given
/// already-constructed adapter instances (built by `nf-worker` from
/// `AppConfig`).
#[allow(clippy::too_many_arguments)]
pub fn from_config(
    config: &AppConfig,
    news_search: Arc<dyn NewsSearchAdapter>,
    deep_research: Arc<dyn DeepResearchAdapter>,
    crawler: Arc<dyn CrawlAdapter>,
    llm: Arc<dyn LlmClient>,
    video_gen: Arc<dyn VideoGenAdapter>,
    media_host: Arc<dyn MediaHostAdapter>,
    image_gen: Arc<dyn ImageGenAdapter>,
    cdn: Arc<dyn CdnAdapter>,
    graph: Arc<Neo4jKnowledgeGraph>,
    persistence: Arc<dyn PersistenceAdapter>,
) -> PipelineDeps {
    PipelineDeps::builder()
        .news_search(news_search)
        .deep_research(deep_research)
        .crawler(crawler)
        .llm(llm)
        .video_gen(video_gen)
        .media_host(media_host)
        .image_gen(image_gen)
        .cdn(cdn)
        .graph(graph)
        .persistence(persistence)
        .graph_id_overrides(config.graph_id_overrides.clone())
        .search_region_overrides(config.search_region_overrides.clone())
        .build()
}
