use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

// Import Restate traits to bring `.serve()` into scope.
use nf_workflows::article::ArticleWorkflow;
use nf_workflows::company_profile::CompanyProfileWorkflow;
use nf_workflows::country_guide::CountryGuideWorkflow;
use nf_workflows::news_monitor::NewsMonitorWorkflow;
use nf_workflows::segment_video::SegmentVideoWorkflow;
use nf_workflows::topic_cluster::TopicClusterWorkflow;

mod scheduler;

#[derive(Parser)]
#[command(name = "nf-worker", about = "Content pipeline workflow worker")]
struct Cli {
    /// Comma-separated list of apps to run the daily news-monitor cron for
    /// (overrides `NEWS_MONITOR_APPS`).
    #[arg(long)]
    news_monitor_apps: Option<String>,
}

fn scheduled_apps(cli_value: Option<String>) -> Vec<scheduler::ScheduledApp> {
    let raw = cli_value.or_else(|| std::env::var("NEWS_MONITOR_APPS").ok()).unwrap_or_default();
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, app)| scheduler::ScheduledApp {
            app: app.to_string(),
            keywords: vec![app.to_string()],
            min_relevance: 6.0,
            top_k: 3,
            trigger_hour_utc: (6 + i as u32) % 24,
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    tracing::info!("starting nf-worker");

    let cli = Cli::parse();

    let config = match nf_common::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "config missing at startup");
            std::process::exit(2);
        }
    };

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .context("connecting to database")?;

    sqlx::migrate!("../nf-persist/migrations").run(&pool).await.context("running migrations")?;
    tracing::info!("database ready");

    let graph_client = match (&config.neo4j_uri, &config.neo4j_user, &config.neo4j_password) {
        (Some(uri), Some(user), Some(password)) => nf_graph::GraphClient::connect(uri, user, password).await.context("connecting to neo4j")?,
        _ => {
            tracing::error!("NEO4J_URI/NEO4J_USER/NEO4J_PASSWORD must be set");
            std::process::exit(2);
        }
    };
    let graph = Arc::new(nf_graph::Neo4jKnowledgeGraph::new(graph_client));

    let llm: Arc<dyn nf_ai::LlmClient> = match config.ai_provider.as_str() {
        "openai" => Arc::new(nf_ai::openai::OpenAiClient::new(
            config.openai_api_key.clone().unwrap_or_default(),
            config.ai_model.clone(),
        )),
        _ => Arc::new(nf_ai::claude::ClaudeClient::new(
            config.anthropic_api_key.clone().unwrap_or_default(),
            config.ai_model.clone(),
        )),
    };

    let news_search: Arc<dyn nf_search::NewsSearchAdapter> = Arc::new(nf_search::HttpNewsSearchAdapter::new(config.news_search_api_key.clone()));
    let deep_research: Arc<dyn nf_search::DeepResearchAdapter> = Arc::new(nf_search::HttpDeepResearchAdapter::new(config.deep_research_api_key.clone()));
    let crawler: Arc<dyn nf_crawl::CrawlAdapter> = Arc::new(nf_crawl::HttpCrawlAdapter::new(config.paywall_min_chars));
    let video_gen: Arc<dyn nf_media::VideoGenAdapter> = Arc::new(nf_media::HttpVideoGenAdapter::new(config.video_gen_api_key.clone()));
    let media_host: Arc<dyn nf_media::MediaHostAdapter> = Arc::new(nf_media::HttpMediaHostAdapter::new(config.media_host_token.clone()));
    let image_gen: Arc<dyn nf_media::ImageGenAdapter> = Arc::new(nf_media::HttpImageGenAdapter::new(config.image_gen_api_key.clone()));
    let cdn: Arc<dyn nf_media::CdnAdapter> = Arc::new(nf_media::HttpCdnAdapter::new(
        config.cdn_api_key.clone(),
        config.cdn_api_secret.clone(),
        config.cdn_cloud_name.clone(),
    ));
    let persistence: Arc<dyn nf_persist::PersistenceAdapter> = Arc::new(nf_persist::PersistenceStore::new(pool));

    let deps = Arc::new(nf_workflows::deps::from_config(
        &config,
        news_search,
        deep_research,
        crawler,
        llm,
        video_gen,
        media_host,
        image_gen,
        cdn,
        graph,
        persistence,
    ));

    // ─── Restate Endpoint ───────────────────────────────────────────────────

    let restate_endpoint = restate_sdk::endpoint::Endpoint::builder()
        .bind(nf_workflows::article::ArticleWorkflowImpl::with_deps(deps.clone()).serve())
        .bind(nf_workflows::news_monitor::NewsMonitorWorkflowImpl::with_deps(deps.clone()).serve())
        .bind(nf_workflows::country_guide::CountryGuideWorkflowImpl::with_deps(deps.clone()).serve())
        .bind(nf_workflows::company_profile::CompanyProfileWorkflowImpl::with_deps(deps.clone()).serve())
        .bind(nf_workflows::segment_video::SegmentVideoWorkflowImpl::with_deps(deps.clone()).serve())
        .bind(nf_workflows::topic_cluster::TopicClusterWorkflowImpl::with_deps(deps.clone()).serve())
        .build();

    let bind_addr = std::env::var("WORKER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:9080".to_string());
    tracing::info!(addr = %bind_addr, "binding restate endpoint");

    // Auto-register with Restate admin so a restart doesn't require a manual
    // `restate deployments register` call.
    if let Some(admin_url) = &config.restate_admin_url {
        let self_url = config.restate_self_url.clone().unwrap_or_else(|| "http://localhost:9080".to_string());
        let client = reqwest::Client::new();
        let mut request = client.post(format!("{admin_url}/deployments")).json(&serde_json::json!({ "uri": self_url, "force": true }));
        if let Some(token) = &config.restate_auth_token {
            request = request.bearer_auth(token);
        }
        match request.send().await {
            Ok(resp) => tracing::info!(status = %resp.status(), "registered with restate admin"),
            Err(e) => tracing::warn!(error = %e, "failed to register with restate admin"),
        }
    }

    let ingress_url = config.restate_self_url.clone().unwrap_or_else(|| {
        let port = bind_addr.rsplit(':').next().unwrap_or("9080");
        format!("http://localhost:{port}")
    });
    let scheduled_apps = scheduled_apps(cli.news_monitor_apps);

    let restate_handle = tokio::spawn(async move {
        restate_sdk::http_server::HttpServer::new(restate_endpoint).listen_and_serve(bind_addr.parse().unwrap()).await;
    });

    let scheduler_handle = tokio::spawn(async move {
        scheduler::run(ingress_url, scheduled_apps).await;
    });

    tokio::select! {
        _ = restate_handle => {},
        _ = scheduler_handle => {},
    }

    Ok(())
}
