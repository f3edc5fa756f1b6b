use anyhow::Result;

/// Process-wide configuration loaded once at startup from the environment.
/// Mirrors the "Configuration" table in the external-interfaces contract:
/// engine connection, persistence, per-service API keys, AI selection, and
/// the region/graph-id overrides.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Workflow engine
    pub restate_admin_url: Option<String>,
    pub restate_self_url: Option<String>,
    pub restate_auth_token: Option<String>,

    // Persistence
    pub database_url: String,
    pub database_max_connections: u32,

    // Knowledge graph
    pub neo4j_uri: Option<String>,
    pub neo4j_user: Option<String>,
    pub neo4j_password: Option<String>,

    // AI / LLM
    pub ai_provider: String,
    pub ai_model: String,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,

    // Research adapters
    pub news_search_api_key: Option<String>,
    pub deep_research_api_key: Option<String>,
    pub crawl_api_key: Option<String>,

    // Media adapters
    pub image_gen_api_key: Option<String>,
    pub video_gen_api_key: Option<String>,
    pub media_host_token: Option<String>,
    pub cdn_api_key: Option<String>,
    pub cdn_api_secret: Option<String>,
    pub cdn_cloud_name: Option<String>,

    // Tunables
    pub research_context_char_limit: usize,
    pub paywall_min_chars: usize,
    pub crawl_parallelism: usize,
    pub crawl_delay_ms: u64,
    pub max_curated_sources: usize,

    // Overrides
    pub graph_id_overrides: Vec<(String, String)>,
    pub search_region_overrides: Vec<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            restate_admin_url: std::env::var("RESTATE_ADMIN_URL").ok(),
            restate_self_url: std::env::var("RESTATE_SELF_URL").ok(),
            restate_auth_token: std::env::var("RESTATE_AUTH_TOKEN").ok(),

            database_url: std::env::var("DATABASE_URL")?,
            database_max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),

            neo4j_uri: std::env::var("NEO4J_URI").ok(),
            neo4j_user: std::env::var("NEO4J_USER").ok(),
            neo4j_password: std::env::var("NEO4J_PASSWORD").ok(),

            ai_provider: std::env::var("AI_PROVIDER").unwrap_or_else(|_| "anthropic".to_string()),
            ai_model: std::env::var("AI_MODEL").unwrap_or_else(|_| "claude-sonnet-4-5".to_string()),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),

            news_search_api_key: std::env::var("NEWS_SEARCH_API_KEY").ok(),
            deep_research_api_key: std::env::var("DEEP_RESEARCH_API_KEY").ok(),
            crawl_api_key: std::env::var("CRAWL_API_KEY").ok(),

            image_gen_api_key: std::env::var("IMAGE_GEN_API_KEY").ok(),
            video_gen_api_key: std::env::var("VIDEO_GEN_API_KEY").ok(),
            media_host_token: std::env::var("MEDIA_HOST_TOKEN").ok(),
            cdn_api_key: std::env::var("CDN_API_KEY").ok(),
            cdn_api_secret: std::env::var("CDN_API_SECRET").ok(),
            cdn_cloud_name: std::env::var("CDN_CLOUD_NAME").ok(),

            research_context_char_limit: std::env::var("RESEARCH_CONTEXT_CHAR_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(80_000),
            paywall_min_chars: std::env::var("PAYWALL_MIN_CHARS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            crawl_parallelism: std::env::var("CRAWL_PARALLELISM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            crawl_delay_ms: std::env::var("CRAWL_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(500),
            max_curated_sources: std::env::var("MAX_CURATED_SOURCES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),

            graph_id_overrides: parse_pairs(std::env::var("GRAPH_ID_OVERRIDES").ok()),
            search_region_overrides: parse_pairs(std::env::var("SEARCH_REGION_OVERRIDES").ok()),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        fn preview(val: &str) -> String {
            let n = val.len().min(5);
            format!("{}...({} chars)", &val[..n], val.len())
        }
        fn preview_opt(val: &Option<String>) -> String {
            match val {
                Some(v) if !v.is_empty() => preview(v),
                _ => "<not set>".to_string(),
            }
        }

        tracing::info!("config loaded");
        tracing::info!(database_url = %preview(&self.database_url));
        tracing::info!(openai_api_key = %preview_opt(&self.openai_api_key));
        tracing::info!(anthropic_api_key = %preview_opt(&self.anthropic_api_key));
        tracing::info!(neo4j_uri = %preview_opt(&self.neo4j_uri));
        tracing::info!(video_gen_api_key = %preview_opt(&self.video_gen_api_key));
        tracing::info!(media_host_token = %preview_opt(&self.media_host_token));
        tracing::info!(ai_provider = %self.ai_provider, ai_model = %self.ai_model);
    }
}

fn parse_pairs(raw: Option<String>) -> Vec<(String, String)> {
    raw.unwrap_or_default()
        .split(',')
        .filter(|s| !s.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let k = parts.next()?.trim().to_string();
            let v = parts.next()?.trim().to_string();
            Some((k, v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pairs_ignores_malformed_entries() {
        let pairs = parse_pairs(Some("UK=uk,bad,US=us".to_string()));
        assert_eq!(pairs, vec![("UK".to_string(), "uk".to_string()), ("US".to_string(), "us".to_string())]);
    }
}
