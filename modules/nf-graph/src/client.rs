use neo4rs::{ConfigBuilder, Graph};

/// Thin wrapper over the bolt driver's connection pool.
#[derive(Clone)]
pub struct GraphClient {
    pub graph: Graph,
}

impl GraphClient {
    pub async fn connect(uri: &str, user: &str, password: &str) -> anyhow::Result<Self> {
        let config = ConfigBuilder::default()
            .uri(uri)
            .user(user)
            .password(password)
            .fetch_size(500)
            .max_connections(10)
            .build()?;
        let graph = Graph::connect(config).await?;
        Ok(Self { graph })
    }
}
