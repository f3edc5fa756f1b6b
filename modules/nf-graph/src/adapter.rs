use crate::client::GraphClient;
use crate::edges::Edge;
use crate::ontology::{entity_schema_for_app, EntitySchema};
use crate::writer::GraphWriter;
use async_trait::async_trait;
use nf_common::AdapterErrorKind;

/// Uniform knowledge-graph contract: episode ingestion, fact search,
/// and ontology management, independent of the underlying store.
#[async_trait]
pub trait KnowledgeGraphAdapter: Send + Sync {
    async fn add_episode(&self, graph_id: &str, episode_body: &str) -> Result<(), AdapterErrorKind>;
    async fn search_edges(&self, graph_id: &str, query: &str, limit: usize) -> Result<Vec<Edge>, AdapterErrorKind>;
    async fn search_nodes(&self, graph_id: &str, label: &str, limit: usize) -> Result<Vec<String>, AdapterErrorKind>;
    async fn delete_edge(&self, uuid: &str) -> Result<(), AdapterErrorKind>;
    async fn set_ontology(&self, graph_id: &str, app: &str) -> Result<(), AdapterErrorKind>;
}

pub struct Neo4jKnowledgeGraph {
    writer: GraphWriter,
}

impl Neo4jKnowledgeGraph {
    pub fn new(client: GraphClient) -> Self {
        Self { writer: GraphWriter::new(client) }
    }

    pub fn entity_schema_for(&self, app: &str) -> EntitySchema {
        entity_schema_for_app(app)
    }

    pub fn writer(&self) -> &GraphWriter {
        &self.writer
    }
}

#[async_trait]
impl KnowledgeGraphAdapter for Neo4jKnowledgeGraph {
    async fn add_episode(&self, graph_id: &str, episode_body: &str) -> Result<(), AdapterErrorKind> {
        self.writer.add_episode(graph_id, episode_body).await
    }

    async fn search_edges(&self, graph_id: &str, query: &str, limit: usize) -> Result<Vec<Edge>, AdapterErrorKind> {
        let edges = self.writer.search_edges(graph_id, query, limit).await?;
        Ok(edges.into_iter().filter(Edge::is_valid).collect())
    }

    async fn search_nodes(&self, graph_id: &str, label: &str, limit: usize) -> Result<Vec<String>, AdapterErrorKind> {
        self.writer.search_nodes(graph_id, label, limit).await
    }

    async fn delete_edge(&self, uuid: &str) -> Result<(), AdapterErrorKind> {
        self.writer.delete_edge(uuid).await
    }

    async fn set_ontology(&self, graph_id: &str, app: &str) -> Result<(), AdapterErrorKind> {
        let schema = entity_schema_for_app(app);
        self.writer.set_ontology(graph_id, schema).await
    }
}
