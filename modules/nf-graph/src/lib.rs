pub mod adapter;
pub mod client;
pub mod edges;
pub mod ontology;
pub mod writer;

pub use adapter::{KnowledgeGraphAdapter, Neo4jKnowledgeGraph};
pub use client::GraphClient;
pub use edges::Edge;
pub use ontology::{entity_schema_for_app, EntitySchema};
pub use writer::GraphWriter;
