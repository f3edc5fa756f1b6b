use crate::client::GraphClient;
use crate::edges::Edge;
use crate::ontology::{EntitySchema, FinanceEntities, JobsEntities, RelocationEntities};
use chrono::Utc;
use futures::TryStreamExt;
use neo4rs::query;
use nf_common::AdapterErrorKind;
use uuid::Uuid;

/// Typed facade over the bolt driver: episodes, fact-validity edges, and
/// per-app entity/edge writes.
pub struct GraphWriter {
    client: GraphClient,
}

impl GraphWriter {
    pub fn new(client: GraphClient) -> Self {
        Self { client }
    }

    /// Appends an episode to the app-specific graph summarizing new content.
    pub async fn add_episode(&self, graph_id: &str, episode_body: &str) -> Result<(), AdapterErrorKind> {
        let q = query(
            "MERGE (g:Graph {graph_id: $graph_id}) \
             CREATE (e:Episode {uuid: $uuid, body: $body, created_at: $created_at}) \
             CREATE (g)-[:HAS_EPISODE]->(e)",
        )
        .param("graph_id", graph_id)
        .param("uuid", Uuid::new_v4().to_string())
        .param("body", episode_body)
        .param("created_at", Utc::now().to_rfc3339());

        self.client.graph.run(q).await.map_err(|e| {
            tracing::warn!(error = %e, "add_episode failed");
            AdapterErrorKind::Upstream5xx
        })
    }

    /// `search_edges(graph_id, query, limit) → Edge[]`. Only valid facts
    /// (`invalid_at is null`) are meant to be passed downstream by callers.
    pub async fn search_edges(&self, graph_id: &str, search_query: &str, limit: usize) -> Result<Vec<Edge>, AdapterErrorKind> {
        let q = query(
            "MATCH (g:Graph {graph_id: $graph_id})-[:HAS_EPISODE]->(:Episode)-[:ASSERTS]->(f:Fact) \
             WHERE toLower(f.fact) CONTAINS toLower($search_query) \
             RETURN f.uuid AS uuid, f.fact AS fact, f.valid_from AS valid_from, f.invalid_at AS invalid_at \
             LIMIT $limit",
        )
        .param("graph_id", graph_id)
        .param("search_query", search_query)
        .param("limit", limit as i64);

        let mut stream = self.client.graph.execute(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        let mut edges = Vec::new();
        while let Some(row) = stream.next().await.map_err(|_| AdapterErrorKind::Parse)? {
            let uuid: String = row.get("uuid").unwrap_or_default();
            let fact: String = row.get("fact").unwrap_or_default();
            let valid_from_raw: String = row.get("valid_from").unwrap_or_default();
            let invalid_at_raw: Option<String> = row.get("invalid_at").ok();

            let valid_from = chrono::DateTime::parse_from_rfc3339(&valid_from_raw)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            let invalid_at = invalid_at_raw
                .and_then(|raw| chrono::DateTime::parse_from_rfc3339(&raw).ok())
                .map(|dt| dt.with_timezone(&Utc));

            edges.push(Edge { uuid, fact, valid_from, invalid_at });
        }
        Ok(edges)
    }

    pub async fn search_nodes(&self, graph_id: &str, label: &str, limit: usize) -> Result<Vec<String>, AdapterErrorKind> {
        let q = query(&format!(
            "MATCH (g:Graph {{graph_id: $graph_id}})-[:HAS_EPISODE]->(:Episode)-[:MENTIONS]->(n:{label}) \
             RETURN DISTINCT n.name AS name LIMIT $limit"
        ))
        .param("graph_id", graph_id)
        .param("limit", limit as i64);

        let mut stream = self.client.graph.execute(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        let mut names = Vec::new();
        while let Some(row) = stream.next().await.map_err(|_| AdapterErrorKind::Parse)? {
            names.push(row.get::<String>("name").unwrap_or_default());
        }
        Ok(names)
    }

    pub async fn delete_edge(&self, uuid: &str) -> Result<(), AdapterErrorKind> {
        let q = query("MATCH (f:Fact {uuid: $uuid}) DETACH DELETE f").param("uuid", uuid);
        self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)
    }

    pub async fn set_ontology(&self, graph_id: &str, schema: EntitySchema) -> Result<(), AdapterErrorKind> {
        let edge_types = crate::ontology::edge_types_for(schema).join(",");
        let q = query("MERGE (g:Graph {graph_id: $graph_id}) SET g.edge_types = $edge_types")
            .param("graph_id", graph_id)
            .param("edge_types", edge_types);
        self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)
    }

    pub async fn write_finance_entities(&self, graph_id: &str, episode_uuid: &str, entities: &FinanceEntities) -> Result<(), AdapterErrorKind> {
        for deal in &entities.deals {
            let q = query(
                "MERGE (g:Graph {graph_id: $graph_id}) \
                 MERGE (d:Deal {name: $name}) SET d.deal_type=$deal_type, d.value=$value, d.date=$date, d.sector=$sector \
                 MERGE (g)-[:HAS_ENTITY]->(d)",
            )
            .param("graph_id", graph_id)
            .param("name", deal.name.clone())
            .param("deal_type", deal.deal_type.clone())
            .param("value", deal.value.clone())
            .param("date", deal.date.clone())
            .param("sector", deal.sector.clone());
            self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;

            for party in &deal.parties {
                let q = query(
                    "MERGE (d:Deal {name: $deal_name}) MERGE (c:Company {name: $company}) \
                     MERGE (c)-[:ADVISED_ON {episode: $episode}]->(d)",
                )
                .param("deal_name", deal.name.clone())
                .param("company", party.clone())
                .param("episode", episode_uuid);
                self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
            }
        }

        for person in &entities.people {
            let q = query(
                "MERGE (p:Person {name: $name}) SET p.role=$role \
                 MERGE (c:Company {name: $company}) MERGE (p)-[:WORKS_AT]->(c)",
            )
            .param("name", person.name.clone())
            .param("role", person.role.clone())
            .param("company", person.company.clone());
            self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        }

        Ok(())
    }

    pub async fn write_jobs_entities(&self, graph_id: &str, entities: &JobsEntities) -> Result<(), AdapterErrorKind> {
        for job in &entities.jobs {
            let q = query(
                "MERGE (g:Graph {graph_id: $graph_id}) \
                 MERGE (j:Job {title: $title, company: $company}) \
                 MERGE (c:Company {name: $company}) MERGE (j)-[:POSTED_BY]->(c) \
                 MERGE (l:Location {name: $location}) MERGE (j)-[:LOCATED_IN]->(l) \
                 MERGE (g)-[:HAS_ENTITY]->(j)",
            )
            .param("graph_id", graph_id)
            .param("title", job.title.clone())
            .param("company", job.company.clone())
            .param("location", job.location.clone());
            self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        }

        for skill in &entities.skills {
            let rel = if skill.essential { "REQUIRES_ESSENTIAL" } else { "REQUIRES_PREFERRED" };
            let q = query(&format!(
                "MATCH (j:Job) MERGE (s:Skill {{name: $name}}) MERGE (j)-[:{rel}]->(s)"
            ))
            .param("name", skill.name.clone());
            self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        }

        Ok(())
    }

    pub async fn write_relocation_entities(&self, graph_id: &str, entities: &RelocationEntities) -> Result<(), AdapterErrorKind> {
        for country in &entities.countries {
            let q = query(
                "MERGE (g:Graph {graph_id: $graph_id}) \
                 MERGE (c:Country {country_code: $code}) SET c.name=$name \
                 MERGE (g)-[:HAS_ENTITY]->(c)",
            )
            .param("graph_id", graph_id)
            .param("code", country.country_code.clone())
            .param("name", country.name.clone());
            self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
        }

        for location in &entities.locations {
            for country in &entities.countries {
                let q = query(
                    "MERGE (l:Location {name: $location}) MERGE (c:Country {country_code: $code}) \
                     MERGE (l)-[:IN_COUNTRY]->(c)",
                )
                .param("location", location.name.clone())
                .param("code", country.country_code.clone());
                self.client.graph.run(q).await.map_err(|_| AdapterErrorKind::Upstream5xx)?;
            }
        }

        Ok(())
    }
}
