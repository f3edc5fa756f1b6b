//! Entity-extraction prompt assembly per app ontology.

use nf_ai::{generate_structured, LlmClient, Message};
use nf_common::AdapterErrorKind;
use nf_graph::ontology::{entity_schema_for_app, EntitySchema, FinanceEntities, JobsEntities, RelocationEntities};
use nf_graph::{KnowledgeGraphAdapter, Neo4jKnowledgeGraph};

pub enum ExtractedEntities {
    Finance(FinanceEntities),
    Jobs(JobsEntities),
    Relocation(RelocationEntities),
}

fn extraction_instructions(schema: EntitySchema) -> &'static str {
    match schema {
        EntitySchema::Finance => "Extract Deal, Person, and Company entities mentioned in this content.",
        EntitySchema::Jobs => "Extract Job, Skill, Company, and Location entities mentioned in this content.",
        EntitySchema::Relocation => "Extract Location, Country, and Company entities mentioned in this content.",
    }
}

pub fn build_extraction_prompt(app: &str, content: &str) -> (EntitySchema, String) {
    let schema = entity_schema_for_app(app);
    let prompt = format!("{}\n\nContent:\n{}", extraction_instructions(schema), content);
    (schema, prompt)
}

pub async fn extract_entities(app: &str, content: &str, llm: &dyn LlmClient) -> Result<(ExtractedEntities, f64), AdapterErrorKind> {
    let (schema, prompt) = build_extraction_prompt(app, content);
    let messages = vec![Message::system("You extract typed entities. Return strict JSON only."), Message::user(prompt)];

    match schema {
        EntitySchema::Finance => {
            let (entities, cost) = generate_structured::<FinanceEntities>(llm, messages, 1).await?;
            Ok((ExtractedEntities::Finance(entities), cost))
        }
        EntitySchema::Jobs => {
            let (entities, cost) = generate_structured::<JobsEntities>(llm, messages, 1).await?;
            Ok((ExtractedEntities::Jobs(entities), cost))
        }
        EntitySchema::Relocation => {
            let (entities, cost) = generate_structured::<RelocationEntities>(llm, messages, 1).await?;
            Ok((ExtractedEntities::Relocation(entities), cost))
        }
    }
}

/// best-effort episode + typed entity sync. Failures are logged and
/// never propagated — KG sync never rolls back persistence.
pub async fn sync_to_graph(graph: &Neo4jKnowledgeGraph, app: &str, graph_id: &str, episode_uuid: &str, episode_body: &str, llm: &dyn LlmClient) {
    if let Err(e) = graph.add_episode(graph_id, episode_body).await {
        tracing::warn!(error = ?e, "kg episode sync failed");
        return;
    }

    match extract_entities(app, episode_body, llm).await {
        Ok((ExtractedEntities::Finance(entities), _)) => {
            if let Err(e) = graph.writer().write_finance_entities(graph_id, episode_uuid, &entities).await {
                tracing::warn!(error = ?e, "finance entity sync failed");
            }
        }
        Ok((ExtractedEntities::Jobs(entities), _)) => {
            if let Err(e) = graph.writer().write_jobs_entities(graph_id, &entities).await {
                tracing::warn!(error = ?e, "jobs entity sync failed");
            }
        }
        Ok((ExtractedEntities::Relocation(entities), _)) => {
            if let Err(e) = graph.writer().write_relocation_entities(graph_id, &entities).await {
                tracing::warn!(error = ?e, "relocation entity sync failed");
            }
        }
        Err(e) => tracing::warn!(error = ?e, "entity extraction failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_extraction_prompt_selects_schema_per_app() {
        let (schema, prompt) = build_extraction_prompt("placement", "some deal content");
        assert_eq!(schema, EntitySchema::Finance);
        assert!(prompt.contains("Deal"));

        let (schema, prompt) = build_extraction_prompt("jobs", "a job posting");
        assert_eq!(schema, EntitySchema::Jobs);
        assert!(prompt.contains("Skill"));

        let (schema, prompt) = build_extraction_prompt("relocation", "moving abroad");
        assert_eq!(schema, EntitySchema::Relocation);
        assert!(prompt.contains("Country"));
    }
}
