use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Per-app entity/edge schema fixed by the app's domain:
/// finance → Deal/Person/Company, jobs → Job/Skill/Company/Location,
/// relocation → Location/Country/Company.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntitySchema {
    Finance,
    Jobs,
    Relocation,
}

pub fn entity_schema_for_app(app: &str) -> EntitySchema {
    match app {
        "placement" | "pe_news" | "finance" => EntitySchema::Finance,
        "jobs" | "recruiter" => EntitySchema::Jobs,
        "relocation" => EntitySchema::Relocation,
        _ => EntitySchema::Finance,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Deal {
    pub name: String,
    pub deal_type: String,
    pub value: String,
    pub date: String,
    pub sector: String,
    pub parties: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Person {
    pub name: String,
    pub role: String,
    pub company: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Company {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct FinanceEntities {
    pub deals: Vec<Deal>,
    pub people: Vec<Person>,
    pub companies: Vec<Company>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    pub title: String,
    pub company: String,
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Skill {
    pub name: String,
    pub essential: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct JobsEntities {
    pub jobs: Vec<Job>,
    pub skills: Vec<Skill>,
    pub companies: Vec<Company>,
    pub locations: Vec<Location>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Country {
    pub name: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct RelocationEntities {
    pub locations: Vec<Location>,
    pub countries: Vec<Country>,
    pub companies: Vec<Company>,
}

/// Edge type names per schema, used to label Cypher relationships.
pub fn edge_types_for(schema: EntitySchema) -> &'static [&'static str] {
    match schema {
        EntitySchema::Finance => &["ADVISED_ON", "WORKS_AT", "PARTNERED_WITH"],
        EntitySchema::Jobs => &["REQUIRES_ESSENTIAL", "REQUIRES_PREFERRED", "POSTED_BY", "LOCATED_IN"],
        EntitySchema::Relocation => &["IN_COUNTRY"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apps_map_to_documented_schemas() {
        assert_eq!(entity_schema_for_app("placement"), EntitySchema::Finance);
        assert_eq!(entity_schema_for_app("recruiter"), EntitySchema::Jobs);
        assert_eq!(entity_schema_for_app("relocation"), EntitySchema::Relocation);
        assert_eq!(entity_schema_for_app("unknown"), EntitySchema::Finance);
    }
}
