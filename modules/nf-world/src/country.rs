use serde::{Deserialize, Serialize};

/// Read-mostly reference data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryRecord {
    pub country_code: String,
    pub name: String,
    pub slug: String,
    pub flag: Option<String>,
    pub region: Option<String>,
    pub continent: Option<String>,
    pub facts: serde_json::Value,
    pub visa_types: Vec<String>,
}
