use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `{fact, valid_from, invalid_at?, uuid}`. A fact is valid iff
/// `invalid_at` is null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub uuid: String,
    pub fact: String,
    pub valid_from: DateTime<Utc>,
    pub invalid_at: Option<DateTime<Utc>>,
}

impl Edge {
    pub fn is_valid(&self) -> bool {
        self.invalid_at.is_none()
    }
}
