use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A logical grouping identified by `cluster_id`. Not stored as its
/// own row; reconstructed via join over `articles`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub cluster_id: Uuid,
    pub guide_article_id: Uuid,
    pub children: Vec<ClusterChild>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterChild {
    pub article_id: Uuid,
    pub article_mode: Option<String>,
    pub target_keyword: Option<String>,
}

impl Cluster {
    /// A cluster has exactly one parent ("guide") and zero or more children,
    /// each with a unique `article_mode` (mode children) or unique
    /// `target_keyword` (topic children).
    pub fn has_unique_child_identities(&self) -> bool {
        let mut modes = std::collections::BTreeSet::new();
        let mut keywords = std::collections::BTreeSet::new();
        for child in &self.children {
            if let Some(m) = &child.article_mode {
                if !modes.insert(m.clone()) {
                    return false;
                }
            }
            if let Some(k) = &child.target_keyword {
                if !keywords.insert(k.clone()) {
                    return false;
                }
            }
        }
        true
    }
}
