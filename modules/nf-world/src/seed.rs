use serde::{Deserialize, Serialize};

/// The triggering input to a workflow. Owned by the workflow run,
/// discarded after completion — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Seed {
    Topic {
        topic: String,
        article_type: String,
        app: String,
        target_word_count: Option<u32>,
        jurisdiction: Option<String>,
    },
    Url {
        url: String,
        app: String,
        category: Option<String>,
    },
    Country {
        country_name: String,
        country_code: String,
        app: String,
        video_quality: Option<String>,
    },
    Scheduled {
        app: String,
    },
}

impl Seed {
    pub fn app(&self) -> &str {
        match self {
            Seed::Topic { app, .. } => app,
            Seed::Url { app, .. } => app,
            Seed::Country { app, .. } => app,
            Seed::Scheduled { app } => app,
        }
    }
}
