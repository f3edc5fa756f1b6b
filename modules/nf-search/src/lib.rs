pub mod deep_research;
pub mod news;

pub use deep_research::{DeepResearchAdapter, DeepResearchResult, HttpDeepResearchAdapter};
pub use news::{HttpNewsSearchAdapter, NewsSearchAdapter};
