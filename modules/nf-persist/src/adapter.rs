use crate::error::Result;
use crate::store::PersistenceStore;
use nf_world::hub::Hub;
use nf_world::payload::NarrativePayload;
use nf_world::records::{CompanyRecord, RecentArticleSummary, ScrapeHistory};
use uuid::Uuid;

/// Storage contract the pipeline depends on, independent of the backing
/// database engine.
#[async_trait::async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn upsert_article(&self, article: &NarrativePayload) -> Result<Uuid>;
    async fn upsert_hub(&self, hub: &Hub) -> Result<Uuid>;
    async fn upsert_company(&self, company: &CompanyRecord) -> Result<Uuid>;
    async fn get_article_by_slug(&self, app: &str, slug: &str) -> Result<Option<NarrativePayload>>;
    async fn get_recent_articles(&self, app: &str, limit: i64) -> Result<Vec<RecentArticleSummary>>;
    async fn append_scrape_history(&self, entry: &ScrapeHistory) -> Result<Uuid>;
    async fn link_article_to_country(&self, article_id: Uuid, country_code: &str, role: &str) -> Result<()>;
}

#[async_trait::async_trait]
impl PersistenceAdapter for PersistenceStore {
    async fn upsert_article(&self, article: &NarrativePayload) -> Result<Uuid> {
        self.upsert_article(article).await
    }

    async fn upsert_hub(&self, hub: &Hub) -> Result<Uuid> {
        self.upsert_hub(hub).await
    }

    async fn upsert_company(&self, company: &CompanyRecord) -> Result<Uuid> {
        self.upsert_company(company).await
    }

    async fn get_article_by_slug(&self, app: &str, slug: &str) -> Result<Option<NarrativePayload>> {
        self.get_article_by_slug(app, slug).await
    }

    async fn get_recent_articles(&self, app: &str, limit: i64) -> Result<Vec<RecentArticleSummary>> {
        self.get_recent_articles(app, limit).await
    }

    async fn append_scrape_history(&self, entry: &ScrapeHistory) -> Result<Uuid> {
        self.append_scrape_history(entry).await
    }

    async fn link_article_to_country(&self, article_id: Uuid, country_code: &str, role: &str) -> Result<()> {
        self.link_article_to_country(article_id, country_code, role).await
    }
}
