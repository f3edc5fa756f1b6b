use crate::error::{PersistError, Result};
use chrono::{DateTime, Utc};
use nf_world::hub::Hub;
use nf_world::payload::{ArticleStatus, NarrativePayload};
use nf_world::records::{CompanyRecord, RecentArticleSummary, ScrapeHistory};
use serde_json::Value;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

/// Postgres persistence for articles, country hubs, companies, and scrape
/// history.
#[derive(Clone)]
pub struct PersistenceStore {
    pool: PgPool,
}

fn status_str(status: ArticleStatus) -> &'static str {
    match status {
        ArticleStatus::Draft => "draft",
        ArticleStatus::Published => "published",
        ArticleStatus::Archived => "archived",
    }
}

impl PersistenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| PersistError::Other(e.into()))?;
        Ok(())
    }

    /// Upserts on `(app, slug)` and replaces the `article_companies` join
    /// rows inside the same transaction.
    pub async fn upsert_article(&self, article: &NarrativePayload) -> Result<Uuid> {
        let payload = serde_json::to_value(article).map_err(|e| PersistError::Other(e.into()))?;
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO articles (app, slug, title, status, cluster_id, parent_id, payload, published_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (app, slug) DO UPDATE SET
                title = EXCLUDED.title,
                status = EXCLUDED.status,
                cluster_id = EXCLUDED.cluster_id,
                parent_id = EXCLUDED.parent_id,
                payload = EXCLUDED.payload,
                published_at = EXCLUDED.published_at,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(&article.app)
        .bind(&article.slug)
        .bind(&article.title)
        .bind(status_str(article.status))
        .bind(article.cluster_id)
        .bind(article.parent_id)
        .bind(&payload)
        .bind(article.published_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM article_companies WHERE article_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for mention in &article.mentioned_companies {
            sqlx::query(
                r#"
                INSERT INTO article_companies (article_id, company_slug, relevance_score, mention_count, is_primary)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(&mention.company_name)
            .bind(mention.relevance_score)
            .bind(mention.mention_count as i32)
            .bind(mention.is_primary)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    pub async fn upsert_hub(&self, hub: &Hub) -> Result<Uuid> {
        let payload = serde_json::to_value(&hub.payload).map_err(|e| PersistError::Other(e.into()))?;
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO country_hubs (country_code, slug, title, status, payload)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (country_code, slug) DO UPDATE SET
                title = EXCLUDED.title,
                status = EXCLUDED.status,
                payload = EXCLUDED.payload,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(&hub.country_code)
        .bind(&hub.slug)
        .bind(&hub.title)
        .bind(match hub.status {
            nf_world::hub::HubStatus::Draft => "draft",
            nf_world::hub::HubStatus::Published => "published",
        })
        .bind(&payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn upsert_company(&self, company: &CompanyRecord) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO companies (app, slug, name, featured_image_url, meta_description, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (app, slug) DO UPDATE SET
                name = EXCLUDED.name,
                featured_image_url = EXCLUDED.featured_image_url,
                meta_description = EXCLUDED.meta_description,
                payload = EXCLUDED.payload,
                updated_at = now()
            RETURNING id
            "#,
        )
        .bind(&company.app)
        .bind(&company.slug)
        .bind(&company.name)
        .bind(&company.featured_image_url)
        .bind(&company.meta_description)
        .bind(&company.payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_article_by_slug(&self, app: &str, slug: &str) -> Result<Option<NarrativePayload>> {
        let row: Option<Value> = sqlx::query_scalar(
            "SELECT payload FROM articles WHERE app = $1 AND slug = $2",
        )
        .bind(app)
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(v) => Ok(Some(serde_json::from_value(v).map_err(|e| PersistError::Other(e.into()))?)),
            None => Ok(None),
        }
    }

    pub async fn get_recent_articles(&self, app: &str, limit: i64) -> Result<Vec<RecentArticleSummary>> {
        let rows = sqlx::query_as::<_, RecentArticleRow>(
            r#"
            SELECT id, title, payload->>'content' IS NOT NULL AS has_content,
                   payload->>'origin_url' AS origin_url, published_at
            FROM articles
            WHERE app = $1
            ORDER BY COALESCE(published_at, created_at) DESC
            LIMIT $2
            "#,
        )
        .bind(app)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| RecentArticleSummary {
                id: r.id,
                title: r.title,
                url: r.origin_url.clone(),
                normalized_url: r.origin_url.as_deref().map(nf_common::normalize_url),
                published_at: r.published_at,
            })
            .collect())
    }

    /// Records that an article pertains to `country_code` in the given
    /// `role` (e.g. `"primary"`, `"mentioned"`). Distinct from the
    /// country-hub mechanism: a country guide's own hub row isn't an
    /// article, so this is how regular articles carry country relevance.
    pub async fn link_article_to_country(&self, article_id: Uuid, country_code: &str, role: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO article_countries (article_id, country_code, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (article_id, country_code, role) DO NOTHING
            "#,
        )
        .bind(article_id)
        .bind(country_code)
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn append_scrape_history(&self, entry: &ScrapeHistory) -> Result<Uuid> {
        let result = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO scrape_history (board_id, status, jobs_found, execution_time_ms, started_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(entry.board_id)
        .bind(&entry.status)
        .bind(entry.jobs_found as i32)
        .bind(entry.execution_time_ms as i64)
        .bind(entry.started_at)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!(error = %e, "failed to append scrape history");
                Err(e.into())
            }
        }
    }

    pub async fn company_slugs_for_article(&self, article_id: Uuid) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT company_slug FROM article_companies WHERE article_id = $1",
        )
        .bind(article_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(s,)| s).collect())
    }
}

#[derive(sqlx::FromRow)]
struct RecentArticleRow {
    id: Uuid,
    title: String,
    #[allow(dead_code)]
    has_content: bool,
    origin_url: Option<String>,
    published_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_str_matches_column_values() {
        assert_eq!(status_str(ArticleStatus::Draft), "draft");
        assert_eq!(status_str(ArticleStatus::Published), "published");
        assert_eq!(status_str(ArticleStatus::Archived), "archived");
    }
}
