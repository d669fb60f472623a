//! PostgreSQL site directory backend

use async_trait::async_trait;
use sqlx::PgPool;

use sitegate_shared::{Site, SiteLookupError};

use super::SiteBackend;

/// Site lookups against the `sites` table.
#[derive(Clone)]
pub struct PgSiteBackend {
    pool: PgPool,
}

impl PgSiteBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl SiteBackend for PgSiteBackend {
    async fn find_by_domain(&self, host: &str) -> Result<Option<Site>, SiteLookupError> {
        let site: Option<Site> = sqlx::query_as(
            r#"
            SELECT id, domains, root_path, main_domain, redirect_to_main_domain
            FROM sites
            WHERE $1 = ANY(domains)
            "#,
        )
        .bind(host)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(host = %host, error = %e, "site lookup failed");
            SiteLookupError::Database(e.to_string())
        })?;

        Ok(site)
    }

    async fn healthy(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
