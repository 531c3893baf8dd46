//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Acquire, Row};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::domain::entities::{
    BatchItem, BatchResult, Owner, SavedLink, ShortCode, StoreStats,
};
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;
use crate::utils::code_generator::{MAX_CODE_ATTEMPTS, generate_code};
use crate::utils::db_error::{OWNER_ORIGIN_KEY, SHORT_CODE_KEY, is_unique_violation_on};

/// PostgreSQL repository for link storage and retrieval.
///
/// Duplicate detection relies on the `(owner, origin)` and `short_code`
/// unique constraints created by the migrations in `migrations/`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Opens a pool using the pool settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be reached
    /// and [`StoreError::Internal`] if no DSN is configured.
    pub async fn connect(config: &Config) -> Result<Self, StoreError> {
        let dsn = config
            .database_dsn
            .as_deref()
            .ok_or_else(|| StoreError::internal("no database DSN configured"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
            .idle_timeout(Duration::from_secs(config.db_idle_timeout))
            .max_lifetime(Duration::from_secs(config.db_max_lifetime))
            .connect(dsn)
            .await
            .map_err(|e| StoreError::unavailable(format!("database connect failed: {e}")))?;

        Ok(Self::new(Arc::new(pool)))
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await?;
        Ok(())
    }

    /// Verifies that a connection can be acquired and used.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }

    /// Closes the pool, waiting for checked-out connections to return.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn existing_code(&self, owner: &Owner, origin: &str) -> Result<ShortCode, StoreError> {
        let code: String = sqlx::query_scalar(
            "SELECT short_code FROM short_links WHERE owner = $1 AND origin = $2",
        )
        .bind(owner.as_str())
        .bind(origin)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ShortCode::new_unchecked(code))
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn get(&self, code: &ShortCode) -> Result<String, StoreError> {
        let row = sqlx::query("SELECT origin, is_deleted FROM short_links WHERE short_code = $1")
            .bind(code.as_str())
            .fetch_optional(self.pool.as_ref())
            .await?;

        let Some(row) = row else {
            return Err(StoreError::NotFound(code.to_string()));
        };

        if row.try_get::<bool, _>("is_deleted")? {
            return Err(StoreError::Gone(code.to_string()));
        }

        Ok(row.try_get("origin")?)
    }

    async fn save(&self, owner: &Owner, origin: &str) -> Result<SavedLink, StoreError> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code()?;

            let result = sqlx::query(
                "INSERT INTO short_links (owner, origin, short_code) VALUES ($1, $2, $3)",
            )
            .bind(owner.as_str())
            .bind(origin)
            .bind(code.as_str())
            .execute(self.pool.as_ref())
            .await;

            match result {
                Ok(_) => return Ok(SavedLink::created(code)),
                Err(e) if is_unique_violation_on(&e, OWNER_ORIGIN_KEY) => {
                    debug!(owner = %owner, "Origin already shortened");
                    return Ok(SavedLink::existing(self.existing_code(owner, origin).await?));
                }
                Err(e) if is_unique_violation_on(&e, SHORT_CODE_KEY) => {
                    debug!(code = %code, "Short code collision, regenerating");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(StoreError::internal("failed to mint a unique short code"))
    }

    async fn save_batch(
        &self,
        owner: &Owner,
        items: Vec<BatchItem>,
    ) -> Result<Vec<BatchResult>, StoreError> {
        let mut planned = Vec::with_capacity(items.len());
        for item in items {
            let code = generate_code()?;
            planned.push((item, code));
        }

        let mut tx = self.pool.begin().await?;
        let mut results = Vec::with_capacity(planned.len());

        'items: for (item, first_code) in planned {
            let mut code = first_code;

            for attempt in 1..=MAX_CODE_ATTEMPTS {
                // A failed statement aborts the transaction unless it runs
                // inside its own savepoint.
                let mut savepoint = tx.begin().await?;

                let inserted: Result<Option<String>, sqlx::Error> = sqlx::query_scalar(
                    "INSERT INTO short_links (owner, origin, short_code, correlation_id) \
                     VALUES ($1, $2, $3, $4) \
                     ON CONFLICT (owner, origin) DO NOTHING \
                     RETURNING short_code",
                )
                .bind(owner.as_str())
                .bind(&item.origin)
                .bind(code.as_str())
                .bind(&item.correlation_id)
                .fetch_optional(&mut *savepoint)
                .await;

                match inserted {
                    Ok(Some(stored)) => {
                        savepoint.commit().await?;
                        results.push(BatchResult {
                            correlation_id: item.correlation_id,
                            code: ShortCode::new_unchecked(stored),
                        });
                        continue 'items;
                    }
                    Ok(None) => {
                        savepoint.commit().await?;
                        debug!(
                            owner = %owner,
                            correlation_id = %item.correlation_id,
                            "Batch item skipped: origin already shortened"
                        );
                        continue 'items;
                    }
                    Err(e) if is_unique_violation_on(&e, SHORT_CODE_KEY) => {
                        savepoint.rollback().await?;
                        debug!(code = %code, attempt, "Short code collision, regenerating");
                        code = generate_code()?;
                    }
                    Err(e) => {
                        savepoint.rollback().await?;
                        warn!(
                            correlation_id = %item.correlation_id,
                            error = %e,
                            "Batch item skipped"
                        );
                        continue 'items;
                    }
                }
            }

            warn!(correlation_id = %item.correlation_id, "Batch item skipped: no free short code");
        }

        tx.commit().await?;

        Ok(results)
    }

    async fn links_by_owner(
        &self,
        owner: &Owner,
    ) -> Result<BTreeMap<ShortCode, String>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT short_code, origin FROM short_links WHERE owner = $1 AND NOT is_deleted",
        )
        .bind(owner.as_str())
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, origin)| (ShortCode::new_unchecked(code), origin))
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let (owners, links): (i64, i64) =
            sqlx::query_as("SELECT COUNT(DISTINCT owner), COUNT(origin) FROM short_links")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(StoreStats {
            owners: owners.max(0) as u64,
            links: links.max(0) as u64,
        })
    }

    async fn soft_delete(&self, owner: &Owner, codes: &[ShortCode]) -> Result<u64, StoreError> {
        if codes.is_empty() {
            return Ok(0);
        }

        let codes: Vec<String> = codes.iter().map(|c| c.as_str().to_string()).collect();

        let result = sqlx::query(
            "UPDATE short_links SET is_deleted = TRUE \
             WHERE owner = $1 AND short_code = ANY($2) AND NOT is_deleted",
        )
        .bind(owner.as_str())
        .bind(&codes)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }
}
