//! Postgres-backed item repository.
//!
//! Stores one row per item in `pantry_items`, scoped by a collection name so
//! several inventories can share a database.
//!
//! ## Error Mapping
//!
//! | SQLx Error | RepositoryError |
//! |------------|-----------------|
//! | `PoolClosed`, `PoolTimedOut`, `Io`, `Tls` | `Unavailable` |
//! | `Database` and everything else | `Storage` |

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use pantry_core::ItemName;
use pantry_inventory::{AddMethod, ImageRef, ItemRecord, RecordPatch};

use super::r#trait::{ItemRepository, RepositoryError};

/// Postgres-backed item collection.
///
/// `PgPool` is `Send + Sync`; the repository can be shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PostgresItemRepository {
    pool: Arc<PgPool>,
    collection: String,
}

impl PostgresItemRepository {
    pub fn new(pool: PgPool, collection: impl Into<String>) -> Self {
        Self {
            pool: Arc::new(pool),
            collection: collection.into(),
        }
    }

    /// Connect to `database_url` and make sure the table exists.
    pub async fn connect(database_url: &str, collection: impl Into<String>) -> Result<Self, RepositoryError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let repo = Self::new(pool, collection);
        repo.ensure_schema().await?;
        Ok(repo)
    }

    /// Create the backing table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS pantry_items (
                collection  TEXT        NOT NULL,
                name        TEXT        NOT NULL,
                count       BIGINT      NOT NULL CHECK (count >= 0),
                image       TEXT        NULL,
                add_method  TEXT        NOT NULL DEFAULT 'Manual',
                updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                PRIMARY KEY (collection, name)
            )
            "#,
        )
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl ItemRepository for PostgresItemRepository {
    #[instrument(skip(self, key), fields(collection = %self.collection, key = %key), err)]
    async fn get(&self, key: &ItemName) -> Result<Option<ItemRecord>, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT count, image, add_method
            FROM pantry_items
            WHERE collection = $1 AND name = $2
            "#,
        )
        .bind(&self.collection)
        .bind(key.as_str())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(|row| record_from_row(&row)).transpose()
    }

    #[instrument(skip(self, key, record), fields(collection = %self.collection, key = %key, count = record.count), err)]
    async fn put(&self, key: &ItemName, record: ItemRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO pantry_items (collection, name, count, image, add_method)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (collection, name)
            DO UPDATE SET
                count = EXCLUDED.count,
                image = EXCLUDED.image,
                add_method = EXCLUDED.add_method,
                updated_at = NOW()
            "#,
        )
        .bind(&self.collection)
        .bind(key.as_str())
        .bind(record.count)
        .bind(record.image.as_ref().map(ImageRef::as_str))
        .bind(record.add_method.as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("put", e))?;
        Ok(())
    }

    #[instrument(skip(self, key, patch), fields(collection = %self.collection, key = %key, count = patch.count), err)]
    async fn merge(&self, key: &ItemName, patch: RecordPatch) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE pantry_items
            SET count = $3,
                add_method = $4,
                image = COALESCE($5, image),
                updated_at = NOW()
            WHERE collection = $1 AND name = $2
            "#,
        )
        .bind(&self.collection)
        .bind(key.as_str())
        .bind(patch.count)
        .bind(patch.add_method.as_str())
        .bind(patch.image.as_ref().map(ImageRef::as_str))
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("merge", e))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(key.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self, key), fields(collection = %self.collection, key = %key), err)]
    async fn delete(&self, key: &ItemName) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM pantry_items WHERE collection = $1 AND name = $2")
            .bind(&self.collection)
            .bind(key.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection), err)]
    async fn list(&self) -> Result<Vec<(ItemName, ItemRecord)>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT name, count, image, add_method
            FROM pantry_items
            WHERE collection = $1
            ORDER BY name ASC
            "#,
        )
        .bind(&self.collection)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let raw: String = row
                .try_get("name")
                .map_err(|e| map_sqlx_error("list", e))?;
            let name = ItemName::parse(&raw)
                .map_err(|e| RepositoryError::Storage(format!("stored key '{raw}' is invalid: {e}")))?;
            items.push((name, record_from_row(&row)?));
        }
        Ok(items)
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<ItemRecord, RepositoryError> {
    let count: i64 = row.try_get("count").map_err(|e| map_sqlx_error("decode", e))?;
    let image: Option<String> = row.try_get("image").map_err(|e| map_sqlx_error("decode", e))?;
    let add_method: String = row
        .try_get("add_method")
        .map_err(|e| map_sqlx_error("decode", e))?;

    Ok(ItemRecord {
        count,
        image: image.map(ImageRef::new),
        // Rows written by older clients may carry unknown tags.
        add_method: add_method.parse().unwrap_or(AddMethod::Manual),
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            RepositoryError::Unavailable(format!("connection pool unavailable in {operation}"))
        }
        sqlx::Error::Io(e) => RepositoryError::Unavailable(format!("io error in {operation}: {e}")),
        sqlx::Error::Tls(e) => RepositoryError::Unavailable(format!("tls error in {operation}: {e}")),
        sqlx::Error::Database(db_err) => {
            RepositoryError::Storage(format!("database error in {operation}: {}", db_err.message()))
        }
        other => RepositoryError::Storage(format!("sqlx error in {operation}: {other}")),
    }
}
