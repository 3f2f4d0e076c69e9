//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataError, MetadataResult};
use crate::repos::ImageRepo;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default wait for a locked database before a query fails.
const DEFAULT_BUSY_TIMEOUT_SECS: u64 = 5;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: ImageRepo + Send + Sync {
    /// Create the schema if it does not exist.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `path` and run migrations.
    ///
    /// `query_timeout_secs` bounds how long a query waits on a locked
    /// database.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> MetadataResult<Self> {
        let path = path.as_ref();
        let busy_timeout = query_timeout_secs.unwrap_or(DEFAULT_BUSY_TIMEOUT_SECS);

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(busy_timeout));

        Self::connect(opts).await
    }

    /// Open a private in-memory database. Used by tests.
    pub async fn in_memory() -> MetadataResult<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        Self::connect(opts).await
    }

    async fn connect(opts: SqliteConnectOptions) -> MetadataResult<Self> {
        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers and keeps an in-memory
            // database alive for the pool's lifetime.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::ImageRow;

    #[async_trait]
    impl ImageRepo for SqliteStore {
        async fn create_image(
            &self,
            filename: &str,
            filepath: Option<&str>,
        ) -> MetadataResult<ImageRow> {
            if self.get_image_by_filename(filename).await?.is_some() {
                return Err(MetadataError::AlreadyExists(format!(
                    "filename '{filename}' already exists"
                )));
            }

            // The unique index settles races the pre-check cannot see.
            sqlx::query_as::<_, ImageRow>(
                "INSERT INTO images (filename, filepath) VALUES (?, ?) RETURNING id, filename, filepath",
            )
            .bind(filename)
            .bind(filepath)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MetadataError::from_insert(e, filename))
        }

        async fn insert_image_if_absent(
            &self,
            filename: &str,
            filepath: Option<&str>,
        ) -> MetadataResult<Option<ImageRow>> {
            let row = sqlx::query_as::<_, ImageRow>(
                "INSERT INTO images (filename, filepath) VALUES (?, ?) \
                 ON CONFLICT(filename) DO NOTHING \
                 RETURNING id, filename, filepath",
            )
            .bind(filename)
            .bind(filepath)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn list_images(&self) -> MetadataResult<Vec<ImageRow>> {
            let rows = sqlx::query_as::<_, ImageRow>(
                "SELECT id, filename, filepath FROM images ORDER BY id",
            )
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn get_image(&self, id: i64) -> MetadataResult<Option<ImageRow>> {
            let row = sqlx::query_as::<_, ImageRow>(
                "SELECT id, filename, filepath FROM images WHERE id = ?",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn get_image_by_filename(&self, filename: &str) -> MetadataResult<Option<ImageRow>> {
            let row = sqlx::query_as::<_, ImageRow>(
                "SELECT id, filename, filepath FROM images WHERE filename = ?",
            )
            .bind(filename)
            .fetch_optional(&self.pool)
            .await?;
            Ok(row)
        }

        async fn update_image_filename(&self, id: i64, filename: &str) -> MetadataResult<ImageRow> {
            let row = sqlx::query_as::<_, ImageRow>(
                "UPDATE images SET filename = ? WHERE id = ? RETURNING id, filename, filepath",
            )
            .bind(filename)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| MetadataError::from_insert(e, filename))?;

            row.ok_or_else(|| MetadataError::NotFound(format!("image id {id} not found")))
        }

        async fn delete_image(&self, id: i64) -> MetadataResult<ImageRow> {
            let row = sqlx::query_as::<_, ImageRow>(
                "DELETE FROM images WHERE id = ? RETURNING id, filename, filepath",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.ok_or_else(|| MetadataError::NotFound(format!("image id {id} not found")))
        }
    }
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS images (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    filepath TEXT
);
"#;
