//! SQLite-backed audit store.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::audit::record::{AuditRecord, NewAuditRecord, RecordId};
use crate::audit::store::{AuditStore, StoreError};

// AUTOINCREMENT keeps ids from being reused after deletes.
const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS requests (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    country TEXT NOT NULL,
    region TEXT NOT NULL,
    city TEXT NOT NULL,
    method TEXT NOT NULL,
    client_ip TEXT NOT NULL,
    url TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    source TEXT NOT NULL
)";

#[derive(Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Open (creating if needed) the database and ensure the `requests` table exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

        // Each connection to an in-memory database is a separate database.
        let in_memory = database_url.contains(":memory:");
        let mut pool_options = SqlitePoolOptions::new();
        pool_options = if in_memory {
            pool_options
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            pool_options.max_connections(max_connections)
        };

        let pool = pool_options.connect_with(options).await?;
        sqlx::query(CREATE_TABLE).execute(&pool).await?;

        tracing::info!(database_url = %database_url, "Audit store ready");
        Ok(Self { pool })
    }
}

#[async_trait]
impl AuditStore for SqliteAuditStore {
    async fn insert(&self, record: &NewAuditRecord) -> Result<RecordId, StoreError> {
        let result = sqlx::query(
            "INSERT INTO requests (country, region, city, method, client_ip, url, timestamp, source)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.country)
        .bind(&record.region)
        .bind(&record.city)
        .bind(&record.method)
        .bind(&record.client_ip)
        .bind(&record.url)
        .bind(&record.timestamp)
        .bind(&record.source)
        .execute(&self.pool)
        .await?;

        Ok(RecordId(result.last_insert_rowid()))
    }

    async fn list(&self) -> Result<Vec<AuditRecord>, StoreError> {
        let records = sqlx::query_as::<_, AuditRecord>(
            "SELECT id, country, region, city, method, client_ip, url, timestamp, source
             FROM requests ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn delete(&self, id: RecordId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}
