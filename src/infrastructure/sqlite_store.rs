use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};

use crate::application::{AppError, AppResult, KeyValueStore};

pub struct SqliteKeyValueStore {
    pool: SqlitePool,
}

impl SqliteKeyValueStore {
    /// db_url examples
    /// - "sqlite:./contact_state.db?mode=rwc"
    /// - "sqlite::memory:"
    pub async fn new(db_url: &str) -> AppResult<Self> {
        // every connection to :memory: gets its own database
        let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL,
              updated_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get_item(&self, key: &str) -> AppResult<Option<String>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv WHERE key = ? LIMIT 1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(row.map(|r| r.0))
    }

    async fn set_item(&self, key: &str, value: &str) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv(key, value, updated_at) VALUES(?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value=excluded.value, updated_at=excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now_epoch_seconds())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM kv WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }
}

fn now_epoch_seconds() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
