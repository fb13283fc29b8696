//! SQLite-backed key/value store using sqlx.

use {
    async_trait::async_trait,
    sqlx::{SqlitePool, sqlite::SqlitePoolOptions},
};

use crate::{
    Result,
    kv::{KvStore, UpdateFn},
};

/// `router_state` table persistence.
pub struct SqliteKvStore {
    pool: SqlitePool,
}

impl SqliteKvStore {
    /// Create a new store with its own connection pool and run migrations.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;

        crate::run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a store using an existing pool (migrations must already be run).
    ///
    /// Call [`crate::run_migrations`] before using this constructor.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const SELECT_VALUE: &str = "SELECT value FROM router_state WHERE key = ?";
const UPSERT_VALUE: &str = "INSERT INTO router_state (key, value) VALUES (?, ?)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value";
const LOCK_FOR_WRITE: &str = "UPDATE router_state SET value = value WHERE key = ?";

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(SELECT_VALUE)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT_VALUE)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The first statement of the transaction is a (no-op) write, so SQLite
    /// takes the write lock before the read, as `BEGIN IMMEDIATE` would.
    /// Other connections and processes wait for the busy timeout instead of
    /// interleaving. Dropping the transaction on error or cancellation rolls
    /// it back.
    async fn update(&self, key: &str, f: UpdateFn<'_>) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(LOCK_FOR_WRITE)
            .bind(key)
            .execute(&mut *tx)
            .await?;

        let current = sqlx::query_scalar::<_, String>(SELECT_VALUE)
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;
        if let Some(next) = f(current)? {
            sqlx::query(UPSERT_VALUE)
                .bind(key)
                .bind(next)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteKvStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::run_migrations(&pool).await.unwrap();
        SqliteKvStore::with_pool(pool)
    }

    #[tokio::test]
    async fn test_get_missing() {
        let store = test_store().await;
        assert!(store.get("last_agent_timestamp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_and_overwrite() {
        let store = test_store().await;
        store.set("k", "v1").await.unwrap();
        store.set("k", "v2").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let store = test_store().await;
        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        assert_eq!(store.get("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("b").await.unwrap().as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_update_reads_and_writes() {
        let store = test_store().await;
        store
            .update("k", Box::new(|current| {
                assert!(current.is_none());
                Ok(Some("1".to_string()))
            }))
            .await
            .unwrap();
        store
            .update("k", Box::new(|current| Ok(current.map(|v| format!("{v}2")))))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("12"));
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_and_releases_lock() {
        let store = test_store().await;
        store.set("k", "before").await.unwrap();

        let err = store
            .update("k", Box::new(|_| Err(crate::Error::corrupt_state("k", "bad"))))
            .await
            .unwrap_err();
        assert!(err.is_corrupt_state());

        // Single-connection pool: a leaked transaction would fail this write.
        store.set("k", "after").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("after"));
    }

    #[tokio::test]
    async fn test_file_database_persists_across_pools() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}?mode=rwc", dir.path().join("messages.db").display());

        let store = SqliteKvStore::new(&url).await.unwrap();
        store.set("k", "persisted").await.unwrap();
        store.close().await;

        let reopened = SqliteKvStore::new(&url).await.unwrap();
        assert_eq!(
            reopened.get("k").await.unwrap().as_deref(),
            Some("persisted")
        );
    }
}
