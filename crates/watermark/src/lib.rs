//! Per-group "last processed" watermarks.
//!
//! The whole record is one JSON object stored under [`WATERMARK_KEY`] in a
//! key/value table, mapping group id to an ISO-8601 UTC timestamp. A message
//! is new for a group when its timestamp is strictly greater than the
//! group's watermark.

pub mod error;
pub mod kv;
pub mod kv_memory;
pub mod kv_sqlite;
pub mod record;
pub mod store;

pub use {
    error::{Error, Result},
    kv::{KvStore, UpdateFn},
    kv_memory::InMemoryKvStore,
    kv_sqlite::SqliteKvStore,
    record::WatermarkRecord,
    store::{WATERMARK_KEY, WatermarkStore},
};

/// Run database migrations for the watermark crate.
///
/// This creates the `router_state` table. Should be called at startup when
/// using [`SqliteKvStore::with_pool`].
pub async fn run_migrations(pool: &sqlx::SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .set_ignore_missing(true)
        .run(pool)
        .await?;
    Ok(())
}
