//! Key/value persistence used by the watermark store.

use async_trait::async_trait;

use crate::Result;

/// Read-modify-write step for [`KvStore::update`]. Receives the current value
/// and returns the value to store, or `None` to leave the key untouched.
pub type UpdateFn<'a> = Box<dyn FnOnce(Option<String>) -> Result<Option<String>> + Send + 'a>;

/// Minimal key/value store: read by key, write by key.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Atomically read, transform and write one key. No other writer, in this
    /// process or another, may interleave between the read and the write.
    ///
    /// An error from `f` aborts the update without writing.
    async fn update(&self, key: &str, f: UpdateFn<'_>) -> Result<()>;
}
