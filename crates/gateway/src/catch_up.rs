//! Operator catch-up: skip everything queued so far.

use {
    chrono::{DateTime, Utc},
    tracing::info,
    waterline_watermark::WatermarkStore,
};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// No watermark record has ever been written.
    NoState,
    /// A record exists but tracks no groups.
    NoGroups,
    Flushed {
        at: DateTime<Utc>,
        groups: Vec<String>,
    },
}

/// Move every tracked group's watermark to `now` so queued messages are never
/// replayed. Idempotent. Groups that are not already tracked are not added.
///
/// A corrupt record is returned as an error and left as is.
pub async fn flush_queue(store: &WatermarkStore, now: DateTime<Utc>) -> Result<FlushOutcome> {
    let Some(record) = store.load_existing().await? else {
        return Ok(FlushOutcome::NoState);
    };
    if record.is_empty() {
        return Ok(FlushOutcome::NoGroups);
    }

    let groups = store.advance_all(now).await?;
    if groups.is_empty() {
        return Ok(FlushOutcome::NoGroups);
    }
    info!(count = groups.len(), %now, "message queue flushed");
    Ok(FlushOutcome::Flushed { at: now, groups })
}
