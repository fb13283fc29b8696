use std::sync::Arc;

use {
    chrono::{DateTime, Utc},
    tokio::sync::Mutex,
    tracing::{debug, info, warn},
    waterline_common::{InboundMessage, time::truncate_millis},
};

#[cfg(feature = "metrics")]
use waterline_metrics::{counter, gauge, watermark as wm_metrics};

use crate::{Result, kv::KvStore, record::WatermarkRecord};

/// Key of the persisted watermark record.
pub const WATERMARK_KEY: &str = "last_agent_timestamp";

/// Per-group watermarks over a [`KvStore`].
///
/// Every mutation is a read-merge-write of the whole record, run through
/// [`KvStore::update`] so it is atomic against other processes sharing the
/// database. The write gate additionally queues writers within this process
/// rather than having them contend on the database lock. Reads take no lock.
pub struct WatermarkStore {
    kv: Arc<dyn KvStore>,
    write_gate: Mutex<()>,
}

impl WatermarkStore {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self {
            kv,
            write_gate: Mutex::new(()),
        }
    }

    /// Load the record, or `None` when nothing has ever been stored.
    pub async fn load_existing(&self) -> Result<Option<WatermarkRecord>> {
        self.kv
            .get(WATERMARK_KEY)
            .await?
            .map(|raw| decode(&raw))
            .transpose()
    }

    /// Load the record, treating an absent key as empty.
    pub async fn load(&self) -> Result<WatermarkRecord> {
        Ok(self.load_existing().await?.unwrap_or_default())
    }

    /// The stored watermark, or `None` if the group has never been seen.
    pub async fn get_watermark(&self, group: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self.load().await?.get(group))
    }

    /// Messages strictly newer than the group's watermark, in input order.
    /// All messages are new when the group has no watermark.
    ///
    /// Compared at millisecond precision, the resolution watermarks are
    /// stored at, so a delivered message never reads as new again.
    pub async fn filter_new(
        &self,
        group: &str,
        messages: &[InboundMessage],
    ) -> Result<Vec<InboundMessage>> {
        let watermark = self.get_watermark(group).await?;
        let fresh: Vec<InboundMessage> = messages
            .iter()
            .filter(|m| watermark.is_none_or(|w| truncate_millis(m.timestamp) > w))
            .cloned()
            .collect();
        debug!(
            group,
            total = messages.len(),
            new = fresh.len(),
            "filtered messages against watermark"
        );
        Ok(fresh)
    }

    /// Set the group's watermark to `ts` if it is newer than the current one.
    /// Returns whether anything changed.
    pub async fn advance_watermark(&self, group: &str, ts: DateTime<Utc>) -> Result<bool> {
        let _guard = self.write_gate.lock().await;

        let mut tracked = None;
        self.kv
            .update(
                WATERMARK_KEY,
                Box::new(|raw| {
                    let mut record = raw.as_deref().map(decode).transpose()?.unwrap_or_default();
                    if !record.advance(group, ts) {
                        return Ok(None);
                    }
                    tracked = Some(record.len());
                    Ok(Some(record.to_json()?))
                }),
            )
            .await?;

        let Some(groups) = tracked else {
            debug!(group, %ts, "watermark not advanced (not newer)");
            return Ok(false);
        };
        debug!(group, %ts, groups, "watermark advanced");
        #[cfg(feature = "metrics")]
        {
            counter!(wm_metrics::ADVANCES_TOTAL).increment(1);
            gauge!(wm_metrics::GROUPS).set(groups as f64);
        }
        Ok(true)
    }

    /// Force every known group's watermark to `now`, discarding any pending
    /// replay. Creates no groups. Returns the updated group ids; an absent or
    /// empty record is left untouched.
    pub async fn advance_all(&self, now: DateTime<Utc>) -> Result<Vec<String>> {
        let _guard = self.write_gate.lock().await;

        let mut groups = Vec::new();
        self.kv
            .update(
                WATERMARK_KEY,
                Box::new(|raw| {
                    let Some(raw) = raw else {
                        return Ok(None);
                    };
                    let mut record = decode(&raw)?;
                    if record.is_empty() {
                        return Ok(None);
                    }
                    groups = record.advance_all(now);
                    Ok(Some(record.to_json()?))
                }),
            )
            .await?;

        if !groups.is_empty() {
            info!(count = groups.len(), %now, "force-advanced all watermarks");
            #[cfg(feature = "metrics")]
            counter!(wm_metrics::FLUSHED_GROUPS_TOTAL).increment(groups.len() as u64);
        }
        Ok(groups)
    }
}

fn decode(raw: &str) -> Result<WatermarkRecord> {
    WatermarkRecord::parse(raw).inspect_err(|e| {
        warn!(key = WATERMARK_KEY, error = %e, "watermark record is corrupt");
        #[cfg(feature = "metrics")]
        counter!(wm_metrics::CORRUPT_READS_TOTAL).increment(1);
    })
}
