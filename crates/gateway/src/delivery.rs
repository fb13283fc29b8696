use std::sync::Arc;

use {
    chrono::{DateTime, Utc},
    tracing::{debug, info},
    waterline_channels::{ChannelRegistry, format_messages, format_outbound},
    waterline_common::{AgentInput, InboundMessage},
    waterline_watermark::WatermarkStore,
};

use crate::Result;

/// New messages for one group, rendered for the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingBatch {
    pub group: String,
    pub input: AgentInput,
    /// Latest timestamp in the batch; the watermark moves here on success.
    pub newest: DateTime<Utc>,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// The reply was empty after cleanup; nothing was sent.
    Suppressed,
}

pub struct DeliveryPipeline {
    store: Arc<WatermarkStore>,
    registry: Arc<ChannelRegistry>,
}

impl DeliveryPipeline {
    pub fn new(store: Arc<WatermarkStore>, registry: Arc<ChannelRegistry>) -> Self {
        Self { store, registry }
    }

    pub fn store(&self) -> &Arc<WatermarkStore> {
        &self.store
    }

    /// Messages in `messages` the group has not processed yet, formatted as
    /// one agent input. `None` when there is nothing new.
    pub async fn pending(
        &self,
        group: &str,
        messages: &[InboundMessage],
    ) -> Result<Option<PendingBatch>> {
        let fresh = self.store.filter_new(group, messages).await?;
        let Some(newest) = fresh.iter().map(|m| m.timestamp).max() else {
            return Ok(None);
        };
        debug!(group, count = fresh.len(), %newest, "pending batch");
        Ok(Some(PendingBatch {
            group: group.to_string(),
            input: format_messages(&fresh),
            newest,
            count: fresh.len(),
        }))
    }

    /// Send the agent's reply for `batch` to `jid` and mark the batch
    /// processed.
    ///
    /// The watermark is advanced only once the channel accepts the reply. A
    /// reply that is empty after stripping internal spans is not sent, but
    /// still marks the batch processed.
    pub async fn deliver_reply(
        &self,
        batch: &PendingBatch,
        jid: &str,
        raw_reply: &str,
    ) -> Result<DeliveryOutcome> {
        let text = format_outbound(raw_reply);
        if text.is_empty() {
            debug!(group = %batch.group, jid, "reply empty after cleanup, not sending");
            self.acknowledge(batch).await?;
            return Ok(DeliveryOutcome::Suppressed);
        }

        self.registry.route(jid, &text).await?;
        self.acknowledge(batch).await?;
        info!(group = %batch.group, jid, count = batch.count, "reply delivered");
        Ok(DeliveryOutcome::Delivered)
    }

    /// Mark `batch` processed without sending anything.
    pub async fn acknowledge(&self, batch: &PendingBatch) -> Result<()> {
        self.store
            .advance_watermark(&batch.group, batch.newest)
            .await?;
        Ok(())
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use {
        super::*,
        crate::Error,
        async_trait::async_trait,
        waterline_channels::Channel,
        waterline_common::time::parse_timestamp,
        waterline_watermark::{InMemoryKvStore, WATERMARK_KEY},
    };

    struct RecordingChannel {
        prefix: &'static str,
        connected: AtomicBool,
        reject: bool,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingChannel {
        fn new(prefix: &'static str) -> Self {
            Self {
                prefix,
                connected: AtomicBool::new(true),
                reject: false,
                sent: Mutex::new(Vec::new()),
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Channel for RecordingChannel {
        fn name(&self) -> &str {
            "test"
        }

        fn owns_jid(&self, jid: &str) -> bool {
            jid.starts_with(self.prefix)
        }

        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn send_message(&self, jid: &str, text: &str) -> waterline_channels::Result<()> {
            if self.reject {
                return Err(waterline_channels::Error::delivery("test", "rejected"));
            }
            self.sent
                .lock()
                .unwrap()
                .push((jid.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn at(raw: &str) -> DateTime<Utc> {
        parse_timestamp(raw).unwrap()
    }

    fn msg(ts: &str, body: &str) -> InboundMessage {
        InboundMessage::text("family", "Alice", at(ts), body)
    }

    fn pipeline(channel: Arc<RecordingChannel>) -> DeliveryPipeline {
        let store = Arc::new(WatermarkStore::new(Arc::new(InMemoryKvStore::new())));
        let mut registry = ChannelRegistry::new();
        registry.register(channel);
        DeliveryPipeline::new(store, Arc::new(registry))
    }

    #[tokio::test]
    async fn full_cycle_advances_after_delivery() {
        let channel = Arc::new(RecordingChannel::new("tg:"));
        let pipeline = pipeline(channel.clone());
        let inbox = vec![
            msg("2024-01-01T00:00:01.000Z", "hi"),
            msg("2024-01-01T00:00:03.000Z", "anyone?"),
            msg("2024-01-01T00:00:02.000Z", "hello"),
        ];

        let batch = pipeline.pending("family", &inbox).await.unwrap().unwrap();
        assert_eq!(batch.count, 3);
        assert_eq!(batch.newest, at("2024-01-01T00:00:03.000Z"));
        assert!(matches!(batch.input, AgentInput::Text(ref t) if t.starts_with("<messages>")));

        let outcome = pipeline
            .deliver_reply(&batch, "tg:1", "<internal>plan</internal>Hello!")
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::Delivered);
        assert_eq!(channel.sent(), vec![("tg:1".to_string(), "Hello!".to_string())]);
        assert_eq!(
            pipeline.store().get_watermark("family").await.unwrap(),
            Some(batch.newest)
        );

        assert!(pipeline.pending("family", &inbox).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_reply_is_suppressed_but_acknowledged() {
        let channel = Arc::new(RecordingChannel::new("tg:"));
        let pipeline = pipeline(channel.clone());
        let batch = pipeline
            .pending("family", &[msg("2024-01-01T00:00:01.000Z", "x")])
            .await
            .unwrap()
            .unwrap();

        let outcome = pipeline
            .deliver_reply(&batch, "tg:1", "  <internal>nothing to say</internal> ")
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::Suppressed);
        assert!(channel.sent().is_empty());
        assert_eq!(
            pipeline.store().get_watermark("family").await.unwrap(),
            Some(batch.newest)
        );
    }

    #[tokio::test]
    async fn failed_send_leaves_watermark_untouched() {
        let channel = Arc::new(RecordingChannel {
            reject: true,
            ..RecordingChannel::new("tg:")
        });
        let pipeline = pipeline(channel);
        let batch = pipeline
            .pending("family", &[msg("2024-01-01T00:00:01.000Z", "x")])
            .await
            .unwrap()
            .unwrap();

        let err = pipeline.deliver_reply(&batch, "tg:1", "reply").await.unwrap_err();
        assert!(err.is_transient());
        assert!(pipeline.store().get_watermark("family").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn disconnected_and_unowned_do_not_advance() {
        let channel = Arc::new(RecordingChannel::new("tg:"));
        channel.connected.store(false, Ordering::SeqCst);
        let pipeline = pipeline(channel);
        let batch = pipeline
            .pending("family", &[msg("2024-01-01T00:00:01.000Z", "x")])
            .await
            .unwrap()
            .unwrap();

        let err = pipeline.deliver_reply(&batch, "tg:1", "reply").await.unwrap_err();
        assert!(err.is_transient());

        let err = pipeline.deliver_reply(&batch, "wa:1", "reply").await.unwrap_err();
        assert!(!err.is_transient());
        assert!(matches!(err, Error::Channel(waterline_channels::Error::NoOwner { .. })));

        assert!(pipeline.store().get_watermark("family").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn corrupt_state_surfaces_from_pending() {
        let kv = Arc::new(InMemoryKvStore::with_entry(WATERMARK_KEY, "[]"));
        let store = Arc::new(WatermarkStore::new(kv));
        let pipeline = DeliveryPipeline::new(store, Arc::new(ChannelRegistry::new()));

        let err = pipeline
            .pending("family", &[msg("2024-01-01T00:00:01.000Z", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Watermark(ref e) if e.is_corrupt_state()));
    }

    #[tokio::test]
    async fn acknowledge_without_reply() {
        let pipeline = pipeline(Arc::new(RecordingChannel::new("tg:")));
        let batch = pipeline
            .pending("family", &[msg("2024-01-01T00:00:05.000Z", "x")])
            .await
            .unwrap()
            .unwrap();
        pipeline.acknowledge(&batch).await.unwrap();
        assert!(
            pipeline
                .pending("family", &[msg("2024-01-01T00:00:05.000Z", "x")])
                .await
                .unwrap()
                .is_none()
        );
    }
}
