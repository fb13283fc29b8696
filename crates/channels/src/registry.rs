use std::sync::Arc;

use tracing::info;

#[cfg(feature = "metrics")]
use waterline_metrics::{channels as ch_metrics, gauge};

use crate::{Channel, Error, Result, router};

/// Liveness of one registered channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelStatus {
    pub name: String,
    pub connected: bool,
}

/// Registered channels, in registration order.
///
/// Lookup is a linear scan; the channel count is small and fixed.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: Vec<Arc<dyn Channel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        info!(channel = channel.name(), "channel registered");
        self.channels.push(channel);
        #[cfg(feature = "metrics")]
        gauge!(ch_metrics::REGISTERED).set(self.channels.len() as f64);
    }

    pub fn list(&self) -> &[Arc<dyn Channel>] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn statuses(&self) -> Vec<ChannelStatus> {
        self.channels
            .iter()
            .map(|c| ChannelStatus {
                name: c.name().to_string(),
                connected: c.is_connected(),
            })
            .collect()
    }

    /// See [`router::route`].
    pub async fn route(&self, jid: &str, text: &str) -> Result<()> {
        router::route(&self.channels, jid, text).await
    }

    /// See [`router::find_channel`].
    pub fn find_channel(&self, jid: &str) -> Option<&Arc<dyn Channel>> {
        router::find_channel(&self.channels, jid)
    }

    /// Check that each probe address is claimed by exactly one channel.
    ///
    /// Run at startup; an error here is a configuration error and should stop
    /// the process.
    pub fn validate_ownership<S: AsRef<str>>(&self, probe_jids: &[S]) -> Result<()> {
        for jid in probe_jids {
            let jid = jid.as_ref();
            let owners: Vec<String> = self
                .channels
                .iter()
                .filter(|c| c.owns_jid(jid))
                .map(|c| c.name().to_string())
                .collect();
            match owners.len() {
                0 => return Err(Error::no_owner(jid)),
                1 => {},
                _ => {
                    return Err(Error::OverlappingOwnership {
                        jid: jid.to_string(),
                        channels: owners,
                    });
                },
            }
        }
        Ok(())
    }
}
