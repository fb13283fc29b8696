//! Destination-address routing over an ordered channel list.

use std::sync::Arc;

use tracing::{debug, warn};

#[cfg(feature = "metrics")]
use waterline_metrics::{channels as ch_metrics, counter, histogram, labels};

use crate::{Channel, Error, Result};

/// Deliver `text` through the first channel (in registration order) that owns
/// `jid` and is connected.
///
/// Never falls back to a channel that does not own the address, and never
/// retries: the transport's outcome is returned unchanged.
pub async fn route(channels: &[Arc<dyn Channel>], jid: &str, text: &str) -> Result<()> {
    let Some(channel) = channels
        .iter()
        .find(|c| c.owns_jid(jid) && c.is_connected())
    else {
        let err = match find_channel(channels, jid) {
            Some(owner) => Error::disconnected(jid, owner.name()),
            None => Error::no_owner(jid),
        };
        warn!(jid, error = %err, "no channel available for outbound message");
        #[cfg(feature = "metrics")]
        counter!(ch_metrics::UNAVAILABLE_TOTAL).increment(1);
        return Err(err);
    };

    debug!(jid, channel = channel.name(), len = text.len(), "routing outbound message");

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();

    let result = channel.send_message(jid, text).await;

    #[cfg(feature = "metrics")]
    {
        let name = channel.name().to_string();
        histogram!(ch_metrics::SEND_DURATION_SECONDS, labels::CHANNEL => name.clone())
            .record(started.elapsed().as_secs_f64());
        match &result {
            Ok(()) => counter!(ch_metrics::MESSAGES_SENT_TOTAL, labels::CHANNEL => name)
                .increment(1),
            Err(_) => counter!(ch_metrics::SEND_ERRORS_TOTAL, labels::CHANNEL => name)
                .increment(1),
        }
    }

    if let Err(e) = &result {
        warn!(jid, channel = channel.name(), error = %e, "channel send failed");
    }
    result
}

/// The channel that owns `jid`, connected or not. For diagnostics only; use
/// [`route`] for delivery.
pub fn find_channel<'a>(
    channels: &'a [Arc<dyn Channel>],
    jid: &str,
) -> Option<&'a Arc<dyn Channel>> {
    channels.iter().find(|c| c.owns_jid(jid))
}
