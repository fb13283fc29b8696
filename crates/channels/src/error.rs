use std::error::Error as StdError;

/// Crate-wide result type for channel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed channel errors.
///
/// Configuration errors (`NoOwner`, `OverlappingOwnership`) should be
/// alerted on. Transient errors (`Disconnected`, `Delivery`, `External`) are
/// returned to the caller, which owns any retry policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No registered channel claims the address.
    #[error("no channel owns address: {jid}")]
    NoOwner { jid: String },

    /// The owning channel exists but is not connected right now.
    #[error("channel '{channel}' owns {jid} but is disconnected")]
    Disconnected { jid: String, channel: String },

    /// More than one channel claims the same address.
    #[error("address {jid} is claimed by multiple channels: {}", .channels.join(", "))]
    OverlappingOwnership { jid: String, channels: Vec<String> },

    /// The transport rejected the message, timed out, or dropped mid-send.
    #[error("delivery via '{channel}' failed: {reason}")]
    Delivery { channel: String, reason: String },

    /// Wrapped source error from a transport dependency.
    #[error("channel operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn no_owner(jid: impl Into<String>) -> Self {
        Self::NoOwner { jid: jid.into() }
    }

    #[must_use]
    pub fn disconnected(jid: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::Disconnected {
            jid: jid.into(),
            channel: channel.into(),
        }
    }

    #[must_use]
    pub fn delivery(channel: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Delivery {
            channel: channel.into(),
            reason: reason.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// No channel could take the message (unowned or owner disconnected).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::NoOwner { .. } | Self::Disconnected { .. })
    }

    /// Worth retrying later with the same configuration.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Disconnected { .. } | Self::Delivery { .. } | Self::External { .. }
        )
    }

    /// Ownership misconfiguration; retrying will not help.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::NoOwner { .. } | Self::OverlappingOwnership { .. })
    }
}
