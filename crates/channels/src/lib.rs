//! Outbound channel routing and message formatting.
//!
//! Each transport (WhatsApp, Telegram, ...) implements the [`Channel`]
//! capability. The [`ChannelRegistry`] holds them in registration order and
//! routes a reply to the first channel that owns the destination address and
//! is connected. The [`format`] module turns inbound messages into agent
//! input and strips private annotations from agent replies.

pub mod error;
pub mod format;
pub mod plugin;
pub mod registry;
pub mod router;
#[cfg(test)]
mod testing;

pub use {
    error::{Error, Result},
    format::{escape_xml, format_messages, format_outbound, strip_internal_tags},
    plugin::{Channel, ChannelOwnership, ChannelTransport, PrefixChannel, UnboundTransport},
    registry::{ChannelRegistry, ChannelStatus},
    router::{find_channel, route},
};
