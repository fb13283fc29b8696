use {async_trait::async_trait, waterline_config::ChannelConfig};

use crate::{Error, Result};

/// Outbound channel capability. Each messaging transport implements this.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel identifier (e.g. "whatsapp", "telegram").
    fn name(&self) -> &str;

    /// Whether this channel is responsible for `jid`.
    ///
    /// Must be pure and total. Across a registry the predicates partition
    /// the address space.
    fn owns_jid(&self, jid: &str) -> bool;

    /// Current liveness. Must not block.
    fn is_connected(&self) -> bool;

    /// Send `text` to `jid`, resolving once the transport accepts it.
    async fn send_message(&self, jid: &str, text: &str) -> Result<()>;
}

/// Prefix/suffix address ownership rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelOwnership {
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
}

impl ChannelOwnership {
    pub fn owns(&self, jid: &str) -> bool {
        self.prefixes.iter().any(|p| jid.starts_with(p.as_str()))
            || self.suffixes.iter().any(|s| jid.ends_with(s.as_str()))
    }
}

impl From<&ChannelConfig> for ChannelOwnership {
    fn from(cfg: &ChannelConfig) -> Self {
        Self {
            prefixes: cfg.owns_prefixes.clone(),
            suffixes: cfg.owns_suffixes.clone(),
        }
    }
}

/// Raw transport behind a [`PrefixChannel`]: connection state and send.
#[async_trait]
pub trait ChannelTransport: Send + Sync {
    fn is_connected(&self) -> bool;
    async fn send(&self, jid: &str, text: &str) -> Result<()>;
}

/// A [`Channel`] whose ownership comes from config rules, delegating
/// liveness and delivery to a transport.
pub struct PrefixChannel<T> {
    name: String,
    ownership: ChannelOwnership,
    transport: T,
}

impl<T: ChannelTransport> PrefixChannel<T> {
    pub fn new(name: impl Into<String>, ownership: ChannelOwnership, transport: T) -> Self {
        Self {
            name: name.into(),
            ownership,
            transport,
        }
    }

    pub fn from_config(cfg: &ChannelConfig, transport: T) -> Self {
        Self::new(cfg.name.clone(), ChannelOwnership::from(cfg), transport)
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: ChannelTransport> Channel for PrefixChannel<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn owns_jid(&self, jid: &str) -> bool {
        self.ownership.owns(jid)
    }

    fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    async fn send_message(&self, jid: &str, text: &str) -> Result<()> {
        self.transport.send(jid, text).await
    }
}

/// Placeholder transport for channels that are configured but have no live
/// connection in this process (diagnostics, ownership checks).
#[derive(Debug, Clone, Default)]
pub struct UnboundTransport {
    name: String,
}

impl UnboundTransport {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl ChannelTransport for UnboundTransport {
    fn is_connected(&self) -> bool {
        false
    }

    async fn send(&self, jid: &str, _text: &str) -> Result<()> {
        Err(Error::disconnected(jid, self.name.clone()))
    }
}
