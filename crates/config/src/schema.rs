//! Config schema types (database, sandbox, channels).
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterlineConfig {
    pub database: DatabaseConfig,
    pub sandbox: SandboxConfig,
    /// Channels in registration order. Routing picks the first owner.
    pub channels: Vec<ChannelConfig>,
    pub channels_check: ChannelsCheckConfig,
}

/// Where the router state lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. Defaults to `<data_dir>/messages.db`.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file, falling back to the data directory.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| crate::loader::data_dir().join("messages.db"))
    }

    /// sqlx connection URL for the resolved path, creating the file if missing.
    pub fn url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.resolved_path().display())
    }
}

/// Container runtime used for agent execution environments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Runtime CLI binary (e.g. `container`).
    pub runtime_bin: String,
    /// Containers whose id starts with this prefix belong to waterline.
    pub container_prefix: String,
    /// Upper bound for `system start`.
    pub start_timeout_secs: u64,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            runtime_bin: "container".into(),
            container_prefix: "waterline-".into(),
            start_timeout_secs: 30,
        }
    }
}

/// Address ownership rules for one channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub name: String,
    /// The channel owns addresses starting with any of these.
    pub owns_prefixes: Vec<String>,
    /// The channel owns addresses ending with any of these (e.g. `@g.us`).
    pub owns_suffixes: Vec<String>,
}

impl ChannelConfig {
    pub fn has_ownership_rules(&self) -> bool {
        !self.owns_prefixes.is_empty() || !self.owns_suffixes.is_empty()
    }
}

/// Sample addresses used by `channels check` to prove every address has
/// exactly one owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsCheckConfig {
    pub probe_jids: Vec<String>,
}
