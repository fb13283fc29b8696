//! Configuration loading, env substitution, and validation.
//!
//! Config files: `waterline.toml`, `waterline.yaml`, or `waterline.json`
//! Searched in `./` then `~/.config/waterline/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        clear_config_dir, clear_data_dir, config_dir, data_dir, discover_and_load, load_config,
        set_config_dir, set_data_dir,
    },
    schema::{
        ChannelConfig, ChannelsCheckConfig, DatabaseConfig, SandboxConfig, WaterlineConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
