use std::sync::Arc;

use {
    anyhow::Result,
    clap::Subcommand,
    waterline_channels::{ChannelRegistry, PrefixChannel, UnboundTransport},
    waterline_config::{Severity, WaterlineConfig, validate},
};

#[derive(Subcommand)]
pub enum ChannelAction {
    /// Validate channel config and check that every probe address has
    /// exactly one owning channel.
    Check,
    /// List configured channels and their ownership rules.
    List,
}

pub fn handle_channels(action: ChannelAction, config: &WaterlineConfig) -> Result<()> {
    match action {
        ChannelAction::Check => check(config),
        ChannelAction::List => {
            if config.channels.is_empty() {
                println!("No channels configured.");
            }
            for ch in &config.channels {
                println!(
                    "{}  prefixes=[{}] suffixes=[{}]",
                    ch.name,
                    ch.owns_prefixes.join(", "),
                    ch.owns_suffixes.join(", ")
                );
            }
            Ok(())
        },
    }
}

fn check(config: &WaterlineConfig) -> Result<()> {
    let result = validate(config);
    for diag in &result.diagnostics {
        println!("{diag}");
    }
    if result.has_errors() {
        anyhow::bail!("config has {} error(s)", result.count(Severity::Error));
    }

    let registry = build_registry(config);
    registry.validate_ownership(&config.channels_check.probe_jids)?;

    println!(
        "{} channel(s), {} probe address(es) each owned by exactly one channel.",
        registry.len(),
        config.channels_check.probe_jids.len()
    );
    Ok(())
}

/// Registry of configured channels without live transports.
fn build_registry(config: &WaterlineConfig) -> ChannelRegistry {
    let mut registry = ChannelRegistry::new();
    for cfg in &config.channels {
        registry.register(Arc::new(PrefixChannel::from_config(
            cfg,
            UnboundTransport::new(cfg.name.clone()),
        )));
    }
    registry
}
