mod channel_commands;
mod db_commands;
mod flush_commands;
mod sandbox_commands;
mod watermark_commands;

use {
    clap::{Parser, Subcommand},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "waterline", about = "Waterline: message router maintenance")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Custom config directory (overrides default ~/.config/waterline/).
    #[arg(long, global = true, env = "WATERLINE_CONFIG_DIR")]
    config_dir: Option<std::path::PathBuf>,
    /// Custom data directory (overrides default data dir).
    #[arg(long, global = true, env = "WATERLINE_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Advance every group's watermark to now, skipping queued messages.
    FlushQueue,
    /// Inspect stored watermarks.
    Watermarks {
        #[command(subcommand)]
        action: watermark_commands::WatermarkAction,
    },
    /// Container runtime lifecycle.
    Sandbox {
        #[command(subcommand)]
        action: sandbox_commands::SandboxAction,
    },
    /// Channel configuration checks.
    Channels {
        #[command(subcommand)]
        action: channel_commands::ChannelAction,
    },
    /// Database management.
    Db {
        #[command(subcommand)]
        action: db_commands::DbAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    debug!(version = env!("CARGO_PKG_VERSION"), "waterline starting");

    if let Some(ref dir) = cli.config_dir {
        waterline_config::set_config_dir(dir.clone());
    }
    if let Some(ref dir) = cli.data_dir {
        waterline_config::set_data_dir(dir.clone());
    }
    let config = waterline_config::discover_and_load();

    match cli.command {
        Commands::FlushQueue => flush_commands::handle_flush(&config).await,
        Commands::Watermarks { action } => {
            watermark_commands::handle_watermarks(action, &config).await
        },
        Commands::Sandbox { action } => sandbox_commands::handle_sandbox(action, &config).await,
        Commands::Channels { action } => channel_commands::handle_channels(action, &config),
        Commands::Db { action } => db_commands::handle_db(action, &config).await,
    }
}
