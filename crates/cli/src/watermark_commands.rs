use std::sync::Arc;

use {
    clap::Subcommand,
    waterline_common::time::format_timestamp,
    waterline_config::WaterlineConfig,
    waterline_watermark::WatermarkStore,
};

use crate::db_commands::open_store;

#[derive(Subcommand)]
pub enum WatermarkAction {
    /// Print every tracked group and its watermark.
    List,
    /// Print one group's watermark.
    Get { group: String },
}

pub async fn handle_watermarks(
    action: WatermarkAction,
    config: &WaterlineConfig,
) -> anyhow::Result<()> {
    let kv = Arc::new(open_store(config).await?);
    let store = WatermarkStore::new(kv.clone());

    let result = match action {
        WatermarkAction::List => list(&store).await,
        WatermarkAction::Get { group } => get(&store, &group).await,
    };
    kv.close().await;
    result
}

async fn list(store: &WatermarkStore) -> anyhow::Result<()> {
    let record = store.load().await?;
    if record.is_empty() {
        println!("No groups tracked.");
        return Ok(());
    }
    let width = record.iter().map(|(g, _)| g.len()).max().unwrap_or(0);
    for (group, ts) in record.iter() {
        println!("{group:<width$}  {}", format_timestamp(&ts));
    }
    Ok(())
}

async fn get(store: &WatermarkStore, group: &str) -> anyhow::Result<()> {
    match store.get_watermark(group).await? {
        Some(ts) => println!("{}", format_timestamp(&ts)),
        None => println!("No watermark for '{group}' (all messages are new)."),
    }
    Ok(())
}
