use std::sync::Arc;

use {
    waterline_common::time::{format_timestamp, now_millis},
    waterline_config::WaterlineConfig,
    waterline_gateway::{Error as GatewayError, FlushOutcome, flush_queue},
    waterline_watermark::{WATERMARK_KEY, WatermarkStore},
};

use crate::db_commands::open_store;

pub async fn handle_flush(config: &WaterlineConfig) -> anyhow::Result<()> {
    let kv = match open_store(config).await {
        Ok(kv) => Arc::new(kv),
        Err(e) => {
            eprintln!("Could not open database: {e:#}");
            eprintln!(
                "Check the [database] path in your config or pass --data-dir. \
                 `waterline db path` prints the location in use."
            );
            anyhow::bail!("database unavailable");
        },
    };
    let store = WatermarkStore::new(kv.clone());

    let outcome = flush_queue(&store, now_millis()).await;
    kv.close().await;

    match outcome {
        Ok(outcome) => {
            for line in describe(&outcome) {
                println!("{line}");
            }
            Ok(())
        },
        Err(GatewayError::Watermark(e)) if e.is_corrupt_state() => {
            eprintln!("Corrupted {WATERMARK_KEY} in DB.");
            Err(e.into())
        },
        Err(e) => Err(e.into()),
    }
}

fn describe(outcome: &FlushOutcome) -> Vec<String> {
    match outcome {
        FlushOutcome::NoState => {
            vec!["No message queue state found — nothing to flush.".to_string()]
        },
        FlushOutcome::NoGroups => vec!["No groups in queue — nothing to flush.".to_string()],
        FlushOutcome::Flushed { at, groups } => vec![
            format!("Queue flushed to {}", format_timestamp(at)),
            format!("Groups updated ({}): {}", groups.len(), groups.join(", ")),
        ],
    }
}
