use {
    anyhow::Context,
    clap::Subcommand,
    waterline_config::WaterlineConfig,
    waterline_watermark::SqliteKvStore,
};

#[derive(Subcommand)]
pub enum DbAction {
    /// Create or upgrade the database schema.
    Migrate,
    /// Print the resolved database path.
    Path,
}

pub async fn handle_db(action: DbAction, config: &WaterlineConfig) -> anyhow::Result<()> {
    match action {
        DbAction::Migrate => {
            let kv = open_store(config).await?;
            kv.close().await;
            println!(
                "Database is up to date: {}",
                config.database.resolved_path().display()
            );
            Ok(())
        },
        DbAction::Path => {
            println!("{}", config.database.resolved_path().display());
            Ok(())
        },
    }
}

/// Open the configured database, creating its directory and running pending
/// migrations.
pub async fn open_store(config: &WaterlineConfig) -> anyhow::Result<SqliteKvStore> {
    let path = config.database.resolved_path();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let store = SqliteKvStore::new(&config.database.url())
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(store)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, waterline_config::DatabaseConfig, waterline_watermark::KvStore};

    #[tokio::test]
    async fn open_store_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/state/messages.db");
        let config = WaterlineConfig {
            database: DatabaseConfig {
                path: Some(path.clone()),
            },
            ..WaterlineConfig::default()
        };

        let kv = open_store(&config).await.unwrap();
        kv.set("k", "v").await.unwrap();
        kv.close().await;

        assert!(path.exists());
    }
}
