use std::{
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, warn};

use crate::{env_subst::substitute_env, schema::WaterlineConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "waterline.toml",
    "waterline.yaml",
    "waterline.yml",
    "waterline.json",
];

static CONFIG_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);
static DATA_DIR_OVERRIDE: Mutex<Option<PathBuf>> = Mutex::new(None);

/// Load config from the given path (any supported format).
pub fn load_config(path: &Path) -> anyhow::Result<WaterlineConfig> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
    let raw = substitute_env(&raw);
    parse_config(&raw, path)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./waterline.{toml,yaml,yml,json}` (project-local)
/// 2. the config directory (`--config-dir`, else `~/.config/waterline/`)
///
/// Returns `WaterlineConfig::default()` if no config file is found.
pub fn discover_and_load() -> WaterlineConfig {
    if let Some(path) = find_config_file() {
        debug!(path = %path.display(), "loading config");
        match load_config(&path) {
            Ok(cfg) => return cfg,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            },
        }
    } else {
        debug!("no config file found, using defaults");
    }
    WaterlineConfig::default()
}

/// Find the first config file in standard locations.
fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
}

/// Override the config directory (e.g. from `--config-dir`).
pub fn set_config_dir(dir: PathBuf) {
    *CONFIG_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

pub fn clear_config_dir() {
    *CONFIG_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Override the data directory (e.g. from `--data-dir`).
pub fn set_data_dir(dir: PathBuf) {
    *DATA_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = Some(dir);
}

pub fn clear_data_dir() {
    *DATA_DIR_OVERRIDE.lock().unwrap_or_else(|e| e.into_inner()) = None;
}

/// Returns the config directory: the override if set, else
/// `~/.config/waterline/`.
pub fn config_dir() -> Option<PathBuf> {
    if let Some(dir) = CONFIG_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return Some(dir);
    }
    directories::ProjectDirs::from("", "", "waterline").map(|d| d.config_dir().to_path_buf())
}

/// Returns the data directory: the override if set, else the platform data
/// dir, else `./store`.
pub fn data_dir() -> PathBuf {
    if let Some(dir) = DATA_DIR_OVERRIDE
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone()
    {
        return dir;
    }
    directories::ProjectDirs::from("", "", "waterline")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("store"))
}

fn parse_config(raw: &str, path: &Path) -> anyhow::Result<WaterlineConfig> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match ext {
        "toml" => Ok(toml::from_str(raw)?),
        "yaml" | "yml" => Ok(serde_yaml::from_str(raw)?),
        "json" => Ok(serde_json::from_str(raw)?),
        _ => anyhow::bail!("unsupported config format: .{ext}"),
    }
}
