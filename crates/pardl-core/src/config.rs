use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Global configuration loaded from `~/.config/pardl/config.toml`.
///
/// Batch size, parallelism, and the output folder come from the CLI; the
/// config file supplies defaults and tuning knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PardlConfig {
    /// Default maximum number of downloads in flight when `--parallelism` is not given.
    pub parallelism: usize,
    /// URL fetched for every item in a batch.
    pub source_url: String,
    /// Extension for output files; derived from the URL path when unset.
    #[serde(default)]
    pub file_extension: Option<String>,
    /// Fixed delay between submitting consecutive downloads, in milliseconds.
    pub stagger_ms: u64,
    /// Connect timeout per fetch, in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-transfer timeout per fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for PardlConfig {
    fn default() -> Self {
        Self {
            parallelism: 4,
            source_url: "https://picsum.photos/200/300".to_string(),
            file_extension: Some("png".to_string()),
            stagger_ms: 500,
            connect_timeout_secs: 30,
            fetch_timeout_secs: 300,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("pardl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<PardlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = PardlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: PardlConfig = toml::from_str(&data)?;
    Ok(cfg)
}
