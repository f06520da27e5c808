//! System-wide configuration file
//!
//! Lives at `<config dir>/memoboard/config.toml` unless overridden with
//! `--config` / `MEMO_CONFIG`. A missing file means defaults.

use anyhow::{Context, Result};
use memo_watcher::DebounceConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Auto-save debouncing
    #[serde(default)]
    pub autosave: DebounceConfig,

    /// Where memos are stored
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Storage location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Data directory (default: `<data dir>/memoboard`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl SystemConfig {
    /// Check all values are within their accepted ranges
    pub fn validate(&self) -> Result<()> {
        self.autosave.validate()?;
        if let Some(dir) = &self.storage.data_dir {
            if dir.as_os_str().is_empty() {
                anyhow::bail!("storage.data_dir must not be empty");
            }
        }
        Ok(())
    }

    /// Configured data directory, falling back to the platform default
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("memoboard"))
                .context("Could not determine data directory"),
        }
    }
}

/// Default config file location
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("memoboard").join("config.toml"))
}

/// Load configuration; a missing file yields defaults
pub fn load(path: &Path) -> Result<SystemConfig> {
    if !path.exists() {
        return Ok(SystemConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: SystemConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(config)
}

/// Write configuration, creating parent directories
pub fn save(path: &Path, config: &SystemConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }
    let serialized = toml::to_string_pretty(config).context("Failed to serialize config")?;
    std::fs::write(path, serialized)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Create the file with defaults if it does not exist; returns true if created
pub fn init_if_missing(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save(path, &SystemConfig::default())?;
    Ok(true)
}

/// Annotated example configuration
pub fn example_config() -> String {
    r#"# Memoboard configuration

[autosave]
# Quiet period after the last edit before a memo is saved (1-60000)
delay_ms = 500
# How long a flush waits for a save that is already running (0-5000)
grace_ms = 50

[storage]
# Where memos are kept (default: platform data directory)
# data_dir = "/home/me/.local/share/memoboard"
"#
    .to_string()
}
