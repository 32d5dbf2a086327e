//! Configuration management for patchwright
//!
//! Stores settings in ~/.config/patchwright/config.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model id passed to the gateway
    pub model: String,
    /// Upper bound on how long a streamed answer may take
    pub stream_timeout_secs: u64,
    /// Log pipeline internals at debug level
    pub debug: bool,
}

const DEFAULT_MODEL: &str = "llama2";
const DEFAULT_STREAM_TIMEOUT_SECS: u64 = 120;

impl Default for Config {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            stream_timeout_secs: DEFAULT_STREAM_TIMEOUT_SECS,
            debug: false,
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("patchwright"))
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Like [`Config::load`] for an explicit path. A corrupt file is moved
    /// aside and defaults are used.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(err) => {
                if let Ok(content) = fs::read_to_string(path) {
                    preserve_corrupt_config(path, &content);
                }
                tracing::warn!(
                    "Config file was corrupted ({:#}). A backup was saved and defaults were loaded.",
                    err
                );
                Self::default()
            }
        }
    }

    /// Read and parse a config file, surfacing any error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        #[cfg(unix)]
        {
            write_config_atomic(path, &content).context("Failed to write config")?;
        }

        #[cfg(not(unix))]
        {
            fs::write(path, content).context("Failed to write config")?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.stream_timeout_secs == 0 {
            return Err("stream_timeout_secs must be greater than zero".to_string());
        }
        Ok(())
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/patchwright/config.json".to_string())
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

#[cfg(unix)]
fn write_config_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    use std::fs::OpenOptions;
    use std::os::unix::fs::PermissionsExt;

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    if let Err(e) = file.set_permissions(fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set temp config file permissions: {}", e);
    }

    file.write_all(content.as_bytes())?;

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err);
    }
    Ok(())
}
