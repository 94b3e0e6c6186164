use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{plog_debug, Error, Result};

const DEFAULT_REFRESH_MS: u64 = 1000;
const DEFAULT_STATS_MS: u64 = 1000;
const DEFAULT_LIST_TIMEOUT_MS: u64 = 5000;

/// User configuration read from `~/.podboard/podboard.toml`.
///
/// Every field is optional in the file; accessors apply the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub refresh_interval_ms: Option<u64>,
    pub stats_interval_ms: Option<u64>,
    pub list_timeout_ms: Option<u64>,
    pub podman_command: Option<String>,
    /// Named podman system connection (`podman --connection <name>`).
    pub connection: Option<String>,
    /// Pre-filled infra image in the pod create dialog.
    pub pod_infra_image: Option<String>,
}

impl Config {
    pub fn podboard_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".podboard"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::podboard_dir()?.join("podboard.toml"))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.unwrap_or(DEFAULT_REFRESH_MS).max(100))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_millis(self.stats_interval_ms.unwrap_or(DEFAULT_STATS_MS).max(100))
    }

    pub fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms.unwrap_or(DEFAULT_LIST_TIMEOUT_MS))
    }

    pub fn podman_command(&self) -> &str {
        self.podman_command.as_deref().unwrap_or("podman")
    }

    pub fn infra_image(&self) -> &str {
        self.pod_infra_image.as_deref().unwrap_or("")
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        plog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            plog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        plog_debug!(
            "Config loaded: refresh={:?} connection={:?} podman={}",
            config.refresh_interval_ms,
            config.connection,
            config.podman_command()
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        plog_debug!("Config saved to {}", path.display());
        Ok(())
    }
}
