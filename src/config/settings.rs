use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::{config, timing};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Delay between a successful save and closing the panel
    #[serde(default = "default_save_confirm_delay_ms")]
    pub save_confirm_delay_ms: u64,

    #[serde(default = "default_confirmation_duration_secs")]
    pub confirmation_duration_secs: u64,

    /// Where board records are kept; defaults under the data directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_save_confirm_delay_ms() -> u64 {
    timing::SAVE_CONFIRM_DELAY_MS
}

fn default_confirmation_duration_secs() -> u64 {
    timing::CONFIRMATION_DURATION_SECS
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            save_confirm_delay_ms: default_save_confirm_delay_ms(),
            confirmation_duration_secs: default_confirmation_duration_secs(),
            storage_dir: None,
        }
    }
}

impl AppSettings {
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(config::APP_DIR);
        path.push(config::FILENAME);
        path
    }

    /// Load settings from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("Settings file not found, creating default at {:?}", path);
            let settings = AppSettings::default();
            settings.save_to(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: AppSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;

        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings to JSON")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;

        info!("Saved settings to {:?}", path);
        Ok(())
    }

    /// Directory holding one JSON document per board
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
            path.push(config::APP_DIR);
            path.push(config::BOARDS_DIR);
            path
        })
    }

    pub fn save_confirm_delay(&self) -> Duration {
        Duration::from_millis(self.save_confirm_delay_ms)
    }

    pub fn confirmation_duration(&self) -> Duration {
        Duration::from_secs(self.confirmation_duration_secs)
    }
}
