//! Sunup configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SunupConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub suntimes: SunTimesConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl SunupConfig {
    /// Load config from the default path (~/.sunup/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::error::SunupError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| crate::error::SunupError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    /// Get the sunup home directory.
    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sunup")
    }
}

/// Telegram delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default = "bool_true")]
    pub enabled: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            enabled: true,
        }
    }
}

/// Remote sun times service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SunTimesConfig {
    #[serde(default = "default_suntimes_url")]
    pub base_url: String,
    #[serde(default = "default_suntimes_timeout")]
    pub timeout_secs: u64,
}

impl Default for SunTimesConfig {
    fn default() -> Self {
        Self {
            base_url: default_suntimes_url(),
            timeout_secs: default_suntimes_timeout(),
        }
    }
}

fn default_suntimes_url() -> String {
    "http://127.0.0.1:8500".into()
}

fn default_suntimes_timeout() -> u64 {
    10
}

/// Scheduler and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Firing loop granularity.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Attempts per notifier install before giving up for the cycle.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Fixed pause between install attempts.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_secs: u64,
    /// Period of the daily reinstall sweep.
    #[serde(default = "default_reinstall_period")]
    pub reinstall_period_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval(),
            retry_attempts: default_retry_attempts(),
            retry_backoff_secs: default_retry_backoff(),
            reinstall_period_hours: default_reinstall_period(),
        }
    }
}

fn default_tick_interval() -> u64 {
    1
}

fn default_retry_attempts() -> u32 {
    5
}

fn default_retry_backoff() -> u64 {
    5
}

fn default_reinstall_period() -> u64 {
    24
}

/// Chat state store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding the state file. Defaults to the sunup home dir.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(SunupConfig::home_dir)
    }
}

fn bool_true() -> bool {
    true
}
