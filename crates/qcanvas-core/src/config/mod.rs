//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::canvas::MalformedPolicy;
use crate::locking::LockConfig;
use crate::storage::DEFAULT_TEMP_SUFFIX;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "QCANVAS_CONFIG_DIR";

/// qcanvas configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub canvas: CanvasConfig,
    pub lock: LockSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Required extension of target documents, without the dot
    pub extension: String,
    pub temp_suffix: String,
    pub on_malformed: MalformedPolicy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSettings {
    pub enabled: bool,
    pub timeout_ms: u64,
    pub retry_interval_ms: u64,
    pub ttl_secs: u64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            extension: "canvas".to_string(),
            temp_suffix: DEFAULT_TEMP_SUFFIX.to_string(),
            on_malformed: MalformedPolicy::Recover,
        }
    }
}

impl Default for LockSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: 2000,
            retry_interval_ms: 50,
            ttl_secs: 60,
        }
    }
}

impl LockSettings {
    /// Convert to the lock manager's configuration
    pub fn to_lock_config(&self) -> LockConfig {
        LockConfig {
            enabled: self.enabled,
            timeout: Duration::from_millis(self.timeout_ms),
            retry_interval: Duration::from_millis(self.retry_interval_ms),
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }
}

const KEYS: &[&str] = &[
    "canvas.extension",
    "canvas.temp_suffix",
    "canvas.on_malformed",
    "lock.enabled",
    "lock.timeout_ms",
    "lock.retry_interval_ms",
    "lock.ttl_secs",
];

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("qcanvas")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default location, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, or defaults if it doesn't exist
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config: Config = toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            config.validate()?;
            Ok(config)
        } else {
            // Return default config without creating file
            Ok(Config::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let ext = &self.canvas.extension;
        if ext.is_empty() || ext.starts_with('.') || ext.contains(['/', '\\']) {
            return Err(anyhow!(
                "canvas.extension must be a bare extension like \"canvas\", got {:?}",
                ext
            ));
        }
        if self.canvas.temp_suffix.is_empty() || self.canvas.temp_suffix.contains(['/', '\\']) {
            return Err(anyhow!(
                "canvas.temp_suffix must be a non-empty file name suffix, got {:?}",
                self.canvas.temp_suffix
            ));
        }
        if self.lock.retry_interval_ms == 0 {
            return Err(anyhow!("lock.retry_interval_ms must be greater than 0"));
        }
        Ok(())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "canvas.extension" => Ok(self.canvas.extension.clone()),
            "canvas.temp_suffix" => Ok(self.canvas.temp_suffix.clone()),
            "canvas.on_malformed" => Ok(self.canvas.on_malformed.to_string()),

            "lock.enabled" => Ok(self.lock.enabled.to_string()),
            "lock.timeout_ms" => Ok(self.lock.timeout_ms.to_string()),
            "lock.retry_interval_ms" => Ok(self.lock.retry_interval_ms.to_string()),
            "lock.ttl_secs" => Ok(self.lock.ttl_secs.to_string()),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `qcanvas config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    ///
    /// The configuration is left unchanged when the value is rejected.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut updated = self.clone();
        updated.apply(key, value)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "canvas.extension" => {
                self.canvas.extension = value.trim_start_matches('.').to_string();
            }
            "canvas.temp_suffix" => {
                self.canvas.temp_suffix = value.to_string();
            }
            "canvas.on_malformed" => {
                self.canvas.on_malformed = MalformedPolicy::from_str(value).ok_or_else(|| {
                    anyhow!("Invalid on_malformed policy: {}. Valid options: recover, fail", value)
                })?;
            }

            "lock.enabled" => {
                self.lock.enabled = value
                    .parse()
                    .with_context(|| format!("Invalid lock.enabled value: {}", value))?;
            }
            "lock.timeout_ms" => {
                self.lock.timeout_ms = value
                    .parse()
                    .with_context(|| format!("Invalid timeout_ms value: {}", value))?;
            }
            "lock.retry_interval_ms" => {
                self.lock.retry_interval_ms = value
                    .parse()
                    .with_context(|| format!("Invalid retry_interval_ms value: {}", value))?;
            }
            "lock.ttl_secs" => {
                self.lock.ttl_secs = value
                    .parse()
                    .with_context(|| format!("Invalid ttl_secs value: {}", value))?;
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `qcanvas config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        KEYS.iter()
            .map(|key| Ok((key.to_string(), self.get(key)?)))
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
