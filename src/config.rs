use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn, Level};

use crate::mapping::translator::{
    TranslatorSettings, DEFAULT_HIGH_THRESHOLD, DEFAULT_LOW_THRESHOLD, DEFAULT_STRAFE_SPEED,
};

const CONFIG_DIR: &str = "padbridge";
const CONFIG_FILE: &str = "padbridge.toml";

/// Longest accepted stats period, one day
pub const MAX_STATS_INTERVAL_SECS: u64 = 24 * 60 * 60;

// Config errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Tuning values for the bridge, read from `padbridge.toml`
///
/// Every key is optional. The control layout itself is fixed and not part of
/// the file.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    pub tick_interval_ms: u64,
    pub max_events_per_tick: usize,
    pub strafe_speed: i32,
    pub low_threshold: u32,
    pub high_threshold: u32,
    /// Log batches instead of injecting them
    pub dry_run: bool,
    pub log_level: String,
    pub stats_interval_secs: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10,
            max_events_per_tick: 32,
            strafe_speed: DEFAULT_STRAFE_SPEED,
            low_threshold: DEFAULT_LOW_THRESHOLD,
            high_threshold: DEFAULT_HIGH_THRESHOLD,
            dry_run: false,
            log_level: "info".to_string(),
            stats_interval_secs: 10,
        }
    }
}

impl BridgeConfig {
    /// Loads the config from the default location, defaults if it does not exist
    pub async fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_path()).await
    }

    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        if !exists {
            info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;

        let config = Self::parse(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        debug!("Parsed config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than 0".to_string(),
            ));
        }
        if self.max_events_per_tick == 0 {
            return Err(ConfigError::Invalid(
                "max_events_per_tick must be greater than 0".to_string(),
            ));
        }
        if self.strafe_speed <= 0 {
            return Err(ConfigError::Invalid(
                "strafe_speed must be greater than 0".to_string(),
            ));
        }
        if self.low_threshold >= self.high_threshold {
            return Err(ConfigError::Invalid(format!(
                "low_threshold ({}) must be below high_threshold ({})",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.stats_interval_secs == 0 || self.stats_interval_secs > MAX_STATS_INTERVAL_SECS {
            return Err(ConfigError::Invalid(format!(
                "stats_interval_secs must be between 1 and {}",
                MAX_STATS_INTERVAL_SECS
            )));
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        self.log_level
            .parse::<Level>()
            .map_err(|_| ConfigError::Invalid(format!("unknown log_level: {}", self.log_level)))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Stats period, capped at [`MAX_STATS_INTERVAL_SECS`]
    pub fn stats_interval(&self) -> chrono::Duration {
        let secs = self.stats_interval_secs.min(MAX_STATS_INTERVAL_SECS);
        chrono::Duration::seconds(secs as i64)
    }

    pub fn translator_settings(&self) -> TranslatorSettings {
        TranslatorSettings {
            strafe_speed: self.strafe_speed,
            low_threshold: self.low_threshold,
            high_threshold: self.high_threshold,
        }
    }
}

/// `<config dir>/padbridge/padbridge.toml`
pub fn default_path() -> PathBuf {
    let mut path = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| {
            warn!("Could not determine config directory, using current directory");
            PathBuf::from(".")
        });
    path.push(CONFIG_DIR);
    path.push(CONFIG_FILE);
    path
}
