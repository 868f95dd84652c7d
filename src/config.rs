//! Configuration for the biofeedback agent.

use crate::session::phase::SessionSchedule;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for a biofeedback session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Phase durations (baseline / pre / post), in seconds.
    pub schedule: SessionSchedule,

    /// Number of beat intervals per RMSSD window.
    pub window_capacity: usize,

    /// Cadence of the simulated z-score source.
    #[serde(with = "duration_serde")]
    pub tick_interval: Duration,

    /// How long to scan for a wearable monitor before falling back.
    #[serde(with = "duration_serde")]
    pub discovery_timeout: Duration,

    /// Subject identifier written to the summary log.
    pub subject_id: String,

    /// Free-form label grouping related sessions.
    pub session_label: String,

    /// Directory for per-sample session logs.
    pub log_dir: PathBuf,

    /// Directory for the cumulative summary file.
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulseloop");

        Self {
            schedule: SessionSchedule::default(),
            window_capacity: 20,
            tick_interval: Duration::from_secs(1),
            discovery_timeout: Duration::from_secs(15),
            subject_id: default_subject_id(),
            session_label: "music_biofeedback_1".to_string(),
            log_dir: data_dir.join("logs"),
            data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("pulseloop")
            .join("config.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.log_dir).map_err(|e| ConfigError::IoError(e.to_string()))?;
        std::fs::create_dir_all(&self.data_dir).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }
}

/// Subject id defaults to the machine hostname, keeping summary rows
/// attributable without any manual setup.
fn default_subject_id() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_else(|| "unknown_subject".to_string())
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
