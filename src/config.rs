//! Configuration for the vibration sensor agent.

use crate::sensor::{GRange, SampleRate, SensorError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main configuration for the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output data rate in Hz
    pub rate_hz: u32,

    /// Measurement range in g
    pub range_g: u8,

    /// Samples per block
    pub block_size: usize,

    /// Pause between inference blocks
    #[serde(with = "duration_millis")]
    pub inference_pause: Duration,

    /// CSV file that recording sessions append to
    pub dataset_path: PathBuf,

    /// Trained model artifact used for inference
    pub model_path: PathBuf,

    /// Path for session statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vibesense-agent");

        Self {
            rate_hz: 200,
            range_g: 4,
            block_size: 256,
            inference_pause: Duration::from_millis(50),
            dataset_path: data_dir.join("datasets").join("features.csv"),
            model_path: data_dir.join("models").join("model.json"),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vibesense-agent")
            .join("config.json")
    }

    /// Path of the persisted session statistics.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("session_stats.json")
    }

    /// Ensure all required directories exist.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.data_path)?;
        for path in [&self.dataset_path, &self.model_path] {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Check the device settings and block shape.
    ///
    /// Runs before any sensor is opened so a bad configuration never
    /// touches the device.
    pub fn validate(&self) -> Result<(SampleRate, GRange), ConfigError> {
        let rate = SampleRate::from_hz(self.rate_hz)?;
        let range = GRange::from_g(self.range_g)?;
        if self.block_size == 0 {
            return Err(ConfigError::Invalid(
                "block_size must be at least 1".to_string(),
            ));
        }
        Ok((rate, range))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration as whole milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.rate_hz, 200);
        assert_eq!(config.range_g, 4);
        assert_eq!(config.block_size, 256);
        assert_eq!(config.inference_pause, Duration::from_millis(50));
        assert!(config.dataset_path.ends_with("features.csv"));

        let (rate, range) = config.validate().unwrap();
        assert_eq!(rate, SampleRate::Hz200);
        assert_eq!(range, GRange::G4);
    }

    #[test]
    fn test_validate_rejects_unsupported_settings() {
        let config = Config {
            rate_hz: 150,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Sensor(SensorError::UnsupportedConfiguration(_)))
        ));

        let config = Config {
            range_g: 3,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Sensor(SensorError::UnsupportedConfiguration(_)))
        ));

        let config = Config {
            block_size: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_json_uses_millis_and_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"rate_hz": 400, "inference_pause": 125}"#).unwrap();
        assert_eq!(config.rate_hz, 400);
        assert_eq!(config.inference_pause, Duration::from_millis(125));
        assert_eq!(config.block_size, 256);

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["inference_pause"], 125);
    }
}
