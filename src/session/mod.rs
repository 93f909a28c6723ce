//! Recording and inference sessions.
//!
//! A session owns one configured sensor through a sampler, runs until its
//! block count is reached or it is cancelled, and keeps [`SessionStats`]
//! about what it did.

pub mod runner;
pub mod stats;

use crate::classifier::ClassifierError;
use crate::config::{Config, ConfigError};
use crate::core::features::FeatureError;
use crate::core::timing::TimingError;
use crate::dataset::DatasetError;
use crate::sensor::{MotionSensor, SensorError};
use thiserror::Error;

// Re-export commonly used types
pub use runner::{record_dataset, run_inference, InferenceOptions, SessionOutcome};
pub use stats::{SessionStats, StatsSnapshot};

/// Any error that ends a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Sensor(#[from] SensorError),

    #[error(transparent)]
    Timing(#[from] TimingError),

    #[error(transparent)]
    Feature(#[from] FeatureError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validate `config` and apply its rate and range to `sensor`.
///
/// Validation happens first, so an unsupported setting never reaches the
/// device.
pub fn prepare_sensor<S: MotionSensor>(mut sensor: S, config: &Config) -> Result<S, SessionError> {
    let (rate, range) = config.validate()?;
    sensor.configure(rate, range)?;
    tracing::debug!(rate_hz = rate.hz(), range_g = range.g(), "sensor configured");
    Ok(sensor)
}
