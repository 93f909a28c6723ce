//! Vibesense Agent - block-based accelerometer sampling for vibration detection.
//!
//! This library reads a 3-axis accelerometer at a fixed rate in blocks,
//! reduces each block to eleven statistical features, and either records
//! them as labelled training data or classifies them as idle or vibrating.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Vibesense Agent                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐         │
//! │  │   Sensor    │──▶│   Block     │──▶│  Features   │         │
//! │  │ (capability)│   │  Sampler    │   │ (11 stats)  │         │
//! │  └─────────────┘   └─────────────┘   └─────────────┘         │
//! │                           │                 │                │
//! │                           ▼          ┌──────┴──────┐         │
//! │                    ┌─────────────┐   ▼             ▼         │
//! │                    │  Session    │ Dataset     Classifier    │
//! │                    │   Stats     │ (CSV)       (idle/vib)    │
//! │                    └─────────────┘                           │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use vibesense_agent::core::{compute_features, BlockSampler};
//! use vibesense_agent::sensor::{Profile, SimulatedSensor};
//!
//! let sensor = SimulatedSensor::new(Profile::Vibration);
//! let mut sampler = BlockSampler::new(sensor, 200.0, 256)?;
//!
//! let block = sampler.acquire_block()?;
//! let features = compute_features(&block)?;
//! println!("rms_mag = {:?}", features.get("rms_mag"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod classifier;
pub mod config;
pub mod core;
pub mod dataset;
pub mod sensor;
pub mod session;

// Re-export key types at crate root for convenience
pub use classifier::{Classifier, ClassifierError, LinearModel};
pub use config::{Config, ConfigError};
pub use crate::core::{
    compute_features, BasicStatFeatures, Block, BlockSampler, FeatureExtractor, FeatureRecord,
    FeatureSchema, FeatureVector, Label, TimingSampler, TimingStats,
};
pub use dataset::{DatasetError, DatasetWriter};
pub use sensor::{GRange, MotionSensor, SampleRate, SensorError, Vector3};
pub use session::{SessionError, SessionStats};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
