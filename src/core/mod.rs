//! Core functionality for the vibration sensor agent.
//!
//! This module contains:
//! - Deadline-paced block acquisition and jitter measurement
//! - Feature computation from sample blocks
//! - The column schemas shared by recording and inference

pub mod block;
pub mod clock;
pub mod features;
mod pacing;
pub mod record;
pub mod sampler;
pub mod schema;
pub mod timing;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use block::Block;
pub use clock::{Clock, ManualClock, SystemClock};
pub use features::{
    compute_features, BasicStatFeatures, FeatureError, FeatureExtractor, FeatureVector,
};
pub use record::{FeatureRecord, Label};
pub use sampler::BlockSampler;
pub use schema::{FeatureSchema, FEATURE_NAMES, INFERENCE_ORDER};
pub use timing::{TimingError, TimingRecord, TimingSampler, TimingStats};
