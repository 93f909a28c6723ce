//! Feature computation from sample blocks.
//!
//! A block is reduced to per-axis mean, population standard deviation and
//! RMS, plus RMS and standard deviation of the per-sample vector magnitude.
//! Extraction is pure: the same block always yields bit-identical values.

use crate::core::block::Block;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors from feature extraction and schema lookups.
#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("Cannot extract features from an empty block")]
    EmptyBlock,

    #[error("Feature vector has no entry named '{0}'")]
    MissingFeature(String),
}

/// Named feature values for one block.
///
/// Iteration is by name, but consumers that need a column order must go
/// through a [`FeatureSchema`](crate::core::schema::FeatureSchema) rather
/// than rely on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    values: BTreeMap<String, f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Look up a value, failing if the extractor did not produce it.
    pub fn require(&self, name: &str) -> Result<f64, FeatureError> {
        self.get(name)
            .ok_or_else(|| FeatureError::MissingFeature(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Reduces a block to named features.
pub trait FeatureExtractor {
    fn extract(&self, block: &Block) -> Result<FeatureVector, FeatureError>;
}

/// Mean, standard deviation and RMS per axis and of the vector magnitude.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicStatFeatures;

impl FeatureExtractor for BasicStatFeatures {
    fn extract(&self, block: &Block) -> Result<FeatureVector, FeatureError> {
        compute_features(block)
    }
}

/// Compute the basic statistical features of a block.
pub fn compute_features(block: &Block) -> Result<FeatureVector, FeatureError> {
    if block.is_empty() {
        return Err(FeatureError::EmptyBlock);
    }

    let x: Vec<f64> = block.vectors().map(|v| v.x as f64).collect();
    let y: Vec<f64> = block.vectors().map(|v| v.y as f64).collect();
    let z: Vec<f64> = block.vectors().map(|v| v.z as f64).collect();
    let magnitude: Vec<f64> = block.vectors().map(|v| v.magnitude()).collect();

    let mut features = FeatureVector::new();

    for (axis, values) in [("x", &x), ("y", &y), ("z", &z)] {
        features.insert(format!("rms_{axis}"), values.iter().quadratic_mean());
        features.insert(format!("mean_{axis}"), values.iter().mean());
        features.insert(format!("std_{axis}"), values.iter().population_std_dev());
    }

    features.insert("rms_mag", magnitude.iter().quadratic_mean());
    features.insert("std_mag", magnitude.iter().population_std_dev());

    Ok(features)
}
