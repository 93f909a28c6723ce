//! Idle/vibration classifier boundary.
//!
//! A [`Classifier`] maps feature rows to labels. Rows are always built with
//! [`FeatureSchema::inference`], and a model artifact declares the column
//! order it was trained on, which is checked against that schema at load
//! time.

use crate::core::features::{FeatureError, FeatureVector};
use crate::core::record::Label;
use crate::core::schema::FeatureSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors from loading or running a classifier.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Could not read model: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse model: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model feature order {found:?} does not match inference schema {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Invalid model: {0}")]
    InvalidModel(String),

    #[error("Row has {found} values, model expects {expected}")]
    RowShape { expected: usize, found: usize },

    #[error(transparent)]
    Feature(#[from] FeatureError),
}

/// Something that turns feature rows into class labels.
pub trait Classifier {
    /// Predict one label per row. Rows are in inference schema order.
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Label>, ClassifierError>;
}

/// Classify a single feature vector.
pub fn classify<C: Classifier + ?Sized>(
    classifier: &C,
    features: &FeatureVector,
) -> Result<Label, ClassifierError> {
    let row = FeatureSchema::inference().row(features)?;
    let labels = classifier.predict(&[row])?;
    labels
        .into_iter()
        .next()
        .ok_or_else(|| ClassifierError::InvalidModel("classifier returned no label".to_string()))
}

/// Standardising scaler followed by logistic regression.
///
/// This is the artifact the offline training step exports: per-feature
/// mean and scale, one weight per feature, and an intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// Column order the weights refer to.
    pub features: Vec<String>,
    pub scaler_mean: Vec<f64>,
    pub scaler_scale: Vec<f64>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearModel {
    /// Load and validate a model from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a model from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let model: LinearModel = serde_json::from_str(json)?;
        model.validate()?;
        Ok(model)
    }

    /// Check the column order and parameter shapes.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let schema = FeatureSchema::inference();
        if !schema.matches(&self.features) {
            return Err(ClassifierError::SchemaMismatch {
                expected: schema.names().iter().map(|s| s.to_string()).collect(),
                found: self.features.clone(),
            });
        }

        let n = schema.len();
        for (name, len) in [
            ("scaler_mean", self.scaler_mean.len()),
            ("scaler_scale", self.scaler_scale.len()),
            ("coefficients", self.coefficients.len()),
        ] {
            if len != n {
                return Err(ClassifierError::InvalidModel(format!(
                    "{name} has {len} entries, expected {n}"
                )));
            }
        }

        if self.scaler_scale.iter().any(|s| *s == 0.0 || !s.is_finite()) {
            return Err(ClassifierError::InvalidModel(
                "scaler_scale entries must be finite and non-zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Signed distance from the decision boundary; positive means vibration.
    pub fn decision(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        if row.len() != self.coefficients.len() {
            return Err(ClassifierError::RowShape {
                expected: self.coefficients.len(),
                found: row.len(),
            });
        }

        let score = row
            .iter()
            .zip(&self.scaler_mean)
            .zip(&self.scaler_scale)
            .zip(&self.coefficients)
            .map(|(((x, mean), scale), w)| (x - mean) / scale * w)
            .sum::<f64>();

        Ok(score + self.intercept)
    }

    /// Probability of the vibration class.
    pub fn probability(&self, row: &[f64]) -> Result<f64, ClassifierError> {
        let z = self.decision(row)?;
        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

impl Classifier for LinearModel {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<Label>, ClassifierError> {
        rows.iter()
            .map(|row| {
                let z = self.decision(row)?;
                Ok(if z > 0.0 { Label::Vibration } else { Label::Idle })
            })
            .collect()
    }
}
