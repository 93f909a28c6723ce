//! Column orders shared by dataset recording and inference.
//!
//! The classifier is trained on rows read from recorded datasets and fed
//! rows built at inference time. Both sides take their column order from
//! here so the two can never drift apart.

use crate::core::features::{FeatureError, FeatureVector};

/// Feature names in persisted dataset column order.
pub const FEATURE_NAMES: [&str; 11] = [
    "rms_x", "rms_y", "rms_z", "mean_x", "mean_y", "mean_z", "std_x", "std_y", "std_z", "rms_mag",
    "std_mag",
];

/// Feature names in classifier input order (ascending by name).
pub const INFERENCE_ORDER: [&str; 11] = [
    "mean_x", "mean_y", "mean_z", "rms_mag", "rms_x", "rms_y", "rms_z", "std_mag", "std_x",
    "std_y", "std_z",
];

/// Leading dataset column: wall-clock Unix seconds.
pub const TIMESTAMP_COLUMN: &str = "timestamp";

/// Trailing dataset column: integer class id.
pub const LABEL_COLUMN: &str = "label";

/// An explicit, ordered list of feature names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: &'static [&'static str],
}

impl FeatureSchema {
    /// Column order of persisted feature records.
    pub fn record() -> Self {
        Self {
            names: &FEATURE_NAMES,
        }
    }

    /// Column order the classifier consumes.
    pub fn inference() -> Self {
        Self {
            names: &INFERENCE_ORDER,
        }
    }

    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Lay out a feature vector as one row in this schema's order.
    pub fn row(&self, features: &FeatureVector) -> Result<Vec<f64>, FeatureError> {
        self.names.iter().map(|name| features.require(name)).collect()
    }

    /// True when `names` lists exactly this schema's columns in order.
    pub fn matches<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.len() == self.names.len()
            && names
                .iter()
                .zip(self.names)
                .all(|(a, b)| a.as_ref() == *b)
    }
}

/// Full dataset header: timestamp, features in record order, label.
pub fn dataset_header() -> Vec<&'static str> {
    let mut header = Vec::with_capacity(FEATURE_NAMES.len() + 2);
    header.push(TIMESTAMP_COLUMN);
    header.extend(FEATURE_NAMES);
    header.push(LABEL_COLUMN);
    header
}
