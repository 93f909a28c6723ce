//! Labelled feature records, the unit persisted to datasets.

use crate::core::features::{FeatureError, FeatureVector};
use crate::core::schema::FeatureSchema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Class of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Idle,
    Vibration,
}

impl Label {
    /// Integer class id used in datasets and by the classifier.
    pub fn id(&self) -> u8 {
        match self {
            Label::Idle => 0,
            Label::Vibration => 1,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Label::Idle),
            1 => Some(Label::Vibration),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Idle => write!(f, "IDLE"),
            Label::Vibration => write!(f, "VIBRATION"),
        }
    }
}

/// One dataset row: when the block finished, its features, and its class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub timestamp: DateTime<Utc>,
    pub features: FeatureVector,
    pub label: Label,
}

impl FeatureRecord {
    /// Stamp `features` with the current wall-clock time.
    pub fn new(features: FeatureVector, label: Label) -> Self {
        Self {
            timestamp: Utc::now(),
            features,
            label,
        }
    }

    /// Unix time in fractional seconds.
    pub fn unix_seconds(&self) -> f64 {
        self.timestamp.timestamp_micros() as f64 / 1_000_000.0
    }

    /// Render the record as dataset cells: timestamp, features, label.
    pub fn to_row(&self) -> Result<Vec<String>, FeatureError> {
        let values = FeatureSchema::record().row(&self.features)?;

        let mut row = Vec::with_capacity(values.len() + 2);
        row.push(format!("{:.6}", self.unix_seconds()));
        row.extend(values.iter().map(|v| v.to_string()));
        row.push(self.label.id().to_string());
        Ok(row)
    }
}
