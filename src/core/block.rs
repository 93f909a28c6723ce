//! Fixed-length analysis windows.

use crate::sensor::{Sample, Vector3};
use serde::{Deserialize, Serialize};

/// An ordered run of samples treated as one analysis window.
///
/// Index 0 is the earliest sample. Samplers only ever hand out complete
/// blocks; constructing one by hand (for tests or replayed data) is allowed
/// with any length, including zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Block {
    samples: Vec<Sample>,
}

impl Block {
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Build an untimestamped block from raw readings.
    pub fn from_vectors<I, V>(vectors: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Vector3>,
    {
        Self {
            samples: vectors
                .into_iter()
                .map(|v| Sample::new(v.into()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over the raw readings in acquisition order.
    pub fn vectors(&self) -> impl Iterator<Item = Vector3> + '_ {
        self.samples.iter().map(|s| s.vector)
    }
}
