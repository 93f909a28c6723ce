//! Reading and configuration types for the motion sensor.
//!
//! Axis values are raw signed counts exactly as the device reports them.
//! Conversion to physical units is left to consumers.

use crate::sensor::SensorError;
use serde::{Deserialize, Serialize};

/// One raw 3-axis reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vector3 {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl Vector3 {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the reading.
    pub fn magnitude(&self) -> f64 {
        let (x, y, z) = (self.x as f64, self.y as f64, self.z as f64);
        (x * x + y * y + z * z).sqrt()
    }
}

impl From<(i16, i16, i16)> for Vector3 {
    fn from((x, y, z): (i16, i16, i16)) -> Self {
        Self { x, y, z }
    }
}

/// A reading, optionally stamped with the monotonic time it was taken at.
///
/// Samples are immutable once produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub vector: Vector3,
    /// Monotonic clock value in seconds, when the producer recorded one.
    pub timestamp: Option<f64>,
}

impl Sample {
    pub fn new(vector: Vector3) -> Self {
        Self {
            vector,
            timestamp: None,
        }
    }

    pub fn timestamped(vector: Vector3, timestamp: f64) -> Self {
        Self {
            vector,
            timestamp: Some(timestamp),
        }
    }
}

/// Output data rates the sensor can be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRate {
    Hz100,
    Hz200,
    Hz400,
}

impl SampleRate {
    pub const SUPPORTED: [SampleRate; 3] = [SampleRate::Hz100, SampleRate::Hz200, SampleRate::Hz400];

    /// Parse a rate in Hz, failing for anything outside the supported set.
    pub fn from_hz(hz: u32) -> Result<Self, SensorError> {
        Self::SUPPORTED
            .into_iter()
            .find(|rate| rate.hz() == hz)
            .ok_or_else(|| {
                SensorError::UnsupportedConfiguration(format!(
                    "sample rate {hz} Hz (supported: 100, 200, 400)"
                ))
            })
    }

    pub fn hz(&self) -> u32 {
        match self {
            SampleRate::Hz100 => 100,
            SampleRate::Hz200 => 200,
            SampleRate::Hz400 => 400,
        }
    }

    /// Nominal sampling period in seconds.
    pub fn period_secs(&self) -> f64 {
        1.0 / self.hz() as f64
    }
}

/// Full-scale measurement ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GRange {
    G2,
    G4,
    G8,
    G16,
}

impl GRange {
    pub const SUPPORTED: [GRange; 4] = [GRange::G2, GRange::G4, GRange::G8, GRange::G16];

    /// Parse a range in g, failing for anything outside the supported set.
    pub fn from_g(g: u8) -> Result<Self, SensorError> {
        Self::SUPPORTED
            .into_iter()
            .find(|range| range.g() == g)
            .ok_or_else(|| {
                SensorError::UnsupportedConfiguration(format!(
                    "range ±{g} g (supported: 2, 4, 8, 16)"
                ))
            })
    }

    pub fn g(&self) -> u8 {
        match self {
            GRange::G2 => 2,
            GRange::G4 => 4,
            GRange::G8 => 8,
            GRange::G16 => 16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_magnitude() {
        assert_eq!(Vector3::new(3, 4, 0).magnitude(), 5.0);
        assert_eq!(Vector3::new(-1, 2, -2).magnitude(), 3.0);
    }

    #[test]
    fn test_sample_rate_parsing() {
        assert_eq!(SampleRate::from_hz(200).unwrap(), SampleRate::Hz200);
        assert_eq!(SampleRate::from_hz(400).unwrap().hz(), 400);

        let err = SampleRate::from_hz(250).unwrap_err();
        assert!(matches!(err, SensorError::UnsupportedConfiguration(_)));
    }

    #[test]
    fn test_range_parsing() {
        assert_eq!(GRange::from_g(4).unwrap(), GRange::G4);
        assert!(matches!(
            GRange::from_g(3),
            Err(SensorError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_timestamped_sample() {
        let sample = Sample::timestamped(Vector3::new(1, 2, 3), 0.5);
        assert_eq!(sample.timestamp, Some(0.5));
        assert_eq!(Sample::new(Vector3::default()).timestamp, None);
    }
}
