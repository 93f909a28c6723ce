//! Motion sensor capability.
//!
//! The pipeline depends only on the [`MotionSensor`] trait: configure the
//! device, read one vector at a time, and release it. Register maps and bus
//! transactions live behind implementations of this trait.

pub mod simulated;
pub mod types;

use thiserror::Error;

// Re-export commonly used types
pub use simulated::{Profile, SimulatedSensor};
pub use types::{GRange, Sample, SampleRate, Vector3};

/// Errors raised by a sensor or by sampler configuration.
#[derive(Debug, Error)]
pub enum SensorError {
    /// A requested rate, range or block shape is outside the supported set.
    #[error("Unsupported configuration: {0}")]
    UnsupportedConfiguration(String),

    /// The device could not be read or written.
    #[error("Sensor communication error: {0}")]
    Communication(String),
}

/// A 3-axis motion sensor.
///
/// Implementations are owned exclusively by one sampler at a time; none of
/// the methods are expected to be called concurrently.
pub trait MotionSensor {
    /// Switch the device to the given output rate and measurement range.
    fn configure(&mut self, rate: SampleRate, range: GRange) -> Result<(), SensorError>;

    /// Block until one reading is available and return it.
    fn read_vector(&mut self) -> Result<Vector3, SensorError>;

    /// Release the underlying device. Calling this more than once is a no-op.
    fn close(&mut self);
}

impl<S: MotionSensor + ?Sized> MotionSensor for Box<S> {
    fn configure(&mut self, rate: SampleRate, range: GRange) -> Result<(), SensorError> {
        (**self).configure(rate, range)
    }

    fn read_vector(&mut self) -> Result<Vector3, SensorError> {
        (**self).read_vector()
    }

    fn close(&mut self) {
        (**self).close()
    }
}
