//! Simulated accelerometer.
//!
//! Stands in for a hardware driver so the sampler, feature pipeline and CLI
//! can run on any machine. Output is deterministic for a given seed: gravity
//! on the z axis, a little quantisation noise, and for the vibration profile
//! a 25 Hz oscillation on all three axes.

use crate::sensor::{GRange, MotionSensor, SampleRate, SensorError, Vector3};
use std::f64::consts::TAU;
use std::str::FromStr;

/// Counts per g in full-resolution mode.
const COUNTS_PER_G: f64 = 256.0;

/// Frequency of the simulated mechanical vibration.
const VIBRATION_HZ: f64 = 25.0;

/// Per-axis vibration amplitude in counts.
const VIBRATION_AMPLITUDE: [f64; 3] = [60.0, 35.0, 45.0];

/// What the simulated device is mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// At rest: gravity plus noise.
    Idle,
    /// Mounted on a vibrating machine.
    Vibration,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(Profile::Idle),
            "vibration" => Ok(Profile::Vibration),
            other => Err(format!("unknown profile '{other}' (expected idle or vibration)")),
        }
    }
}

/// A sensor that synthesises readings instead of talking to a bus.
#[derive(Debug)]
pub struct SimulatedSensor {
    profile: Profile,
    rate: SampleRate,
    range: GRange,
    rng_state: u64,
    reads: u64,
    fail_after: Option<u64>,
    closed: bool,
}

impl SimulatedSensor {
    /// Create a simulated sensor at the default 200 Hz, ±4 g.
    pub fn new(profile: Profile) -> Self {
        Self::with_seed(profile, 0x5eed)
    }

    /// Create a simulated sensor with an explicit noise seed.
    pub fn with_seed(profile: Profile, seed: u64) -> Self {
        Self {
            profile,
            rate: SampleRate::Hz200,
            range: GRange::G4,
            rng_state: seed,
            reads: 0,
            fail_after: None,
            closed: false,
        }
    }

    /// Make every read after the first `reads` fail with a communication error.
    pub fn failing_after(mut self, reads: u64) -> Self {
        self.fail_after = Some(reads);
        self
    }

    /// Number of successful reads so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn profile(&self) -> Profile {
        self.profile
    }

    fn noise(&mut self) -> f64 {
        self.rng_state = self
            .rng_state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.rng_state >> 33) % 5) as f64 - 2.0
    }

    fn axis(&mut self, index: usize, gravity: f64, t: f64) -> i16 {
        let mut value = gravity + self.noise();
        if self.profile == Profile::Vibration {
            let phase = index as f64 * 0.7;
            value += VIBRATION_AMPLITUDE[index] * (TAU * VIBRATION_HZ * t + phase).sin();
        }

        let limit = COUNTS_PER_G * self.range.g() as f64;
        value.round().clamp(-limit, limit - 1.0) as i16
    }
}

impl MotionSensor for SimulatedSensor {
    fn configure(&mut self, rate: SampleRate, range: GRange) -> Result<(), SensorError> {
        if self.closed {
            return Err(SensorError::Communication("sensor is closed".to_string()));
        }
        self.rate = rate;
        self.range = range;
        Ok(())
    }

    fn read_vector(&mut self) -> Result<Vector3, SensorError> {
        if self.closed {
            return Err(SensorError::Communication("sensor is closed".to_string()));
        }
        if let Some(limit) = self.fail_after {
            if self.reads >= limit {
                return Err(SensorError::Communication(format!(
                    "simulated bus fault after {limit} reads"
                )));
            }
        }

        // Device time, independent of how fast the host polls.
        let t = self.reads as f64 / self.rate.hz() as f64;
        let vector = Vector3 {
            x: self.axis(0, 0.0, t),
            y: self.axis(1, 0.0, t),
            z: self.axis(2, COUNTS_PER_G, t),
        };

        self.reads += 1;
        Ok(vector)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
