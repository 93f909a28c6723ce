//! Sampling-jitter measurement.
//!
//! [`TimingSampler`] runs the same deadline-paced loop as the block sampler
//! but stamps every read with the clock value taken just before the call.
//! The resulting [`TimingStats`] are a diagnostic: they show how far the
//! realised period wanders from the target on a non-real-time host, and
//! nothing downstream consumes them.

use crate::core::clock::{Clock, SystemClock};
use crate::core::pacing::{self, Pacer};
use crate::sensor::{MotionSensor, Sample, SensorError};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::fmt;
use thiserror::Error;

/// Errors from timing analysis.
#[derive(Debug, Error)]
pub enum TimingError {
    #[error("Insufficient samples: need at least 2 timestamps, got {0}")]
    InsufficientSamples(usize),
}

/// Per-read timestamps in acquisition order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimingRecord {
    timestamps: Vec<f64>,
}

impl TimingRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_timestamps(timestamps: Vec<f64>) -> Self {
        Self { timestamps }
    }

    pub fn push(&mut self, timestamp: f64) {
        self.timestamps.push(timestamp);
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    /// Differences between consecutive timestamps (one fewer than stamps).
    pub fn deltas(&self) -> Vec<f64> {
        self.timestamps
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .collect()
    }

    /// Summarise the realised periods against `target_period` seconds.
    pub fn stats(&self, target_period: f64) -> Result<TimingStats, TimingError> {
        if self.timestamps.len() < 2 {
            return Err(TimingError::InsufficientSamples(self.timestamps.len()));
        }

        let deltas = self.deltas();
        let max_error = deltas.iter().map(|d| d - target_period).abs_max();

        Ok(TimingStats {
            target_period_ms: target_period * 1000.0,
            mean_period_ms: deltas.iter().mean() * 1000.0,
            std_jitter_ms: deltas.iter().population_std_dev() * 1000.0,
            min_period_ms: Statistics::<f64>::min(deltas.iter()) * 1000.0,
            max_period_ms: Statistics::<f64>::max(deltas.iter()) * 1000.0,
            max_error_ms: max_error * 1000.0,
        })
    }
}

/// Realised sampling period statistics, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingStats {
    pub target_period_ms: f64,
    pub mean_period_ms: f64,
    /// Population standard deviation of the period.
    pub std_jitter_ms: f64,
    pub min_period_ms: f64,
    pub max_period_ms: f64,
    /// Largest absolute difference between any period and the target.
    pub max_error_ms: f64,
}

impl TimingStats {
    /// Metric names paired with their values, in a fixed order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            ("target_period_ms", self.target_period_ms),
            ("mean_period_ms", self.mean_period_ms),
            ("std_jitter_ms", self.std_jitter_ms),
            ("min_period_ms", self.min_period_ms),
            ("max_period_ms", self.max_period_ms),
            ("max_error_ms", self.max_error_ms),
        ]
    }
}

impl fmt::Display for TimingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.entries() {
            writeln!(f, "{name:<20}: {value:.4}")?;
        }
        Ok(())
    }
}

/// Paced sampler that records when each read happened.
pub struct TimingSampler<S: MotionSensor, C: Clock = SystemClock> {
    sensor: S,
    clock: C,
    target_hz: f64,
    period: f64,
    record: TimingRecord,
    samples: Vec<Sample>,
}

impl<S: MotionSensor> TimingSampler<S, SystemClock> {
    pub fn new(sensor: S, target_hz: f64) -> Result<Self, SensorError> {
        Self::with_clock(sensor, SystemClock::new(), target_hz)
    }
}

impl<S: MotionSensor, C: Clock> TimingSampler<S, C> {
    pub fn with_clock(sensor: S, clock: C, target_hz: f64) -> Result<Self, SensorError> {
        pacing::validate_rate(target_hz)?;
        Ok(Self {
            sensor,
            clock,
            target_hz,
            period: 1.0 / target_hz,
            record: TimingRecord::new(),
            samples: Vec::new(),
        })
    }

    /// Take `num_samples` paced reads, replacing any previous measurement.
    ///
    /// On a sensor error the reads completed so far stay available through
    /// [`record`](Self::record) and [`samples`](Self::samples).
    pub fn run(&mut self, num_samples: usize) -> Result<&TimingRecord, SensorError> {
        self.record.clear();
        self.samples.clear();
        self.samples.reserve(num_samples);

        let mut pacer = Pacer::start(self.period, &mut self.clock);

        for _ in 0..num_samples {
            let stamp = self.clock.now();
            let vector = self.sensor.read_vector()?;
            self.record.push(stamp);
            self.samples.push(Sample::timestamped(vector, stamp));

            pacer.wait(&mut self.clock);
        }

        tracing::debug!(samples = num_samples, target_hz = self.target_hz, "timing run complete");
        Ok(&self.record)
    }

    /// Statistics over the most recent run.
    pub fn timing_stats(&self) -> Result<TimingStats, TimingError> {
        self.record.stats(self.period)
    }

    pub fn record(&self) -> &TimingRecord {
        &self.record
    }

    /// Raw readings from the most recent run, for inspection only.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn target_hz(&self) -> f64 {
        self.target_hz
    }

    /// Release the sensor. Safe to call more than once.
    pub fn close(&mut self) {
        self.sensor.close();
    }
}

impl<S: MotionSensor, C: Clock> Drop for TimingSampler<S, C> {
    fn drop(&mut self) {
        self.sensor.close();
    }
}
