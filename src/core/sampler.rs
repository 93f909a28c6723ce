//! Fixed-rate block acquisition.
//!
//! [`BlockSampler`] reads exactly `block_size` vectors from its sensor per
//! call, paced against a [`Clock`] at a target rate. A block is either
//! returned complete or not at all.

use crate::core::block::Block;
use crate::core::clock::{Clock, SystemClock};
use crate::core::pacing::{self, Pacer};
use crate::sensor::{MotionSensor, Sample, SensorError};

/// Acquires blocks of readings at a fixed target rate.
///
/// The sampler owns its sensor exclusively and closes it when dropped.
pub struct BlockSampler<S: MotionSensor, C: Clock = SystemClock> {
    sensor: S,
    clock: C,
    fs_hz: f64,
    period: f64,
    block_size: usize,
    overruns: u64,
}

impl<S: MotionSensor> BlockSampler<S, SystemClock> {
    /// Create a sampler paced by the system clock.
    pub fn new(sensor: S, fs_hz: f64, block_size: usize) -> Result<Self, SensorError> {
        Self::with_clock(sensor, SystemClock::new(), fs_hz, block_size)
    }
}

impl<S: MotionSensor, C: Clock> BlockSampler<S, C> {
    /// Create a sampler paced by an explicit clock.
    ///
    /// Fails with `UnsupportedConfiguration` for a zero block size or a rate
    /// that is not a positive, finite number.
    pub fn with_clock(
        sensor: S,
        clock: C,
        fs_hz: f64,
        block_size: usize,
    ) -> Result<Self, SensorError> {
        pacing::validate(fs_hz, block_size)?;
        Ok(Self {
            sensor,
            clock,
            fs_hz,
            period: 1.0 / fs_hz,
            block_size,
            overruns: 0,
        })
    }

    /// Read one full block.
    ///
    /// A sensor error aborts the block and is returned as-is; the samples
    /// read so far are discarded.
    pub fn acquire_block(&mut self) -> Result<Block, SensorError> {
        let mut samples = Vec::with_capacity(self.block_size);
        let mut pacer = Pacer::start(self.period, &mut self.clock);

        for index in 0..self.block_size {
            let vector = self.sensor.read_vector()?;
            samples.push(Sample::new(vector));

            if let Some(lag) = pacer.wait(&mut self.clock) {
                self.overruns += 1;
                tracing::debug!(index, lag_ms = lag * 1000.0, "sample overran its deadline");
            }
        }

        Ok(Block::from_samples(samples))
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn fs_hz(&self) -> f64 {
        self.fs_hz
    }

    /// Target period between reads, in seconds.
    pub fn period_secs(&self) -> f64 {
        self.period
    }

    /// Iterations so far that found no time left to sleep.
    pub fn overrun_count(&self) -> u64 {
        self.overruns
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    /// Release the sensor. Safe to call more than once.
    pub fn close(&mut self) {
        self.sensor.close();
    }
}

impl<S: MotionSensor, C: Clock> Drop for BlockSampler<S, C> {
    fn drop(&mut self) {
        self.sensor.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::testing::ScriptedSensor;
    use crate::sensor::{Profile, SimulatedSensor, Vector3};

    fn paced(
        sensor: ScriptedSensor,
        clock: &ManualClock,
        fs_hz: f64,
        block_size: usize,
    ) -> BlockSampler<ScriptedSensor, ManualClock> {
        BlockSampler::with_clock(sensor, clock.clone(), fs_hz, block_size).unwrap()
    }

    #[test]
    fn test_rate_too_slow_to_pace_is_rejected() {
        let clock = ManualClock::new();
        let result =
            BlockSampler::with_clock(ScriptedSensor::new(clock.clone()), clock, 1e-20, 1);
        assert!(matches!(
            result,
            Err(SensorError::UnsupportedConfiguration(_))
        ));

        let sampler = BlockSampler::new(SimulatedSensor::new(Profile::Idle), 1e-20, 1);
        assert!(sampler.is_err());
    }

    #[test]
    fn test_block_has_exact_size_in_order() {
        for n in [1usize, 2, 7, 64] {
            let clock = ManualClock::new();
            let mut sampler = paced(ScriptedSensor::new(clock.clone()), &clock, 128.0, n);

            let block = sampler.acquire_block().unwrap();
            assert_eq!(block.len(), n);
            for (i, v) in block.vectors().enumerate() {
                assert_eq!(v, Vector3::new(i as i16, -(i as i16), 1));
            }
        }
    }

    #[test]
    fn test_paces_at_fixed_period() {
        let clock = ManualClock::new();
        let mut sampler = paced(ScriptedSensor::new(clock.clone()), &clock, 4.0, 4);

        sampler.acquire_block().unwrap();
        assert_eq!(clock.sleeps(), vec![0.25; 4]);
        assert_eq!(clock.peek(), 1.0);
        assert_eq!(sampler.overrun_count(), 0);
    }

    #[test]
    fn test_read_cost_is_absorbed_by_deadline() {
        let clock = ManualClock::new();
        let sensor = ScriptedSensor::new(clock.clone()).with_read_costs(vec![0.0625; 4]);
        let mut sampler = paced(sensor, &clock, 4.0, 4);

        sampler.acquire_block().unwrap();
        // Each sleep shrinks by the read cost; the schedule itself does not drift.
        assert_eq!(clock.sleeps(), vec![0.1875; 4]);
        assert_eq!(clock.peek(), 1.0);
    }

    #[test]
    fn test_single_overrun_is_not_corrected() {
        let clock = ManualClock::new();
        let sensor =
            ScriptedSensor::new(clock.clone()).with_read_costs(vec![0.0, 0.625, 0.0, 0.0, 0.0]);
        let mut sampler = paced(sensor, &clock, 4.0, 5);

        let block = sampler.acquire_block().unwrap();
        assert_eq!(block.len(), 5);

        // Read 1 lands at 0.875 against deadlines 0.5 and 0.75: two
        // iterations proceed immediately, nothing is skipped or reset, and
        // pacing resumes against the original schedule at 1.0.
        assert_eq!(clock.sleeps(), vec![0.25, 0.125, 0.25]);
        assert_eq!(sampler.overrun_count(), 2);
        assert_eq!(clock.peek(), 1.25);
    }

    #[test]
    fn test_persistent_overrun_lag_is_permanent() {
        let clock = ManualClock::new();
        let sensor = ScriptedSensor::new(clock.clone()).with_read_costs(vec![0.5; 8]);
        let mut sampler = paced(sensor, &clock, 4.0, 8);

        sampler.acquire_block().unwrap();
        assert!(clock.sleeps().is_empty());
        assert_eq!(sampler.overrun_count(), 8);
        // Eight reads at 0.5 s each: the block takes twice its nominal length.
        assert_eq!(clock.peek(), 4.0);
    }

    #[test]
    fn test_sleeps_are_never_negative() {
        let clock = ManualClock::new();
        let costs = vec![0.0, 0.3, 0.01, 0.2, 0.0, 0.4, 0.0, 0.0, 0.05, 0.0];
        let sensor = ScriptedSensor::new(clock.clone()).with_read_costs(costs);
        let mut sampler = paced(sensor, &clock, 10.0, 10);

        sampler.acquire_block().unwrap();
        assert!(clock.sleeps().iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_read_error_propagates_without_partial_block() {
        let clock = ManualClock::new();
        let sensor = ScriptedSensor::new(clock.clone()).failing_at(3);
        let mut sampler = paced(sensor, &clock, 128.0, 8);

        match sampler.acquire_block() {
            Err(SensorError::Communication(msg)) => assert!(msg.contains("read 3")),
            other => panic!("expected communication error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_shape() {
        let clock = ManualClock::new();
        let result =
            BlockSampler::with_clock(ScriptedSensor::new(clock.clone()), clock.clone(), 200.0, 0);
        assert!(matches!(
            result,
            Err(SensorError::UnsupportedConfiguration(_))
        ));

        let result =
            BlockSampler::with_clock(ScriptedSensor::new(clock.clone()), clock.clone(), -1.0, 4);
        assert!(matches!(
            result,
            Err(SensorError::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_sensor_closed_on_drop() {
        let clock = ManualClock::new();
        let sensor = ScriptedSensor::new(clock.clone()).failing_at(0);
        let closes = sensor.close_counter();

        {
            let mut sampler = paced(sensor, &clock, 128.0, 4);
            assert!(sampler.acquire_block().is_err());
        }
        assert!(closes.get() >= 1);
    }
}
