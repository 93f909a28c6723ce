//! Deadline-accumulation pacing shared by both samplers.
//!
//! The target time advances by a fixed period on every tick instead of
//! sleeping a relative amount, so sleep-call overhead does not add up into
//! drift. A tick that finds its deadline already passed proceeds at once:
//! the deadline is never reset, no sample is skipped and no sleep is ever
//! negative.

use crate::core::clock::Clock;
use crate::sensor::SensorError;
use std::time::Duration;

/// Reject rates that cannot define a period a sleep can honour.
pub(crate) fn validate_rate(fs_hz: f64) -> Result<(), SensorError> {
    if !fs_hz.is_finite() || fs_hz <= 0.0 {
        return Err(SensorError::UnsupportedConfiguration(format!(
            "sampling rate must be a positive number of Hz, got {fs_hz}"
        )));
    }
    if Duration::try_from_secs_f64(1.0 / fs_hz).is_err() {
        return Err(SensorError::UnsupportedConfiguration(format!(
            "sampling rate {fs_hz} Hz gives a period longer than a sleep can express"
        )));
    }
    Ok(())
}

/// Reject sampler shapes that can never produce a block.
pub(crate) fn validate(fs_hz: f64, samples: usize) -> Result<(), SensorError> {
    validate_rate(fs_hz)?;
    if samples == 0 {
        return Err(SensorError::UnsupportedConfiguration(
            "block size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug)]
pub(crate) struct Pacer {
    period: f64,
    next_deadline: f64,
}

impl Pacer {
    /// Anchor the schedule at the clock's current time.
    pub(crate) fn start<C: Clock>(period: f64, clock: &mut C) -> Self {
        Self {
            period,
            next_deadline: clock.now(),
        }
    }

    /// Advance the deadline by one period and sleep until it.
    ///
    /// Returns how far past the deadline the caller already was when there
    /// was no time left to sleep.
    pub(crate) fn wait<C: Clock>(&mut self, clock: &mut C) -> Option<f64> {
        self.next_deadline += self.period;
        let remaining = self.next_deadline - clock.now();
        if remaining > 0.0 {
            clock.sleep(remaining);
            None
        } else {
            Some(-remaining)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;

    #[test]
    fn test_validate() {
        assert!(validate(200.0, 256).is_ok());
        assert!(validate(0.0, 256).is_err());
        assert!(validate(f64::NAN, 256).is_err());
        assert!(validate(200.0, 0).is_err());
    }

    #[test]
    fn test_validate_rejects_unrepresentable_period() {
        assert!(matches!(
            validate_rate(1e-20),
            Err(SensorError::UnsupportedConfiguration(_))
        ));
        assert!(validate_rate(f64::MIN_POSITIVE).is_err());
        assert!(validate_rate(0.001).is_ok());
    }

    #[test]
    fn test_wait_sleeps_until_deadline() {
        let mut clock = ManualClock::new();
        let mut pacer = Pacer::start(0.25, &mut clock);

        clock.advance(0.125);
        assert_eq!(pacer.wait(&mut clock), None);
        assert_eq!(clock.sleeps(), vec![0.125]);
        assert_eq!(clock.peek(), 0.25);
    }

    #[test]
    fn test_wait_reports_lag_without_sleeping() {
        let mut clock = ManualClock::new();
        let mut pacer = Pacer::start(0.25, &mut clock);

        clock.advance(0.5);
        assert_eq!(pacer.wait(&mut clock), Some(0.25));
        assert!(clock.sleeps().is_empty());
    }
}
