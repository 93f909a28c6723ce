//! Monotonic time source and sleep primitive used by the samplers.
//!
//! Pacing code never touches `Instant` or `thread::sleep` directly, so tests
//! can drive it with a [`ManualClock`] and simulate jitter or overruns
//! without real delays.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

/// A monotonic clock that can also suspend the caller.
pub trait Clock {
    /// Seconds since an arbitrary, fixed origin. Never decreases.
    fn now(&mut self) -> f64;

    /// Suspend the caller for `secs` seconds. Only called with positive values.
    fn sleep(&mut self, secs: f64);
}

/// Wall-clock implementation backed by `Instant` and `thread::sleep`.
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&mut self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }

    fn sleep(&mut self, secs: f64) {
        match Duration::try_from_secs_f64(secs) {
            Ok(duration) => thread::sleep(duration),
            Err(e) => tracing::warn!(secs, "skipping sleep: {e}"),
        }
    }
}

/// Deterministic clock that only moves when told to.
///
/// Clones share the same time line, so a test sensor holding one clone can
/// advance time (simulating a slow read) while the sampler holds another.
/// Every sleep is recorded and advances time by exactly the requested amount.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    sleeps: Rc<RefCell<Vec<f64>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the time line at `secs` instead of zero.
    pub fn starting_at(secs: f64) -> Self {
        let clock = Self::default();
        clock.now.set(secs);
        clock
    }

    /// Move time forward without recording a sleep.
    pub fn advance(&self, secs: f64) {
        self.now.set(self.now.get() + secs);
    }

    /// Current time without requiring a mutable handle.
    pub fn peek(&self) -> f64 {
        self.now.get()
    }

    /// Every sleep requested so far, in order.
    pub fn sleeps(&self) -> Vec<f64> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for ManualClock {
    fn now(&mut self) -> f64 {
        self.now.get()
    }

    fn sleep(&mut self, secs: f64) {
        self.sleeps.borrow_mut().push(secs);
        self.advance(secs);
    }
}
