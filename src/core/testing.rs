//! Test doubles shared by the sampler unit tests.

use crate::core::clock::ManualClock;
use crate::sensor::{GRange, MotionSensor, SampleRate, SensorError, Vector3};
use std::cell::Cell;
use std::rc::Rc;

/// Sensor returning `(i, -i, 1)` for the i-th read, where each read costs a
/// scripted amount of (manual) time.
pub(crate) struct ScriptedSensor {
    clock: ManualClock,
    read_costs: Vec<f64>,
    reads: usize,
    fail_at: Option<usize>,
    closes: Rc<Cell<u32>>,
}

impl ScriptedSensor {
    pub(crate) fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            read_costs: Vec::new(),
            reads: 0,
            fail_at: None,
            closes: Rc::new(Cell::new(0)),
        }
    }

    /// Cost in seconds of each read, by index. Reads past the end are free.
    pub(crate) fn with_read_costs(mut self, costs: Vec<f64>) -> Self {
        self.read_costs = costs;
        self
    }

    /// Fail the read with this zero-based index.
    pub(crate) fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Shared counter of `close()` calls, readable after the sensor moves.
    pub(crate) fn close_counter(&self) -> Rc<Cell<u32>> {
        self.closes.clone()
    }
}

impl MotionSensor for ScriptedSensor {
    fn configure(&mut self, _rate: SampleRate, _range: GRange) -> Result<(), SensorError> {
        Ok(())
    }

    fn read_vector(&mut self) -> Result<Vector3, SensorError> {
        if self.fail_at == Some(self.reads) {
            return Err(SensorError::Communication(format!(
                "scripted failure at read {}",
                self.reads
            )));
        }

        let cost = self.read_costs.get(self.reads).copied().unwrap_or(0.0);
        self.clock.advance(cost);

        let i = self.reads as i16;
        self.reads += 1;
        Ok(Vector3::new(i, -i, 1))
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }
}
