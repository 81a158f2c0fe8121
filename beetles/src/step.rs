use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cancel::CancelSignal;

/// A stage describes one held-rate phase of a load test.
///
/// Use `Stage::new(Duration::from_secs(60), 100.0)` to hold 100 RPS for a minute.
/// Unlike a ramp, the rate is held flat for the whole duration; ramps are
/// expressed as a series of short stages.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub duration: Duration,
    /// Requests per second
    pub target: f64,
}

impl Stage {
    pub fn new(duration: Duration, target: f64) -> Self {
        Self { duration, target }
    }

    /// Whether this stage would dispatch anything at all.
    pub fn is_empty(&self) -> bool {
        self.duration.is_zero() || self.target.is_nan() || self.target <= 0.0
    }

    /// Bind the stage to a cancel signal, ready for dispatch.
    pub fn into_step(self, cancel: CancelSignal) -> Step {
        Step {
            target_rate: self.target,
            duration: self.duration,
            cancel,
        }
    }
}

/// One stage as handed to a control plane: the rate, how long to hold it, and
/// the signal that aborts it.
#[derive(Clone, Debug)]
pub struct Step {
    /// Requests per second
    pub target_rate: f64,
    pub duration: Duration,
    pub cancel: CancelSignal,
}

impl Step {
    pub fn new(target_rate: f64, duration: Duration, cancel: CancelSignal) -> Self {
        Self {
            target_rate,
            duration,
            cancel,
        }
    }
}
