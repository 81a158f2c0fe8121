//! Drift-corrected pacing.
//!
//! A naive pacing loop (`act(); sleep(interval)`) runs every cycle for
//! `interval + latency(act)` and the achieved rate sinks the longer the test
//! runs. [`IntervalScheduler`] instead keeps a reference instant and moves it
//! forward by exactly one interval per [`wait_for`](IntervalScheduler::wait_for):
//!
//! ```text
//! deadline  = reference + interval
//! reference = deadline
//! sleep_until(deadline)            // returns at once if already past
//! ```
//!
//! The action latency is absorbed by the next wait, and a cycle that overran
//! is made up by the following ones returning immediately. After `k` waits the
//! loop has spent `k * interval` since [`start`](IntervalScheduler::start),
//! give or take the latency of the last action.
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::{cancel::CancelSignal, error::Cancelled};

/// Pacing state for one loop. Not meant to be shared between loops.
#[derive(Debug)]
pub struct IntervalScheduler {
    reference: Instant,
}

impl Default for IntervalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl IntervalScheduler {
    /// A scheduler already started at the current instant.
    pub fn new() -> Self {
        Self {
            reference: Instant::now(),
        }
    }

    /// Reset the reference point to now. Call once when a pacing loop begins.
    pub fn start(&mut self) {
        self.reference = Instant::now();
    }

    /// Suspend until one `interval` past the reference point, then advance the
    /// reference by `interval`.
    ///
    /// Returns immediately if that point is already behind us. Returns
    /// `Err(Cancelled)` if `cancel` fires first; the caller must stop its loop.
    pub async fn wait_for(
        &mut self,
        interval: Duration,
        cancel: &CancelSignal,
    ) -> Result<(), Cancelled> {
        let deadline = self.reference + interval;
        self.reference = deadline;

        if cancel.is_cancelled() {
            return Err(Cancelled);
        }
        if Instant::now() >= deadline {
            return Ok(());
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Cancelled),
            _ = sleep_until(deadline) => Ok(()),
        }
    }
}
