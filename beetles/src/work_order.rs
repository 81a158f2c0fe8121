use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{error::Error, journey::Journey};

/// The unit dispatched to one worker invocation: how many requests to issue,
/// the journeys describing them, and the step duration they belong to.
///
/// `request_count == journeys.len()` always holds for orders built by
/// [`crate::ControlPlane`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "J: Journey")]
pub struct WorkOrder<J> {
    pub request_count: usize,
    pub journeys: Vec<J>,
    pub duration: Duration,
}

impl<J: Journey> WorkOrder<J> {
    pub fn new(journeys: Vec<J>, duration: Duration) -> Self {
        Self {
            request_count: journeys.len(),
            journeys,
            duration,
        }
    }

    /// Message body for transports that carry text.
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}
