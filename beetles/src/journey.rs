use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;

use crate::error::BoxError;

/// A workload descriptor: one scripted piece of synthetic traffic.
///
/// The control plane never looks inside a journey. It only asks a
/// [`StoryTeller`] for a batch of them, packs the batch into a
/// [`crate::WorkOrder`] and ships it; a worker later hands each one to a
/// [`JourneyWalker`]. Journeys must therefore be serializable so they survive
/// the trip through whatever transport sits in between.
///
/// ## Example
/// ```rust
/// use beetles::{Journey, macros::journey};
///
/// #[journey]
/// struct Checkout {
///     sku: String,
///     quantity: u32,
/// }
/// ```
pub trait Journey
where
    Self: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static,
{
}

/// Produces batches of journeys. Runs on the control plane side.
///
/// Must return exactly `count` journeys; their content may differ between
/// calls. Any `Fn(usize) -> impl Future<Output = Result<Vec<J>, BoxError>>`
/// closure is a story teller.
pub trait StoryTeller: Send + Sync {
    type Journey: Journey;

    fn tell(
        &self,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Self::Journey>, BoxError>> + Send;
}

impl<F, Fut, J> StoryTeller for F
where
    F: Fn(usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<J>, BoxError>> + Send,
    J: Journey,
{
    type Journey = J;

    fn tell(&self, count: usize) -> impl Future<Output = Result<Vec<J>, BoxError>> + Send {
        self(count)
    }
}

/// Executes a single journey. Runs on the worker side and is never called by
/// the control plane itself.
pub trait JourneyWalker<J: Journey>: Send + Sync {
    type Output: Send;

    fn walk(&self, journey: J) -> impl Future<Output = Self::Output> + Send;
}

impl<J, F, Fut> JourneyWalker<J> for F
where
    J: Journey,
    F: Fn(J) -> Fut + Send + Sync,
    Fut: Future + Send,
    Fut::Output: Send,
{
    type Output = Fut::Output;

    fn walk(&self, journey: J) -> impl Future<Output = Self::Output> + Send {
        self(journey)
    }
}
