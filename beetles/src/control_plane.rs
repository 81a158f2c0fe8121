//! Control plane: turning a step into a paced batch of work orders.
//!
//! # High-level flow
//! 1. Partition the step's volume into slots bounded by the concurrency ceiling
//!    (see [`crate::partition`]). Invalid input fails here, before any journey
//!    is generated.
//! 2. Ask the [`StoryTeller`] for one batch of journeys per slot. Batches are
//!    generated concurrently and reassembled in slot order, since slot `i`
//!    stands for the `i`-th sub-window of the step.
//! 3. Hand the ordered work orders, the step duration and the cancel signal to
//!    the [`Publisher`].
//!
//! Any story teller failure fails the whole step; nothing is published for it.
use std::time::Duration;

use futures::future::try_join_all;
use typed_builder::TypedBuilder;

use crate::{
    error::Error,
    journey::StoryTeller,
    partition::{DEFAULT_SLICE, partition},
    publisher::{PublishOutcome, Publisher},
    step::Step,
    work_order::WorkOrder,
};

/// Anything that can put a step's worth of load on the fleet.
///
/// [`ControlPlane`] is the real implementation; [`crate::LoadTest`] drives any
/// implementor through a sequence of stages.
pub trait LoadControl: Send + Sync {
    fn set_load(&self, step: &Step) -> impl Future<Output = Result<PublishOutcome, Error>> + Send;
}

/// Partitions steps, generates their journeys and publishes the work orders.
///
/// - `concurrency_ceiling`: how many worker invocations may be warm at once;
///   no slot ever carries more requests than this.
/// - `slice`: temporal length of one slot. Defaults to [`DEFAULT_SLICE`].
/// - `story_teller`: source of journeys.
/// - `publisher`: ships the batch, usually a [`crate::PacedPublisher`].
#[derive(TypedBuilder)]
pub struct ControlPlane<S, P> {
    pub concurrency_ceiling: usize,
    #[builder(default = DEFAULT_SLICE)]
    pub slice: Duration,
    pub story_teller: S,
    pub publisher: P,
}

impl<S, P> ControlPlane<S, P>
where
    S: StoryTeller,
    P: Publisher<S::Journey>,
{
    /// Dispatch one step: partition, generate, publish.
    #[tracing::instrument(
        name = "set_load",
        skip_all,
        fields(
            rate = step.target_rate,
            duration = ?step.duration,
            ceiling = self.concurrency_ceiling,
        )
    )]
    pub async fn dispatch(&self, step: &Step) -> Result<PublishOutcome, Error> {
        let counts = partition(
            self.concurrency_ceiling,
            step.target_rate,
            step.duration,
            self.slice,
        )?;
        tracing::debug!("Partitioned step into {} slots: {counts:?}", counts.len());

        let orders = tokio::select! {
            biased;
            _ = step.cancel.cancelled() => None,
            orders = self.work_orders(&counts, step.duration) => Some(orders?),
        };
        let Some(orders) = orders.filter(|_| !step.cancel.is_cancelled()) else {
            tracing::info!("Step cancelled before publishing.");
            return Ok(PublishOutcome::Cancelled { published: 0 });
        };

        self.publisher
            .publish(orders, step.duration, &step.cancel)
            .await
    }

    async fn work_orders(
        &self,
        counts: &[usize],
        duration: Duration,
    ) -> Result<Vec<WorkOrder<S::Journey>>, Error> {
        let batches = counts
            .iter()
            .copied()
            .enumerate()
            .map(move |(slot, count)| async move {
                let journeys = self
                    .story_teller
                    .tell(count)
                    .await
                    .map_err(|source| Error::Workload { slot, source })?;

                if journeys.len() != count {
                    return Err(Error::Workload {
                        slot,
                        source: format!(
                            "asked for {count} journeys, story teller returned {}",
                            journeys.len()
                        )
                        .into(),
                    });
                }
                Ok(WorkOrder::new(journeys, duration))
            });

        // try_join_all keeps input order and bails on the first error
        try_join_all(batches).await
    }
}

impl<S, P> LoadControl for ControlPlane<S, P>
where
    S: StoryTeller,
    P: Publisher<S::Journey>,
{
    fn set_load(&self, step: &Step) -> impl Future<Output = Result<PublishOutcome, Error>> + Send {
        self.dispatch(step)
    }
}
