//! Publishing: getting work orders to the workers, paced over the step.
//!
//! Two seams live here:
//! - [`Transport`]: ships one work order somewhere (a pub/sub topic, a queue,
//!   a direct invocation). Transports are built up front and shared by every
//!   step of a test, so they must be safe for concurrent use.
//! - [`Publisher`]: ships a whole step's batch. [`PacedPublisher`] is the
//!   default; anything that needs retries, batching or fan-out can replace it
//!   without touching [`crate::ControlPlane`].
//!
//! # Pacing
//! A batch of `n` orders for a step lasting `d` is spread as one publish every
//! `d / n`, driven by an [`IntervalScheduler`] so the latency of each publish
//! call is absorbed instead of accumulated:
//!
//! ```text
//! t = 0        publish #0, wait_for(d/n)
//! t = d/n      publish #1, wait_for(d/n)
//! ...
//! t = (n-1)d/n publish #n-1, wait_for(d/n)
//! t = d        done
//! ```
//!
//! Publish failures are not retried: the first one aborts the loop, since
//! silently skipping an order would under-deliver the requested rate.
use std::{sync::Arc, time::Duration};

use tokio::{sync::mpsc, time::Instant};

use crate::{
    cancel::CancelSignal,
    error::{BoxError, Error},
    journey::Journey,
    scheduler::IntervalScheduler,
    work_order::WorkOrder,
};

/// Ships a single work order to the worker fleet.
pub trait Transport<J: Journey>: Send + Sync {
    fn publish(&self, order: WorkOrder<J>) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<J: Journey, T: Transport<J>> Transport<J> for Arc<T> {
    fn publish(&self, order: WorkOrder<J>) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).publish(order)
    }
}

/// How a publish run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Every order went out.
    Completed { published: usize, elapsed: Duration },
    /// The cancel signal fired; `published` orders had already gone out and
    /// stay out.
    Cancelled { published: usize },
}

impl PublishOutcome {
    pub fn published(&self) -> usize {
        match self {
            Self::Completed { published, .. } | Self::Cancelled { published } => *published,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Ships the full, ordered batch of one step.
pub trait Publisher<J: Journey>: Send + Sync {
    /// Publish `orders` in order over `step_duration`, stopping early if
    /// `cancel` fires.
    fn publish(
        &self,
        orders: Vec<WorkOrder<J>>,
        step_duration: Duration,
        cancel: &CancelSignal,
    ) -> impl Future<Output = Result<PublishOutcome, Error>> + Send;
}

/// Default [`Publisher`]: one order every `step_duration / orders.len()`.
#[derive(Clone, Debug)]
pub struct PacedPublisher<T> {
    transport: T,
}

impl<T> PacedPublisher<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<J, T> Publisher<J> for PacedPublisher<T>
where
    J: Journey,
    T: Transport<J>,
{
    async fn publish(
        &self,
        orders: Vec<WorkOrder<J>>,
        step_duration: Duration,
        cancel: &CancelSignal,
    ) -> Result<PublishOutcome, Error> {
        let requested = orders.len();
        if requested == 0 {
            tracing::debug!("Nothing to publish for this step.");
            return Ok(PublishOutcome::Completed {
                published: 0,
                elapsed: Duration::ZERO,
            });
        }

        let interval = step_duration.div_f64(requested as f64);
        tracing::debug!("Publishing {requested} work orders, one every {interval:?}");

        let begin = Instant::now();
        let mut scheduler = IntervalScheduler::new();

        for (index, order) in orders.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Ok(cancelled(index, requested));
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Ok(cancelled(index, requested));
                }
                res = self.transport.publish(order) => {
                    res.map_err(|source| Error::Transport { index, source })?;
                }
            }
            tracing::debug!("Published work order {index}.");

            if scheduler.wait_for(interval, cancel).await.is_err() {
                return Ok(cancelled(index + 1, requested));
            }
        }

        let elapsed = begin.elapsed();
        tracing::info!(
            requested,
            ?elapsed,
            "Requested {requested} invocations in {elapsed:?}"
        );
        Ok(PublishOutcome::Completed {
            published: requested,
            elapsed,
        })
    }
}

fn cancelled(published: usize, requested: usize) -> PublishOutcome {
    tracing::info!("Step cancelled after publishing {published} of {requested} work orders.");
    PublishOutcome::Cancelled { published }
}

/// In-process [`Transport`] over a bounded `tokio::sync::mpsc` channel.
///
/// Workers (or tests) consume orders from the receiver returned by
/// [`ChannelTransport::new`]. A full channel applies back-pressure to the
/// publish loop; a dropped receiver makes every publish fail.
#[derive(Debug)]
pub struct ChannelTransport<J> {
    tx: mpsc::Sender<WorkOrder<J>>,
}

impl<J> Clone for ChannelTransport<J> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<J: Journey> ChannelTransport<J> {
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<WorkOrder<J>>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

impl<J: Journey> Transport<J> for ChannelTransport<J> {
    async fn publish(&self, order: WorkOrder<J>) -> Result<(), BoxError> {
        self.tx
            .send(order)
            .await
            .map_err(|_| "work order receiver dropped".into())
    }
}
