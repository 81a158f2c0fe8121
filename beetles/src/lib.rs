//! Beetles: a control plane for distributed load generation.
//!
//! Beetles does not fire requests itself. It works out how to split a target
//! request rate across a fleet of bursty, concurrency-limited workers (think
//! serverless functions) and ships each worker a work order at the right
//! moment, so the fleet as a whole produces the requested load curve.
//!
//! # Architecture
//!
//! The main building blocks are:
//!
//! - [`partition()`]: splits a step's request volume into per-slot counts that
//!   never exceed the concurrency ceiling and always add up to the full volume.
//! - [`IntervalScheduler`]: drift-corrected pacing; publish latency is absorbed
//!   rather than accumulated over a long test.
//! - [`ControlPlane`]: the dispatch step. Partitions, asks the [`StoryTeller`]
//!   for journeys, builds [`WorkOrder`]s and hands them to a [`Publisher`].
//! - [`PacedPublisher`]: the default publisher, spreading a step's work orders
//!   evenly across the step over any [`Transport`].
//! - [`LoadTest`]: runs a list of [`Stage`]s one after another.
//!
//! Journeys (the workload descriptors) and their execution belong to the
//! user: implement [`StoryTeller`] on the control plane side and
//! [`JourneyWalker`] on the worker side, or just pass closures.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use beetles::{
//!     BoxError, CancelSignal, ChannelTransport, ControlPlane, Journey, LoadTest,
//!     PacedPublisher, Stage, macros::journey,
//! };
//!
//! #[journey]
//! struct Browse {
//!     page: usize,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Transports are built once, up front, and shared by every stage
//!     let (transport, mut orders) = ChannelTransport::new(64);
//!     tokio::spawn(async move {
//!         while let Some(order) = orders.recv().await {
//!             println!("worker got {} journeys", order.request_count);
//!         }
//!     });
//!
//!     let plane = ControlPlane::builder()
//!         .concurrency_ceiling(100)
//!         .slice(Duration::from_millis(50))
//!         .story_teller(|count: usize| async move {
//!             Ok::<_, BoxError>((0..count).map(|page| Browse { page }).collect::<Vec<_>>())
//!         })
//!         .publisher(PacedPublisher::new(transport))
//!         .build();
//!
//!     let report = LoadTest::builder()
//!         .stages(vec![
//!             Stage::new(Duration::from_millis(100), 50.0),
//!             Stage::new(Duration::from_millis(100), 200.0),
//!         ])
//!         .build()
//!         .run(&plane, &CancelSignal::never())
//!         .await
//!         .unwrap();
//!
//!     assert!(!report.cancelled);
//! }
//! ```
//!
//! # Feature flags
//!
//! - `macros`: the `#[journey]` attribute that derives everything a journey
//!   needs. (Enabled by default)

/// Cooperative cancellation
pub mod cancel;
/// Step dispatch
pub mod control_plane;
pub mod error;
/// Workload descriptors and the capabilities that produce and run them
pub mod journey;
pub mod partition;
/// Publishers and transports
pub mod publisher;
pub mod scheduler;
pub mod step;
pub mod work_order;

pub use cancel::{CancelHandle, CancelSignal};
pub use control_plane::{ControlPlane, LoadControl};
pub use error::{BoxError, Cancelled, Error};
pub use journey::{Journey, JourneyWalker, StoryTeller};
pub use load_test::{LoadTest, LoadTestReport, StepReport};
pub use partition::{DEFAULT_SLICE, partition, total_volume};
pub use publisher::{ChannelTransport, PacedPublisher, PublishOutcome, Publisher, Transport};
pub use scheduler::IntervalScheduler;
pub use step::{Stage, Step};
pub use work_order::WorkOrder;

#[cfg(feature = "macros")]
/// Procedural macros to reduce boilerplate
pub mod macros {
    pub use beetles_macros::*;
}
