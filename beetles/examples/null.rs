use std::time::Duration;

use beetles::{
    BoxError, CancelSignal, ChannelTransport, ControlPlane, Journey, JourneyWalker, LoadTest,
    PacedPublisher, Stage, WorkOrder, macros::journey,
};
use tokio::sync::mpsc::Receiver;
use tracing_subscriber::EnvFilter;

/// A journey that does nothing. Useful to exercise the harness itself.
#[journey]
struct NullJourney;

#[derive(Debug)]
struct NullJourneyResult;

/// Stand-in for the worker fleet: walks every journey of every order it gets.
async fn worker<W>(mut orders: Receiver<WorkOrder<NullJourney>>, walker: W) -> usize
where
    W: JourneyWalker<NullJourney, Output = NullJourneyResult>,
{
    let mut walked = 0;
    while let Some(order) = orders.recv().await {
        for journey in order.journeys {
            let _: NullJourneyResult = walker.walk(journey).await;
            walked += 1;
        }
        tracing::debug!("Worker finished an order of {}", order.request_count);
    }
    walked
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Build the transport up front; the publisher never connects lazily
    let (transport, orders) = ChannelTransport::new(1024);
    let walker = tokio::spawn(worker(orders, |_: NullJourney| async { NullJourneyResult }));

    let plane = ControlPlane::builder()
        .concurrency_ceiling(50)
        .slice(Duration::from_secs(2))
        .story_teller(|count: usize| async move {
            Ok::<_, BoxError>(vec![NullJourney; count])
        })
        .publisher(PacedPublisher::new(transport))
        .build();

    let (cancel, handle) = CancelSignal::new();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });

    let report = LoadTest::builder()
        .stages(vec![
            Stage::new(Duration::from_secs(4), 10.0),
            Stage::new(Duration::from_secs(4), 40.0),
            Stage::new(Duration::from_secs(4), 10.0),
        ])
        .build()
        .run(&plane, &cancel)
        .await?;

    // Dropping the control plane closes the channel and lets the worker drain
    drop(plane);
    let walked = walker.await?;
    println!(
        "published {} work orders, walked {walked} journeys (cancelled: {})",
        report.published(),
        report.cancelled
    );
    Ok(())
}
