//! Cooperative cancellation for step dispatches.
//!
//! A [`CancelSignal`] is observed at await points (pacing waits, publish calls);
//! nothing is ever interrupted preemptively. It is a thin wrapper over a
//! `tokio::sync::watch` channel carrying a single `bool`.
use tokio::sync::watch::{self, Receiver, Sender};

/// Read side of a cancellation signal. Cheap to clone; every clone observes
/// the same signal.
#[derive(Clone, Debug)]
pub struct CancelSignal {
    rx: Receiver<bool>,
}

/// Write side of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: Sender<bool>,
}

impl CancelSignal {
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (Self { rx }, CancelHandle { tx })
    }

    /// A signal that can never fire.
    pub fn never() -> Self {
        let (signal, _) = Self::new();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the signal is raised.
    ///
    /// If every [`CancelHandle`] is dropped without cancelling, this never resolves.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|c| *c).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Derive a signal that fires when either `self` fires or the returned
    /// handle is used.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn child(&self) -> (Self, CancelHandle) {
        let (child, handle) = Self::new();
        if self.is_cancelled() {
            handle.cancel();
            return (child, handle);
        }

        let parent = self.clone();
        let tx = handle.tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = parent.cancelled() => {
                    tx.send_replace(true);
                }
                // Every child signal is gone, nobody is left to notify
                _ = tx.closed() => {}
            }
        });
        (child, handle)
    }
}

impl CancelHandle {
    /// Raise the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn cancel_is_observed_by_every_clone() {
        let (signal, handle) = CancelSignal::new();
        let other = signal.clone();
        assert!(!signal.is_cancelled());
        assert!(!handle.is_cancelled());

        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(signal.is_cancelled());
        assert!(other.is_cancelled());
        other.cancelled().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_never_fires() {
        let (signal, handle) = CancelSignal::new();
        drop(handle);

        let res = tokio::time::timeout(Duration::from_secs(60), signal.cancelled()).await;
        assert!(res.is_err());
        assert!(!signal.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn never_does_not_fire() {
        let signal = CancelSignal::never();
        let res = tokio::time::timeout(Duration::from_secs(1), signal.cancelled()).await;
        assert!(res.is_err());
    }

    #[tokio::test]
    async fn child_follows_parent() {
        let (parent, parent_handle) = CancelSignal::new();
        let (child, _child_handle) = parent.child();

        parent_handle.cancel();
        tokio::time::timeout(Duration::from_secs(1), child.cancelled())
            .await
            .unwrap();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn child_cancel_does_not_reach_parent() {
        let (parent, _parent_handle) = CancelSignal::new();
        let (child, child_handle) = parent.child();

        child_handle.cancel();
        assert!(child.is_cancelled());
        assert!(!parent.is_cancelled());
    }

    #[tokio::test]
    async fn child_of_cancelled_parent_starts_cancelled() {
        let (parent, parent_handle) = CancelSignal::new();
        parent_handle.cancel();

        let (child, child_handle) = parent.child();
        assert!(child.is_cancelled());
        assert!(child_handle.is_cancelled());
    }
}
