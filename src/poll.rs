//! Background refresh loop.
//!
//! Runs one tokio task per widget that drives a [`Refresher`] on a fixed
//! interval.  The first cycle starts immediately; afterwards the task sleeps
//! the full interval between the end of one cycle and the start of the next.
//!
//! ## For contributors
//!
//! A failing cycle never ends the loop; the failure is recorded in the
//! widget state and the next cycle runs on schedule.  The only way out is the
//! [`CancellationToken`] held by the returned [`RefreshHandle`], which also
//! aborts any item fetches still in flight.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::refresh::{CycleOutcome, RefreshState, Refresher};
use crate::source::FetchProvider;

/// Owner's side of a running refresh loop.
pub struct RefreshHandle {
    state: watch::Receiver<RefreshState>,
    capacity: Arc<AtomicUsize>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// The latest published state.
    pub fn snapshot(&self) -> RefreshState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.state.clone()
    }

    /// Shared capacity cell; the renderer writes the rows it can show.
    pub fn capacity(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.capacity)
    }

    /// Ask the loop to stop without waiting for it.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Stop the loop and wait until its task has exited.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        // A loop task only ends early by panicking, and there is nothing left
        // to clean up in that case.
        let _ = self.task.await;
    }
}

/// Spawn the refresh loop for `refresher` on the current tokio runtime.
///
/// `capacity` is the initial number of ids resolved per cycle.
pub fn spawn<P: FetchProvider>(refresher: Refresher<P>, interval: Duration, capacity: usize) -> RefreshHandle {
    let state = refresher.subscribe();
    let capacity = Arc::new(AtomicUsize::new(capacity));
    let cancel = CancellationToken::new();

    let task = tokio::spawn(run(refresher, interval, Arc::clone(&capacity), cancel.clone()));

    RefreshHandle {
        state,
        capacity,
        cancel,
        task,
    }
}

async fn run<P: FetchProvider>(
    mut refresher: Refresher<P>,
    interval: Duration,
    capacity: Arc<AtomicUsize>,
    cancel: CancellationToken,
) {
    info!(
        event = "poll.loop.started",
        provider = refresher.provider().name(),
        interval_secs = interval.as_secs_f64(),
    );

    loop {
        let outcome = refresher.run_cycle(capacity.load(Ordering::Relaxed), &cancel).await;
        if outcome == CycleOutcome::Cancelled {
            break;
        }
        debug!(
            event = "poll.loop.sleeping",
            provider = refresher.provider().name(),
            outcome = ?outcome,
        );

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    info!(
        event = "poll.loop.stopped",
        provider = refresher.provider().name(),
    );
}
