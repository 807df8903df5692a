//! One refresh cycle: resolve the visible ids from cache or network.
//!
//! A [`Refresher`] owns everything a widget needs between cycles: its
//! provider, its [`EntryCache`] and its [`RefreshState`].  Item fetches run
//! concurrently on their own tokio tasks and hand their single result back
//! through a [`JoinSet`]; every mutation of the cache and of the state
//! happens here, on the task driving the cycle, so neither needs a lock.
//!
//! Readers never touch the live state.  After each change the refresher
//! publishes a clone on a [`watch`] channel and then calls the `notify`
//! callback, so whatever a renderer reads is always a whole, consistent
//! snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::EntryCache;
use crate::source::{FetchError, FetchProvider, Item};

/// Consecutive failures under which stale data is still preferred over an
/// error message.
pub const ERROR_TOLERANCE: u32 = 5;

/// Callback fired after every state change, typically to request a redraw.
pub type Notify = Arc<dyn Fn() + Send + Sync>;

/// A failure recorded against a widget.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("could not load the story list: {source}")]
    ListFetch { source: FetchError },

    #[error("could not load item {id}: {source}")]
    ItemFetch { id: u64, source: FetchError },

    #[error("fetch task did not finish: {message}")]
    TaskFailed { message: String },
}

/// What a widget knows right now.
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    /// At least one visible item is resolved, or the last cycle finished.
    pub ready: bool,
    pub last_error: Option<Arc<RefreshError>>,
    /// Failures since the last successful list fetch.
    pub error_count: u32,
    /// The full id list from the last successful list fetch.
    pub display_order: Vec<u64>,
    /// Items resolved for the visible prefix of `display_order`.
    pub resolved: HashMap<u64, Arc<Item>>,
}

impl RefreshState {
    /// Count a failure.
    pub fn record_error(&mut self, error: RefreshError) {
        self.last_error = Some(Arc::new(error));
        self.error_count = self.error_count.saturating_add(1);
    }

    /// Start over with a freshly fetched id list.
    fn reset(&mut self, display_order: Vec<u64>) {
        self.resolved.clear();
        self.display_order = display_order;
        self.ready = false;
        self.last_error = None;
        self.error_count = 0;
    }

    /// Whether the renderer should keep showing data instead of the error.
    ///
    /// Rate limiting upstream produces short bursts of failures; as long as
    /// there is a list to show and the burst stays under
    /// [`ERROR_TOLERANCE`], the error is hidden.
    pub fn should_ignore_error(&self) -> bool {
        self.error_count < ERROR_TOLERANCE && !self.display_order.is_empty()
    }

    /// The visible slots: position, id and the item if already resolved.
    pub fn visible(&self, capacity: usize) -> impl Iterator<Item = (usize, u64, Option<&Item>)> + '_ {
        self.display_order
            .iter()
            .take(capacity)
            .enumerate()
            .map(|(slot, id)| (slot, *id, self.resolved.get(id).map(Arc::as_ref)))
    }
}

/// Counters for one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub cache_hits: usize,
    pub dispatched: usize,
    pub failures: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The list was fetched and every dispatched item fetch settled.
    Completed(CycleReport),
    /// The list fetch failed; previously resolved state is untouched.
    ListFailed,
    /// The cancellation token fired mid-cycle.
    Cancelled,
}

pub struct Refresher<P> {
    provider: Arc<P>,
    cache: EntryCache,
    state: RefreshState,
    publisher: watch::Sender<RefreshState>,
    notify: Notify,
}

impl<P: FetchProvider> Refresher<P> {
    pub fn new(provider: Arc<P>, notify: Notify) -> Self {
        let (publisher, _) = watch::channel(RefreshState::default());
        Self {
            provider,
            cache: EntryCache::new(),
            state: RefreshState::default(),
            publisher,
            notify,
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    #[cfg(test)]
    pub fn state(&self) -> &RefreshState {
        &self.state
    }

    #[cfg(test)]
    pub fn cache(&self) -> &EntryCache {
        &self.cache
    }

    /// Receive a snapshot after every state change.
    pub fn subscribe(&self) -> watch::Receiver<RefreshState> {
        self.publisher.subscribe()
    }

    fn publish(&self) {
        self.publisher.send_replace(self.state.clone());
        (self.notify)();
    }

    /// Run one cycle, resolving at most `capacity` ids.
    pub async fn run_cycle(&mut self, capacity: usize, cancel: &CancellationToken) -> CycleOutcome {
        let listed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return CycleOutcome::Cancelled,
            listed = self.provider.fetch_ids() => listed,
        };

        let ids = match listed {
            Ok(ids) => ids,
            Err(source) => {
                warn!(
                    event = "refresh.list.fetch_failed",
                    provider = self.provider.name(),
                    error = %source,
                );
                self.state.record_error(RefreshError::ListFetch { source });
                self.publish();
                return CycleOutcome::ListFailed;
            }
        };

        self.state.reset(ids);
        let wanted: Vec<u64> = self.state.display_order.iter().take(capacity).copied().collect();

        let mut report = CycleReport::default();
        let mut pending = JoinSet::new();
        for id in wanted {
            if let Some(item) = self.cache.get(id) {
                self.state.resolved.insert(id, item);
                self.state.ready = true;
                report.cache_hits += 1;
            } else {
                let provider = Arc::clone(&self.provider);
                pending.spawn(async move { (id, provider.fetch_item(id).await) });
                report.dispatched += 1;
            }
        }
        debug!(
            event = "refresh.cycle.dispatched",
            provider = self.provider.name(),
            cache_hits = report.cache_hits,
            dispatched = report.dispatched,
        );
        self.publish();

        loop {
            let joined = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    pending.abort_all();
                    info!(
                        event = "refresh.cycle.cancelled",
                        provider = self.provider.name(),
                    );
                    return CycleOutcome::Cancelled;
                }
                joined = pending.join_next() => joined,
            };
            let Some(joined) = joined else { break };

            match joined {
                Ok((id, Ok(item))) => {
                    let item = Arc::new(item);
                    self.cache.put(id, Arc::clone(&item));
                    self.state.resolved.insert(id, item);
                    self.state.ready = true;
                }
                Ok((id, Err(source))) => {
                    warn!(
                        event = "refresh.item.fetch_failed",
                        provider = self.provider.name(),
                        id,
                        error = %source,
                    );
                    self.state.record_error(RefreshError::ItemFetch { id, source });
                    report.failures += 1;
                }
                Err(join_error) => {
                    warn!(
                        event = "refresh.item.task_failed",
                        provider = self.provider.name(),
                        error = %join_error,
                    );
                    self.state.record_error(RefreshError::TaskFailed {
                        message: join_error.to_string(),
                    });
                    report.failures += 1;
                }
            }
            self.publish();
        }

        self.state.ready = true;
        self.cache.gc();
        self.publish();

        info!(
            event = "refresh.cycle.completed",
            provider = self.provider.name(),
            cache_hits = report.cache_hits,
            dispatched = report.dispatched,
            failures = report.failures,
        );
        CycleOutcome::Completed(report)
    }
}
