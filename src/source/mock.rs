//! In-memory provider for tests.
//!
//! Serves a scripted id list and item set, counts calls, and can fail or
//! delay individual ids so tests can drive every branch of a refresh cycle.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::{TimeZone, Utc};

use super::{FetchError, FetchProvider, Item};

/// Build an item whose title and time are derived from its id.
pub fn make_item(id: u64) -> Item {
    let time = Utc
        .timestamp_opt(1_257_894_000 + id as i64, 0)
        .single()
        .expect("valid timestamp");
    Item::new(id, format!("item {id}"), time)
}

#[derive(Default)]
pub struct ScriptedSource {
    ids: Mutex<Option<Vec<u64>>>,
    failing: Mutex<HashSet<u64>>,
    delays: HashMap<u64, Duration>,
    echoed: HashMap<u64, u64>,
    list_calls: AtomicUsize,
    item_calls: AtomicUsize,
}

impl ScriptedSource {
    /// A provider whose list is `ids` and which can fetch every id.
    pub fn with_ids(ids: &[u64]) -> Self {
        Self {
            ids: Mutex::new(Some(ids.to_vec())),
            ..Self::default()
        }
    }

    /// Delay the item fetch of `id` (useful with a paused clock).
    pub fn delay(mut self, id: u64, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// Answer requests for `requested` with an item carrying `returned`.
    pub fn echo(mut self, requested: u64, returned: u64) -> Self {
        self.echoed.insert(requested, returned);
        self
    }

    /// Replace the id list; `None` makes the list fetch fail.
    pub fn set_ids(&self, ids: Option<&[u64]>) {
        *self.ids.lock().unwrap() = ids.map(<[u64]>::to_vec);
    }

    /// Make item fetches for `id` fail from now on.
    pub fn fail_item(&self, id: u64) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn item_calls(&self) -> usize {
        self.item_calls.load(Ordering::SeqCst)
    }
}

impl FetchProvider for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_ids(&self) -> Result<Vec<u64>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.ids
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| FetchError::malformed("id list unavailable"))
    }

    async fn fetch_item(&self, id: u64) -> Result<Item, FetchError> {
        self.item_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&id) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.lock().unwrap().contains(&id) {
            return Err(FetchError::malformed(format!("item {id} unavailable")));
        }
        Ok(make_item(self.echoed.get(&id).copied().unwrap_or(id)))
    }
}
