//! Two-generation entry cache.
//!
//! Items live in `current` or `previous`.  A lookup that hits `previous`
//! promotes the item back into `current`, and [`EntryCache::gc`] drops the
//! old `previous` wholesale.  An item therefore survives as long as it is
//! touched at least once between every two collections, which is exactly
//! what a list that is re-read on every refresh needs.

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;

use crate::source::Item;

#[derive(Debug, Default)]
pub struct EntryCache {
    current: HashMap<u64, Arc<Item>>,
    previous: HashMap<u64, Arc<Item>>,
}

impl EntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `item` under `id` in the current generation, replacing any
    /// older copy.
    pub fn put(&mut self, id: u64, item: Arc<Item>) {
        self.current.insert(id, item);
    }

    /// Look up `id`, promoting a hit from the previous generation.
    pub fn get(&mut self, id: u64) -> Option<Arc<Item>> {
        if let Some(item) = self.current.get(&id) {
            return Some(Arc::clone(item));
        }
        let item = Arc::clone(self.previous.get(&id)?);
        self.current.insert(id, Arc::clone(&item));
        Some(item)
    }

    /// Whether `id` is cached in either generation.  Does not promote.
    #[cfg(test)]
    pub fn contains(&self, id: u64) -> bool {
        self.current.contains_key(&id) || self.previous.contains_key(&id)
    }

    /// Forget everything not touched since the last collection.
    pub fn gc(&mut self) {
        self.previous = mem::take(&mut self.current);
    }

    /// Number of distinct ids held across both generations.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.current.len()
            + self
                .previous
                .keys()
                .filter(|id| !self.current.contains_key(id))
                .count()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.previous.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::mock::make_item;

    fn put(cache: &mut EntryCache, id: u64) {
        cache.put(id, Arc::new(make_item(id)));
    }

    #[test]
    fn put_and_get() {
        let mut cache = EntryCache::new();
        put(&mut cache, 1);
        put(&mut cache, 2);

        assert_eq!(*cache.get(1).unwrap(), make_item(1));
        assert_eq!(*cache.get(2).unwrap(), make_item(2));
        assert_ne!(*cache.get(1).unwrap(), make_item(2));
        assert!(cache.get(3).is_none());
    }

    #[test]
    fn put_overwrites_existing_entry() {
        let mut cache = EntryCache::new();
        put(&mut cache, 1);
        cache.gc();

        let newer = Item::new(1, "renamed", make_item(1).time);
        cache.put(newer.id, Arc::new(newer.clone()));

        assert_eq!(*cache.get(1).unwrap(), newer);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn untouched_entries_evicted_after_two_collections() {
        let mut cache = EntryCache::new();
        put(&mut cache, 1);
        put(&mut cache, 2);
        put(&mut cache, 3);
        cache.gc();

        assert!(cache.get(1).is_some());
        assert!(cache.get(2).is_some());
        cache.gc();

        assert!(cache.get(1).is_some());
        assert!(cache.get(3).is_none());
        put(&mut cache, 4);
        cache.gc();

        assert!(cache.get(2).is_none());
        assert!(cache.get(4).is_some());
        cache.gc();

        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_none());
        assert!(cache.get(3).is_none());
        assert!(cache.get(4).is_some());
    }

    #[test]
    fn contains_does_not_promote() {
        let mut cache = EntryCache::new();
        put(&mut cache, 1);
        cache.gc();

        assert!(cache.contains(1));
        cache.gc();
        assert!(!cache.contains(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn gc_on_empty_cache_is_harmless() {
        let mut cache = EntryCache::new();
        cache.gc();
        cache.gc();
        assert!(cache.is_empty());
        assert!(cache.get(1).is_none());
    }

    #[test]
    fn len_counts_promoted_items_once() {
        let mut cache = EntryCache::new();
        put(&mut cache, 1);
        put(&mut cache, 2);
        cache.gc();
        cache.get(1);

        assert_eq!(cache.len(), 2);
    }
}
