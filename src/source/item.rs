//! The item type every provider produces.
//!
//! An `Item` is built once, when a fetch succeeds, and never mutated
//! afterwards.  The cache and the per-cycle result set share the same value
//! through an [`Arc`](std::sync::Arc), so nothing downstream needs a copy.

use std::fmt;

use chrono::{DateTime, Utc};

/// How item timestamps are rendered, e.g. `Nov 10, 2009 at 11:00pm (UTC)`.
const TIME_FORMAT: &str = "%b %-d, %Y at %-I:%M%P (%Z)";

/// A single story, as far as the dashboard cares about it.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Item {
    /// Identifier assigned by the upstream API.  Also the cache key.
    pub id: u64,

    /// Headline shown in the list.
    pub title: String,

    /// Submission time reported by the upstream API.
    pub time: DateTime<Utc>,
}

impl Item {
    pub fn new(id: u64, title: impl Into<String>, time: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            time,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" on {}", self.title, self.time.format(TIME_FORMAT))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
