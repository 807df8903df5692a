//! Fetch provider abstraction layer.
//!
//! This module defines the [`FetchProvider`] trait, the [`Item`] type every
//! provider produces, and the [`FetchError`] taxonomy.  The concrete Hacker
//! News provider lives in [`hackernews`].
//!
//! ## For contributors — adding a new provider
//!
//! 1. Create a new file in this directory (e.g. `lobsters.rs`).
//! 2. Define a struct holding its configuration and implement
//!    [`FetchProvider`] for it.
//! 3. Add `mod lobsters;` below and re-export your struct.
//! 4. Construct an instance in `main.rs` and hand it to a
//!    [`Refresher`](crate::refresh::Refresher).
//!
//! Caching, concurrent fetching, error tolerance and rendering are all
//! provider-agnostic.

mod error;
mod hackernews;
mod item;

#[cfg(test)]
pub mod mock;

pub use error::FetchError;
pub use hackernews::{HackerNewsSource, StoryKind, DEFAULT_API_BASE_URL};
pub use item::Item;

use std::future::Future;

/// Trait that every provider must implement.
///
/// A refresh cycle calls [`fetch_ids()`](FetchProvider::fetch_ids) once and
/// then [`fetch_item()`](FetchProvider::fetch_item) concurrently for every
/// cache miss, each on its own tokio task, so providers are shared behind an
/// `Arc` and their futures must be [`Send`].
///
/// ## Implementing a new provider
///
/// ```ignore
/// pub struct MyProvider { /* config fields */ }
///
/// impl FetchProvider for MyProvider {
///     fn name(&self) -> &str { "my-provider" }
///
///     async fn fetch_ids(&self) -> Result<Vec<u64>, FetchError> {
///         todo!()
///     }
///
///     async fn fetch_item(&self, id: u64) -> Result<Item, FetchError> {
///         todo!()
///     }
/// }
/// ```
pub trait FetchProvider: Send + Sync + 'static {
    /// Human-readable label used in logs and widget titles.
    fn name(&self) -> &str;

    /// Fetch the ordered list of ids worth displaying right now.
    fn fetch_ids(&self) -> impl Future<Output = Result<Vec<u64>, FetchError>> + Send;

    /// Fetch a single item.  Retrying is the provider's business; an error
    /// returned here is final for the current cycle.
    fn fetch_item(&self, id: u64) -> impl Future<Output = Result<Item, FetchError>> + Send;
}
