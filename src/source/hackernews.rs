//! Hacker News provider.
//!
//! Talks to the public Firebase API: one request for the story id list and
//! one request per story.  Transport failures are retried a bounded number of
//! times here, so the refresh core only ever sees the final outcome.
//!
//! Parsing is split into the pure functions [`HackerNewsSource::parse_ids`]
//! and [`HackerNewsSource::parse_item`] so the response handling can be
//! tested without a network.

use std::fmt;

use chrono::DateTime;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use super::{FetchError, FetchProvider, Item};

/// Production API root.  Overridable from the command line.
pub const DEFAULT_API_BASE_URL: &str = "https://hacker-news.firebaseio.com";

/// Which story list a widget follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum StoryKind {
    /// The front page ranking.
    #[value(name = "top")]
    TopStories,
    /// Newest submissions first.
    #[value(name = "recent")]
    MostRecent,
}

impl StoryKind {
    fn list_path(self) -> &'static str {
        match self {
            StoryKind::TopStories => "topstories",
            StoryKind::MostRecent => "newstories",
        }
    }
}

impl fmt::Display for StoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoryKind::TopStories => f.write_str("Top Stories"),
            StoryKind::MostRecent => f.write_str("Most Recent"),
        }
    }
}

/// A Hacker News story list.
pub struct HackerNewsSource {
    client: Client,
    base_url: String,
    kind: StoryKind,
    max_retries: u32,
    label: String,
}

impl HackerNewsSource {
    /// Create a new provider.
    ///
    /// * `base_url` — API root without a trailing slash, normally
    ///   [`DEFAULT_API_BASE_URL`].
    /// * `max_retries` — how many times a request is attempted before its
    ///   transport error is surfaced.  Values below 1 are treated as 1.
    pub fn new(base_url: impl Into<String>, kind: StoryKind, max_retries: u32) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
            kind,
            max_retries: max_retries.max(1),
            label: format!("Hacker News ({kind})"),
        }
    }

    /// URL of the id list this provider follows.
    pub fn list_url(&self) -> String {
        format!("{}/v0/{}.json", self.base_url, self.kind.list_path())
    }

    /// URL of a single item.
    pub fn item_url(&self, id: u64) -> String {
        format!("{}/v0/item/{id}.json", self.base_url)
    }

    /// Decode an id list response body.
    pub fn parse_ids(body: &[u8]) -> Result<Vec<u64>, FetchError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Decode an item response body.
    ///
    /// The API answers `null` for unknown ids and omits `title` for some item
    /// types; both are reported as [`FetchError::Malformed`].
    pub fn parse_item(id: u64, body: &[u8]) -> Result<Item, FetchError> {
        let value: Value = serde_json::from_slice(body)?;
        let fields = value
            .as_object()
            .ok_or_else(|| FetchError::malformed(format!("item {id} is not a JSON object")))?;

        let title = fields
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| FetchError::malformed(format!("item {id} has no title")))?;

        // The API sends integer seconds, but accept floats as well.
        let secs = fields
            .get("time")
            .and_then(|t| t.as_i64().or_else(|| t.as_f64().map(|f| f as i64)))
            .ok_or_else(|| FetchError::malformed(format!("item {id} has no timestamp")))?;

        let time = DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| FetchError::malformed(format!("item {id} has an out of range timestamp")))?;

        Ok(Item::new(id, title, time))
    }

    /// GET `url`, retrying transport errors up to `max_retries` attempts.
    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        let mut attempt = 1;
        let response = loop {
            match self.client.get(url).send().await {
                Ok(response) => break response,
                Err(e) if attempt < self.max_retries => {
                    debug!(
                        event = "source.request.retry",
                        url,
                        attempt,
                        error = %e,
                    );
                    attempt += 1;
                }
                Err(e) => {
                    warn!(
                        event = "source.request.failed",
                        url,
                        attempts = attempt,
                        error = %e,
                    );
                    return Err(e.into());
                }
            }
        };

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                status: response.status(),
            });
        }
        Ok(response)
    }
}

impl FetchProvider for HackerNewsSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_ids(&self) -> Result<Vec<u64>, FetchError> {
        let body = self.get(&self.list_url()).await?.bytes().await?;
        Self::parse_ids(&body)
    }

    async fn fetch_item(&self, id: u64) -> Result<Item, FetchError> {
        let body = self.get(&self.item_url(id)).await?.bytes().await?;
        Self::parse_item(id, &body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
