//! Structured logging.
//!
//! The terminal belongs to the UI, so logs only go to a file.  Filtering
//! follows `RUST_LOG`; when it is unset or unparsable this crate logs at `info`.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_DIRECTIVE: &str = "hackernews_tui=info";

pub fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(env_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .try_init()?;

    Ok(())
}

/// Directives from `RUST_LOG` when it parses, else the crate at `info`.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_log_file_installs_nothing() {
        assert!(init_logging(None).is_ok());
    }

    fn debug_enabled(filter: EnvFilter) -> bool {
        let subscriber = tracing_subscriber::registry().with(filter);
        tracing::subscriber::with_default(subscriber, || {
            tracing::enabled!(target: "hackernews_tui::refresh", tracing::Level::DEBUG)
        })
    }

    #[test]
    fn rust_log_can_raise_crate_level() {
        assert!(debug_enabled(env_filter(Some("hackernews_tui=debug"))));
    }

    #[test]
    fn crate_defaults_to_info() {
        assert!(!debug_enabled(env_filter(None)));
        assert!(!debug_enabled(env_filter(Some("hackernews_tui=loud"))));
    }

    #[test]
    fn unwritable_log_file_is_reported() {
        let err = init_logging(Some(Path::new("/nonexistent-dir/hn.log"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent-dir/hn.log"));
    }
}
