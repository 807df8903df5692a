//! Command-line configuration.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::source::{StoryKind, DEFAULT_API_BASE_URL};

/// Live Hacker News story lists in the terminal.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Seconds to wait between the end of one refresh and the start of the next.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Root of the Hacker News API.
    #[arg(long, default_value = DEFAULT_API_BASE_URL)]
    pub api_url: String,

    /// Attempts per request before a transport error is reported.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..))]
    pub retries: u32,

    /// Story lists to show, top to bottom.  Repeat to show several.
    #[arg(long = "feed", value_enum, default_values_t = [StoryKind::TopStories, StoryKind::MostRecent])]
    pub feeds: Vec<StoryKind>,

    /// Write JSON logs to this file.  Nothing is logged otherwise.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["hackernews-tui"]).unwrap();

        assert_eq!(cli.refresh_interval(), Duration::from_secs(5));
        assert_eq!(cli.api_url, DEFAULT_API_BASE_URL);
        assert_eq!(cli.retries, 5);
        assert_eq!(cli.feeds, vec![StoryKind::TopStories, StoryKind::MostRecent]);
        assert!(cli.log_file.is_none());
    }

    #[test]
    fn explicit_feeds_replace_defaults() {
        let cli = Cli::try_parse_from(["hackernews-tui", "--feed", "recent"]).unwrap();
        assert_eq!(cli.feeds, vec![StoryKind::MostRecent]);
    }

    #[test]
    fn overrides() {
        let cli = Cli::try_parse_from([
            "hackernews-tui",
            "--interval",
            "30",
            "--api-url",
            "http://localhost:8080",
            "--retries",
            "2",
            "--log-file",
            "/tmp/hn.log",
        ])
        .unwrap();

        assert_eq!(cli.refresh_interval(), Duration::from_secs(30));
        assert_eq!(cli.api_url, "http://localhost:8080");
        assert_eq!(cli.retries, 2);
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/hn.log")));
    }

    #[test]
    fn rejects_zero_interval_and_retries() {
        assert!(Cli::try_parse_from(["hackernews-tui", "--interval", "0"]).is_err());
        assert!(Cli::try_parse_from(["hackernews-tui", "--retries", "0"]).is_err());
    }

    #[test]
    fn rejects_unknown_feed() {
        assert!(Cli::try_parse_from(["hackernews-tui", "--feed", "best"]).is_err());
    }

    #[test]
    fn command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
