//! hackernews-tui — live Hacker News story lists for the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐ run_cycle ┌────────────┐ snapshot ┌──────────┐  draw()  ┌──────────┐
//! │ poll.rs  │ ────────► │ refresh.rs │ ───────► │  app.rs  │ ───────► │  ui.rs   │
//! │  (task)  │           │  (cycle)   │  (watch) │ (views)  │          │ (render) │
//! └──────────┘           └────────────┘          └──────────┘          └──────────┘
//!                          │        ▲                  ▲
//!                get / put │        │ fetch            │ handle_key_event()
//!                          ▼        │                  │
//!                   ┌──────────┐ ┌──────────┐     ┌──────────┐
//!                   │ cache.rs │ │ source/  │     │ input.rs │
//!                   └──────────┘ └──────────┘     └──────────┘
//! ```
//!
//! * **`source/`** — the `FetchProvider` trait, the `Item` type and the
//!   Hacker News implementation.
//! * **`cache`** — two-generation entry cache shared across cycles.
//! * **`refresh`** — one refresh cycle: list fetch, cache lookups,
//!   concurrent item fetches, error bookkeeping.
//! * **`poll`** — runs cycles on a timer in a cancellable background task.
//! * **`app`** / **`ui`** / **`input`** — state the UI reads, rendering, and
//!   key handling.
//! * **`config`** / **`logging`** — command-line options and log setup.
//! * **`main`** — wires everything together: parse args, set up the terminal,
//!   start the refresh loops, and run the event loop.

mod app;
mod cache;
mod config;
mod input;
mod logging;
mod poll;
mod refresh;
mod source;
mod ui;

use std::io;
use std::sync::{mpsc, Arc};
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use app::{App, WidgetView};
use config::Cli;
use poll::RefreshHandle;
use refresh::{Notify, Refresher};
use source::{HackerNewsSource, StoryKind};

// ---------------------------------------------------------------------------
// RAII terminal guard — idiomatic cleanup even on panic
// ---------------------------------------------------------------------------

/// Manages terminal raw-mode and alternate-screen lifetime via [`Drop`].
///
/// Constructing this struct enters raw mode + alternate screen.  When the
/// value is dropped (normally or during stack unwinding) it restores the
/// terminal.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Install a panic hook that restores the terminal before printing the
/// panic message.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));
}

/// Sent from refresh loops to the UI thread whenever a widget changes.
enum UiEvent {
    Refreshed(StoryKind),
}

/// Start one refresh loop per configured feed.
fn spawn_refreshers(cli: &Cli, capacity: usize, tx: &mpsc::Sender<UiEvent>) -> Vec<(StoryKind, RefreshHandle)> {
    cli.feeds
        .iter()
        .map(|&kind| {
            let provider = Arc::new(HackerNewsSource::new(&cli.api_url, kind, cli.retries));
            let tx = tx.clone();
            // The UI thread may already be gone during shutdown.
            let notify: Notify = Arc::new(move || {
                let _ = tx.send(UiEvent::Refreshed(kind));
            });
            let handle = poll::spawn(Refresher::new(provider, notify), cli.refresh_interval(), capacity);
            (kind, handle)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_file.as_deref())?;
    install_panic_hook();

    // -- background runtime for the refresh loops ----------------------------
    let runtime = tokio::runtime::Runtime::new()?;
    let _enter = runtime.enter();

    // -- terminal setup (RAII — Drop restores on exit or panic) --------------
    let mut guard = TerminalGuard::new()?;
    let size = guard.terminal.size()?;
    let capacity = ui::list_capacity(size.height, cli.feeds.len());

    // -- start refreshing ------------------------------------------------------
    let (tx, rx) = mpsc::channel();
    let handles = spawn_refreshers(&cli, capacity, &tx);
    let views = handles
        .iter()
        .map(|(kind, handle)| WidgetView::new(*kind, handle))
        .collect();
    let mut app = App::new(views);

    info!(
        event = "app.started",
        feeds = cli.feeds.len(),
        interval_secs = cli.interval,
        capacity,
    );

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick).  Each iteration:
    //   1. Drain refresh notifications.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(UiEvent::Refreshed(kind)) = rx.try_recv() {
            app.mark_refreshed(kind, chrono::Local::now());
        }

        guard.terminal.draw(|f| ui::draw(&app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // -- shutdown --------------------------------------------------------------
    for (_, handle) in &handles {
        handle.stop();
    }
    runtime.block_on(async move {
        for (kind, handle) in handles {
            let last = handle.snapshot();
            handle.shutdown().await;
            info!(
                event = "app.feed.stopped",
                feed = %kind,
                stories = last.resolved.len(),
                error_count = last.error_count,
            );
        }
    });
    info!(event = "app.stopped");

    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
