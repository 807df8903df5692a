use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use crate::poll::RefreshHandle;
use crate::refresh::RefreshState;
use crate::source::StoryKind;

/// What the UI needs from one refresh loop.
pub struct WidgetView {
    pub kind: StoryKind,
    /// Snapshots published by the loop.
    pub state: watch::Receiver<RefreshState>,
    /// Rows the widget can show; written by the renderer, read by the loop.
    pub capacity: Arc<AtomicUsize>,
}

impl WidgetView {
    pub fn new(kind: StoryKind, handle: &RefreshHandle) -> Self {
        Self {
            kind,
            state: handle.subscribe(),
            capacity: handle.capacity(),
        }
    }

    #[cfg(test)]
    pub fn capacity(&self) -> usize {
        self.capacity.load(Ordering::Relaxed)
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.capacity.store(capacity, Ordering::Relaxed);
    }
}

pub struct App {
    pub widgets: Vec<WidgetView>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last refresh status message.
    pub status: String,
}

impl App {
    pub fn new(widgets: Vec<WidgetView>) -> Self {
        Self {
            widgets,
            quit: false,
            status: "Starting…".into(),
        }
    }

    /// Record that the widget following `kind` published new state.
    pub fn mark_refreshed(&mut self, kind: StoryKind, at: DateTime<Local>) {
        self.status = format!("{kind} updated at {}", at.format("%H:%M:%S"));
    }

    /// Stories currently resolved across all widgets.
    pub fn resolved_count(&self) -> usize {
        self.widgets
            .iter()
            .map(|view| view.state.borrow().resolved.len())
            .sum()
    }
}
