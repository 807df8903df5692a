//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout stacks one bordered widget per feed above a one-line status
//!   bar.
//! * Each widget decides between an error, a loading message and the story
//!   list from its latest [`RefreshState`] snapshot; the error tolerance
//!   decision is [`RefreshState::should_ignore_error`].
//! * Drawing also reports each widget's row count back to its refresh loop,
//!   so the next cycle only resolves what fits on screen.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, WidgetView};
use crate::refresh::RefreshState;

/// Rows lost to a widget's top and bottom border.
const BORDER_ROWS: u16 = 2;

/// Draw the complete UI for one frame.
pub fn draw(app: &App, frame: &mut Frame) {
    let [widgets_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

    let areas = Layout::vertical(app.widgets.iter().map(|_| Constraint::Fill(1))).split(widgets_area);
    for (view, area) in app.widgets.iter().zip(areas.iter()) {
        draw_widget(view, frame, *area);
    }

    draw_status_bar(app, frame, status_area);
}

/// Rows each of `widgets` stacked widgets can list in a terminal `height`
/// rows tall.  Used before the first frame has been drawn.
pub fn list_capacity(height: u16, widgets: usize) -> usize {
    if widgets == 0 {
        return 0;
    }
    let per_widget = height.saturating_sub(1) as usize / widgets;
    per_widget.saturating_sub(BORDER_ROWS as usize)
}

/// Render one feed widget and publish its capacity.
fn draw_widget(view: &WidgetView, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .title(format!(" Hacker News ({}) ", view.kind))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let capacity = area.height.saturating_sub(BORDER_ROWS) as usize;
    view.set_capacity(capacity);

    let state = view.state.borrow();
    match &state.last_error {
        Some(error) if !state.should_ignore_error() => {
            let text = Paragraph::new(format!("Error: {error}"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            frame.render_widget(text, inner);
        }
        _ if !state.ready => {
            frame.render_widget(Paragraph::new("Loading entries, please wait..."), inner);
        }
        _ => {
            let list = List::new(story_rows(&state, capacity));
            frame.render_widget(list, inner);
        }
    }
}

/// Numbered rows for the visible slots, indices right-aligned in a gutter.
fn story_rows(state: &RefreshState, capacity: usize) -> Vec<ListItem<'static>> {
    let shown = capacity.min(state.display_order.len());
    let gutter = digits(shown);

    state
        .visible(capacity)
        .map(|(slot, _, item)| {
            let number = slot + 1;
            let pad = gutter - digits(number);
            let (message, style) = match item {
                Some(item) => (item.to_string(), Style::default().fg(Color::White)),
                None => ("Loading, please wait".to_string(), Style::default().fg(Color::DarkGray)),
            };

            ListItem::new(Line::from(vec![
                Span::styled(format!("[{number}]{:pad$} ", ""), Style::default().fg(Color::Cyan)),
                Span::styled(format!("{message}..."), style),
            ]))
        })
        .collect()
}

fn digits(n: usize) -> usize {
    n.max(1).ilog10() as usize + 1
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(
            format!("{} stories", app.resolved_count()),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  q: quit"),
    ]));
    frame.render_widget(status, area);
}
