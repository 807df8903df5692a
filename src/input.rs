//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`]; remember to update the help
//! text in [`crate::ui`]'s status bar.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::App;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers, kind: KeyEventKind) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn q_and_esc_quit() {
        for code in [KeyCode::Char('q'), KeyCode::Esc] {
            let mut app = App::new(Vec::new());
            handle_key_event(&mut app, key(code, KeyModifiers::NONE, KeyEventKind::Press));
            assert!(app.quit);
        }
    }

    #[test]
    fn ctrl_c_quits_but_plain_c_does_not() {
        let mut app = App::new(Vec::new());
        handle_key_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::NONE, KeyEventKind::Press));
        assert!(!app.quit);

        handle_key_event(&mut app, key(KeyCode::Char('c'), KeyModifiers::CONTROL, KeyEventKind::Press));
        assert!(app.quit);
    }

    #[test]
    fn key_release_is_ignored() {
        let mut app = App::new(Vec::new());
        handle_key_event(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE, KeyEventKind::Release));
        assert!(!app.quit);
    }
}
