mod navigate;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::App;
use super::update::Event;

use navigate::handle_navigate;

/// Handle a key event. Keys that change the hierarchy come back as an event
/// for the reducer; view-only keys (scroll, help, quit) are applied here.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Event> {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return None;
    }

    if is_ctrl(key, 'c') {
        app.should_quit = true;
        return None;
    }

    // Help overlay intercepts everything else
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return None;
    }

    handle_navigate(app, key)
}

fn is_ctrl(key: KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}
