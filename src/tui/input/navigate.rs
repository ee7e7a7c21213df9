use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::App;
use crate::tui::update::{Event, Side};

use super::is_ctrl;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) -> Option<Event> {
    if is_ctrl(key, 'r') {
        return Some(Event::ResetRequested);
    }
    if is_ctrl(key, 'z') {
        return Some(Event::UndoRequested);
    }
    if key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
        return None;
    }

    match key.code {
        KeyCode::Left | KeyCode::Char('1') | KeyCode::Char('h') => Some(Event::Choice(Side::Left)),
        KeyCode::Right | KeyCode::Char('2') | KeyCode::Char('l') => {
            Some(Event::Choice(Side::Right))
        }
        KeyCode::Char('u') => Some(Event::UndoRequested),
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll = app.scroll.saturating_add(1);
            None
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll = app.scroll.saturating_sub(1);
            None
        }
        KeyCode::Char('?') => {
            app.show_help = true;
            None
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            None
        }
        _ => None,
    }
}
