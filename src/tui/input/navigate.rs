use crossterm::event::{KeyCode, KeyEvent};

use crate::model::Filter;
use crate::tui::app::{App, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Any key dismisses a failure message
    app.status_message = None;

    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,

        // New task
        KeyCode::Char('a') | KeyCode::Char('i') | KeyCode::Char('n') => app.mode = Mode::Input,

        // Cursor
        KeyCode::Char('j') | KeyCode::Down => app.move_cursor(1),
        KeyCode::Char('k') | KeyCode::Up => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.move_cursor(isize::MAX),

        // Task actions
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_cursor_task(),
        KeyCode::Char('e') | KeyCode::Enter => app.begin_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_cursor_task(),
        KeyCode::Char('C') => app.clear_completed(),

        // Filter tabs
        KeyCode::Tab | KeyCode::Char('l') | KeyCode::Right => {
            let next = app.list.filter().next();
            app.set_filter(next);
        }
        KeyCode::BackTab | KeyCode::Char('h') | KeyCode::Left => {
            let prev = app.list.filter().prev();
            app.set_filter(prev);
        }
        KeyCode::Char(c @ '1'..='3') => {
            let idx = c as usize - '1' as usize;
            app.set_filter(Filter::ALL[idx]);
        }
        _ => {}
    }
}
