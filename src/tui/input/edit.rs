use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, Mode};
use crate::util::unicode::{next_grapheme_boundary, prev_grapheme_boundary};

/// Apply a cursor/editing key to a single buffer. Returns true if handled.
fn edit_buffer(buffer: &mut String, cursor: &mut usize, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.insert(*cursor, c);
            *cursor += c.len_utf8();
        }
        KeyCode::Backspace => {
            if let Some(prev) = prev_grapheme_boundary(buffer, *cursor) {
                buffer.replace_range(prev..*cursor, "");
                *cursor = prev;
            }
        }
        KeyCode::Delete => {
            if let Some(next) = next_grapheme_boundary(buffer, *cursor) {
                buffer.replace_range(*cursor..next, "");
            }
        }
        KeyCode::Left => {
            if let Some(prev) = prev_grapheme_boundary(buffer, *cursor) {
                *cursor = prev;
            }
        }
        KeyCode::Right => {
            if let Some(next) = next_grapheme_boundary(buffer, *cursor) {
                *cursor = next;
            }
        }
        KeyCode::Home => *cursor = 0,
        KeyCode::End => *cursor = buffer.len(),
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            buffer.replace_range(..*cursor, "");
            *cursor = 0;
        }
        _ => return false,
    }
    true
}

/// Title / notes editing
pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    match key.code {
        // Alt+Enter breaks a line in notes
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            if let Some(edit) = app.edit.as_mut() {
                edit.buffer.insert(edit.cursor, '\n');
                edit.cursor += 1;
            }
        }
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Esc => app.cancel_edit(),
        _ => {
            if let Some(edit) = app.edit.as_mut() {
                edit_buffer(&mut edit.buffer, &mut edit.cursor, key);
            }
        }
    }
}

/// List search prompt. The filter applies as you type.
pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.mode = Mode::Navigate,
        KeyCode::Esc => {
            app.search.clear();
            app.list_cursor = 0;
            app.mode = Mode::Navigate;
        }
        _ => {
            let mut cursor = app.search.len();
            if edit_buffer(&mut app.search, &mut cursor, key) {
                app.list_cursor = 0;
                app.list_scroll = 0;
            }
        }
    }
}
