use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, EditField, Mode, PAN_STEP, View};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    if app.view == View::List {
        if handle_list_only(app, key) {
            return;
        }
        // Node actions below apply to the row under the cursor
        sync_list_selection(app);
    } else if handle_map_only(app, key) {
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Tab | KeyCode::BackTab => {
            app.view = match app.view {
                View::Map => View::List,
                View::List => View::Map,
            };
        }
        KeyCode::Char('a') => app.add_child(),
        KeyCode::Char('e') => app.begin_edit(EditField::Title),
        KeyCode::Char('o') => app.begin_edit(EditField::Notes),
        KeyCode::Char(c @ '1'..='5') => app.set_priority(c as i64 - '0' as i64),
        KeyCode::Char('x') => app.toggle_completed(),
        KeyCode::Char('L') => app.toggle_locked(),
        KeyCode::Char('r') => app.open_parent_picker(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('R') => app.request_reset(),
        KeyCode::Char('E') => app.export(),
        _ => {}
    }
}

/// Keys that only mean something on the map. Returns true when handled.
fn handle_map_only(app: &mut App, key: KeyEvent) -> bool {
    let (dx, dy) = PAN_STEP;
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => app.pan_by(dx, 0.0),
        KeyCode::Char('l') | KeyCode::Right => app.pan_by(-dx, 0.0),
        KeyCode::Char('k') | KeyCode::Up => app.pan_by(0.0, dy),
        KeyCode::Char('j') | KeyCode::Down => app.pan_by(0.0, -dy),
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_by(app.config.map.zoom_step),
        KeyCode::Char('-') => app.zoom_by(-app.config.map.zoom_step),
        KeyCode::Char('0') => app.reset_zoom(),
        KeyCode::Char('c') => app.center_view(),
        KeyCode::Char('n') => app.select_step(true),
        KeyCode::Char('N') => app.select_step(false),
        KeyCode::Char('p') => app.select_parent(),
        KeyCode::Esc => app.select(None),
        _ => return false,
    }
    true
}

/// Keys that only mean something in the list. Returns true when handled.
fn handle_list_only(app: &mut App, key: KeyEvent) -> bool {
    let count = app.list_row_ids().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.list_cursor + 1 < count {
                app.list_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.list_cursor = app.list_cursor.saturating_sub(1);
        }
        KeyCode::Char('g') | KeyCode::Home => app.list_cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.list_cursor = count.saturating_sub(1),
        KeyCode::Char('/') => app.mode = Mode::Search,
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Enter => {
            sync_list_selection(app);
            app.view = View::Map;
        }
        _ => return false,
    }
    true
}

fn sync_list_selection(app: &mut App) {
    if let Some(id) = app.list_row_ids().into_iter().nth(app.list_cursor) {
        app.select(Some(id));
    }
}
