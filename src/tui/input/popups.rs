use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

pub(super) fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_pending(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_pending(),
        _ => {}
    }
}

pub(super) fn handle_parent_picker(app: &mut App, key: KeyEvent) {
    let count = app.parent_picker_choices().len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            if app.picker_cursor + 1 < count {
                app.picker_cursor += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.picker_cursor = app.picker_cursor.saturating_sub(1);
        }
        KeyCode::Enter => app.commit_reparent(),
        KeyCode::Esc | KeyCode::Char('q') => app.mode = Mode::Navigate,
        _ => {}
    }
}

pub(super) fn handle_help(app: &mut App, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
    ) {
        app.mode = Mode::Navigate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::input::handle_key;
    use crate::tui::input::test_keys::*;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn delete_needs_y() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("work".into()));
        handle_key(&mut app, ch('d'));
        assert_eq!(app.mode, Mode::Confirm);
        handle_key(&mut app, ch('z'));
        assert_eq!(app.mode, Mode::Confirm);
        handle_key(&mut app, ch('y'));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.map.nodes.len(), 1);
        assert_eq!(app.store.load().unwrap().nodes.len(), 1);
    }

    #[test]
    fn delete_cancelled_with_n() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("run".into()));
        handle_key(&mut app, ch('d'));
        handle_key(&mut app, ch('n'));
        assert_eq!(app.map.nodes.len(), 4);
        assert!(app.confirm.is_none());
    }

    #[test]
    fn picker_moves_under_root() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("run".into()));
        handle_key(&mut app, ch('r'));
        assert_eq!(app.picker_cursor, 1);
        handle_key(&mut app, ch('k'));
        handle_key(&mut app, ch('k'));
        assert_eq!(app.picker_cursor, 0);
        handle_key(&mut app, key(KeyCode::Enter));
        let run = app.map.nodes.find_node("run").unwrap();
        assert_eq!(run.parent_id.as_deref(), Some("me"));
        assert_ne!(run.updated_at, "2025-03-14T12:00:00.000Z");
    }

    #[test]
    fn help_closes_on_esc() {
        let (_tmp, mut app) = app_with_map(sample_map());
        handle_key(&mut app, ch('?'));
        assert_eq!(app.mode, Mode::Help);
        handle_key(&mut app, ch('a'));
        assert_eq!(app.mode, Mode::Help);
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, Mode::Navigate);
    }
}
