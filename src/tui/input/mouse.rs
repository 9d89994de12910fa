use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::tui::app::{App, Mode, View};
use crate::tui::gesture::{GestureEnd, MOUSE};
use crate::tui::render::map_view::node_at;

/// Mouse on the map: press on a node to select or drag it, press on empty
/// space to pan, wheel to zoom.
pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // A release always ends the gesture, even after a key switched the view
    // or mode mid-press
    if mouse.kind == MouseEventKind::Up(MouseButton::Left) {
        finish_gesture(app);
        return;
    }
    if app.view != View::Map || app.mode != Mode::Navigate {
        return;
    }
    let inside = app.map_area.contains(Position::new(mouse.column, mouse.row));
    let px = app.cell_to_px(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) if inside => {
            match node_at(app, mouse.column, mouse.row) {
                Some(id) => app.gesture.press_node(MOUSE, &id, px, &app.map),
                None => app.gesture.press_background(MOUSE, px, &app.map),
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.gesture.motion(MOUSE, px, &mut app.map);
        }
        MouseEventKind::ScrollUp if inside => app.zoom_by(app.config.map.wheel_step),
        MouseEventKind::ScrollDown if inside => app.zoom_by(-app.config.map.wheel_step),
        _ => {}
    }
}

fn finish_gesture(app: &mut App) {
    let on_map = app.view == View::Map && app.mode == Mode::Navigate;
    match app.gesture.release(MOUSE) {
        GestureEnd::Select(id) if on_map => app.select(Some(id)),
        GestureEnd::Moved(id) => app.commit_drag(&id),
        GestureEnd::Panned => app.commit_pan(),
        _ => {}
    }
}
