pub mod list_view;
pub mod map_view;
pub mod panel;
pub mod popups;
pub mod status_row;
pub mod tab_bar;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode, View};

/// Width of the detail panel beside the map
pub const PANEL_WIDTH: u16 = 34;
/// Below this terminal width the panel is dropped and the map takes it all
pub const PANEL_MIN_TERM_WIDTH: u16 = 70;

/// Split the screen: tab bar (1 row) | content | status row (1 row)
pub fn screen_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Split the map view's content area into canvas and (optional) panel
pub fn map_chunks(content: Rect) -> (Rect, Option<Rect>) {
    if content.width < PANEL_MIN_TERM_WIDTH {
        return (content, None);
    }
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(PANEL_WIDTH)])
        .split(content);
    (chunks[0], Some(chunks[1]))
}

/// Where the map canvas lands for a full-screen `area`
pub fn map_canvas_area(area: Rect) -> Rect {
    map_chunks(screen_chunks(area)[1]).0
}

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let [tab_area, content, status_area] = screen_chunks(area);

    tab_bar::render_tab_bar(frame, app, tab_area);

    match app.view {
        View::Map => {
            let (canvas, panel_area) = map_chunks(content);
            app.map_area = canvas;
            map_view::render_map_view(frame, app, canvas);
            if let Some(panel_area) = panel_area {
                panel::render_panel(frame, app, panel_area);
            }
        }
        View::List => list_view::render_list_view(frame, app, content),
    }

    match app.mode {
        Mode::Confirm => popups::render_confirm(frame, app, area),
        Mode::ParentPicker => popups::render_parent_picker(frame, app, area),
        Mode::Help => popups::render_help(frame, app, area),
        Mode::Navigate | Mode::Edit | Mode::Search => {}
    }

    status_row::render_status_row(frame, app, status_area);
}

/// Center a fixed-size rect in `area`
pub(super) fn centered_rect_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

/// `★★★☆☆` for a priority, clamped
pub(super) fn priority_stars(priority: i64) -> String {
    let filled = crate::model::node::clamp_priority(priority) as usize;
    let mut s = "\u{2605}".repeat(filled);
    s.push_str(&"\u{2606}".repeat(5 - filled));
    s
}
