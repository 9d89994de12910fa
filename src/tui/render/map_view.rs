use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use unicode_width::UnicodeWidthChar;

use crate::model::node::Node;
use crate::tui::app::{App, CELL_H, CELL_W};
use crate::util::unicode::{display_width, truncate_to_width};

/// Longest title shown on the map, in cells
pub const LABEL_MAX: usize = 18;

/// Where a node's label sits on screen. The glyph is at (`col`, `row`).
/// Columns may be negative or past the edge for nodes panned off screen.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLabel {
    pub id: String,
    pub col: i64,
    pub row: i64,
    pub text: String,
}

impl NodeLabel {
    pub fn contains(&self, col: i64, row: i64) -> bool {
        row == self.row && col >= self.col && col < self.col + display_width(&self.text) as i64
    }
}

fn label_text(node: &Node) -> String {
    format!("{} {}", node.glyph(), truncate_to_width(&node.title, LABEL_MAX))
}

/// Labels for every node the map draws, in storage order. Orphans are
/// skipped; their children still appear.
pub fn node_labels(app: &App, area: Rect) -> Vec<NodeLabel> {
    let tree = &app.map.nodes;
    tree.iter()
        .filter(|n| !tree.is_orphan(n))
        .map(|n| {
            let (sx, sy) = app.map.view.world_to_screen(n.x, n.y);
            NodeLabel {
                id: n.id.clone(),
                col: area.x as i64 + (sx / CELL_W).floor() as i64,
                row: area.y as i64 + (sy / CELL_H).floor() as i64,
                text: label_text(n),
            }
        })
        .collect()
}

/// The topmost node under a terminal cell. Later nodes draw over earlier ones.
pub fn node_at(app: &App, col: u16, row: u16) -> Option<String> {
    node_labels(app, app.map_area)
        .into_iter()
        .rev()
        .find(|l| l.contains(col as i64, row as i64))
        .map(|l| l.id)
}

fn node_style(app: &App, node: &Node) -> Style {
    let theme = &app.theme;
    let mut style = Style::default().bg(theme.background);
    style = if node.is_me {
        style.fg(theme.root).add_modifier(Modifier::BOLD)
    } else if node.is_category {
        style.fg(theme.category).add_modifier(Modifier::BOLD)
    } else if node.completed {
        style.fg(theme.green).add_modifier(Modifier::DIM)
    } else {
        style.fg(theme.priority_color(node.priority))
    };
    if app.selected.as_deref() == Some(node.id.as_str()) {
        style = style
            .bg(theme.selection_bg)
            .add_modifier(Modifier::UNDERLINED);
    }
    style
}

/// Render the map canvas: edges as braille lines, then node labels on top
pub fn render_map_view(frame: &mut Frame, app: &App, area: Rect) {
    if area.width == 0 || area.height == 0 {
        return;
    }
    let w = area.width as f64 * CELL_W;
    let h = area.height as f64 * CELL_H;
    let view = app.map.view;
    let tree = &app.map.nodes;

    // Canvas y grows upward
    let mut edges = Vec::new();
    for node in tree.iter() {
        if tree.is_orphan(node) {
            continue;
        }
        let Some(parent) = tree.parent_of(node) else {
            continue;
        };
        if tree.is_orphan(parent) {
            continue;
        }
        let (x1, y1) = view.world_to_screen(parent.x, parent.y);
        let (x2, y2) = view.world_to_screen(node.x, node.y);
        edges.push((x1, h - y1, x2, h - y2));
    }

    let edge_color = app.theme.edge;
    let canvas = Canvas::default()
        .background_color(app.theme.background)
        .marker(Marker::Braille)
        .x_bounds([0.0, w])
        .y_bounds([0.0, h])
        .paint(|ctx| {
            for &(x1, y1, x2, y2) in &edges {
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, edge_color));
            }
        });
    frame.render_widget(canvas, area);

    let labels = node_labels(app, area);
    let buf = frame.buffer_mut();
    for label in &labels {
        let Some(node) = tree.find_node(&label.id) else {
            continue;
        };
        draw_clipped(buf, area, label, node_style(app, node));
    }
}

/// Write a label, cutting whatever falls outside `area`
fn draw_clipped(buf: &mut Buffer, area: Rect, label: &NodeLabel, style: Style) {
    let top = area.y as i64;
    let bottom = top + area.height as i64;
    let left = area.x as i64;
    let right = left + area.width as i64;
    if label.row < top || label.row >= bottom || label.col >= right {
        return;
    }

    let mut col = label.col;
    let mut text = label.text.as_str();
    while col < left {
        let Some(ch) = text.chars().next() else {
            return;
        };
        col += ch.width().unwrap_or(0).max(1) as i64;
        text = &text[ch.len_utf8()..];
    }
    if text.is_empty() {
        return;
    }
    let max = (right - col) as usize;
    buf.set_stringn(col as u16, label.row as u16, text, max, style);
}
