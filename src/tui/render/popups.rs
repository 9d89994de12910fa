use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::tui::app::{App, ConfirmAction};
use crate::util::unicode::truncate_to_width;

use super::centered_rect_fixed;

fn popup_block(app: &App, title: &str) -> Block<'static> {
    let bg = app.theme.background;
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .style(Style::default().bg(bg))
}

/// Delete / reset confirmation
pub fn render_confirm(frame: &mut Frame, app: &App, area: Rect) {
    let Some(action) = &app.confirm else {
        return;
    };
    let bg = app.theme.background;
    let text = Style::default().fg(app.theme.text).bg(bg);
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);
    let warn = Style::default().fg(app.theme.red).bg(bg);

    let (title, mut lines) = match action {
        ConfirmAction::Delete { title, count, .. } => {
            let mut lines = vec![Line::from(vec![
                Span::styled(" Delete ", text),
                Span::styled(format!("\u{201c}{}\u{201d}", truncate_to_width(title, 28)), bright),
                Span::styled("?", text),
            ])];
            if *count > 1 {
                lines.push(Line::from(Span::styled(
                    format!(" {} nodes below it go too.", count - 1),
                    warn,
                )));
            }
            ("Delete", lines)
        }
        ConfirmAction::Reset => (
            "Reset",
            vec![
                Line::from(Span::styled(" Erase the whole map and start over", text)),
                Line::from(Span::styled(" with the default categories?", text)),
            ],
        ),
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" This can't be undone.  y / n", warn)));

    let popup = centered_rect_fixed(44, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .block(popup_block(app, title))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, popup);
}

/// Pick a new parent for the selected node
pub fn render_parent_picker(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let choices = app.parent_picker_choices();
    let current = app.selected_node().and_then(|n| n.parent_id.clone());

    let lines: Vec<Line> = choices
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let marker = if Some(&node.id) == current.as_ref() {
                "\u{2022}"
            } else {
                " "
            };
            let label = format!(" {} {}", marker, truncate_to_width(&node.title, 28));
            let style = if i == app.picker_cursor {
                Style::default()
                    .fg(app.theme.text_bright)
                    .bg(app.theme.selection_bg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(app.theme.text).bg(bg)
            };
            Line::from(Span::styled(label, style))
        })
        .collect();

    let height = (lines.len() as u16 + 2).min(area.height.saturating_sub(2));
    let popup = centered_rect_fixed(36, height, area);
    frame.render_widget(Clear, popup);

    // Keep the cursor in view when the list is taller than the popup
    let inner_h = height.saturating_sub(2) as usize;
    let scroll = app.picker_cursor.saturating_sub(inner_h.saturating_sub(1));
    let paragraph = Paragraph::new(lines)
        .block(popup_block(app, "Move under"))
        .scroll((scroll as u16, 0));
    frame.render_widget(paragraph, popup);
}

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Map",
        &[
            ("h j k l / arrows", "Pan"),
            ("+ - 0", "Zoom in / out / reset"),
            ("c", "Centre the map"),
            ("n N p", "Next / previous / parent"),
            ("mouse", "Click select, drag move or pan"),
            ("wheel", "Zoom"),
        ],
    ),
    (
        "Edit",
        &[
            ("a", "Add child"),
            ("e / o", "Edit title / notes"),
            ("1-5", "Set priority"),
            ("x", "Toggle completed"),
            ("L", "Lock / unlock title"),
            ("r", "Move under another parent"),
            ("d", "Delete with subtree"),
            ("R", "Reset everything"),
        ],
    ),
    (
        "List",
        &[
            ("j k", "Move cursor"),
            ("Enter", "Show on map"),
            ("/", "Search"),
            ("s", "Cycle sort"),
            ("E", "Export CSV"),
        ],
    ),
    (
        "General",
        &[("Tab", "Switch view"), ("?", "Help"), ("q", "Quit")],
    ),
];

/// Key binding overlay (toggled with ?)
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (i, (section, bindings)) in BINDINGS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!(" {}", section), header_style)));
        for (key, desc) in bindings.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<18}", key), key_style),
                Span::styled(*desc, desc_style),
            ]));
        }
    }

    let popup = centered_rect_fixed(54, lines.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(lines).block(popup_block(app, "Keys")),
        popup,
    );
}
