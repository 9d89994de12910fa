use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::tui::app::{App, EditField, EditState, Mode};

use super::priority_stars;

const LABEL_W: usize = 9;

/// Render the detail panel for the selected node
pub fn render_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let label_style = Style::default().fg(theme.dim).bg(bg);
    let value_style = Style::default().fg(theme.text).bg(bg);
    let bright_style = Style::default()
        .fg(theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let edit_style = Style::default().fg(theme.highlight).bg(bg);

    let block = Block::default()
        .borders(Borders::LEFT)
        .border_style(Style::default().fg(theme.edge).bg(bg))
        .style(Style::default().bg(bg));

    let Some(node) = app.selected_node() else {
        let hint = Paragraph::new(Line::from(Span::styled(" Nothing selected", label_style)))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let editing = match (&app.edit, app.mode) {
        (Some(edit), Mode::Edit) if edit.node_id == node.id => Some(edit),
        _ => None,
    };

    let row = |label: &str, value: String, style: Style| -> Line<'static> {
        Line::from(vec![
            Span::styled(format!(" {:<width$}", label, width = LABEL_W), label_style),
            Span::styled(value, style),
        ])
    };

    let mut lines: Vec<Line> = Vec::new();

    match editing {
        Some(edit) if edit.field == EditField::Title => {
            lines.extend(edit_lines(edit, edit_style));
        }
        _ => lines.push(Line::from(Span::styled(format!(" {}", node.title), bright_style))),
    }
    lines.push(Line::from(""));

    lines.push(row("Kind", node.kind().to_string(), value_style));
    lines.push(row(
        "Title",
        if node.locked_title { "locked" } else { "editable" }.to_string(),
        value_style,
    ));
    lines.push(row(
        "Priority",
        priority_stars(node.priority),
        Style::default()
            .fg(theme.priority_color(node.priority))
            .bg(bg),
    ));
    if node.is_completable() {
        let (text, color) = if node.completed {
            ("\u{2713} completed", theme.green)
        } else {
            ("open", theme.text)
        };
        lines.push(row("Status", text.to_string(), Style::default().fg(color).bg(bg)));
    }
    if !node.is_me {
        let parent = match app.map.nodes.parent_of(node) {
            Some(p) => p.title.clone(),
            None => "(missing)".to_string(),
        };
        lines.push(row("Parent", parent, value_style));
        lines.push(row(
            "Category",
            app.map.nodes.root_category_of(node),
            value_style,
        ));
    }
    lines.push(row("Created", node.created_date(), value_style));
    let updated = node
        .updated_time()
        .map(|t| t.with_timezone(&chrono::Local).format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    lines.push(row("Updated", updated, value_style));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(" Notes", label_style)));

    match editing {
        Some(edit) if edit.field == EditField::Notes => {
            lines.extend(edit_lines(edit, edit_style));
        }
        _ if node.notes.is_empty() => {
            lines.push(Line::from(Span::styled(" (none)", label_style)));
        }
        _ => {
            for l in node.notes.lines() {
                lines.push(Line::from(Span::styled(format!(" {}", l), value_style)));
            }
        }
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// The edit buffer with a block cursor at the insertion point
fn edit_lines(edit: &EditState, style: Style) -> Vec<Line<'static>> {
    let mut at = edit.cursor.min(edit.buffer.len());
    while !edit.buffer.is_char_boundary(at) {
        at -= 1;
    }
    let text = format!("{}\u{258C}{}", &edit.buffer[..at], &edit.buffer[at..]);
    text.split('\n')
        .map(|l| Line::from(Span::styled(format!(" {}", l), style)))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::tui::app::EditField;
    use crate::tui::render::test_helpers::*;

    #[test]
    fn shows_selected_goal_details() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("run".into()));
        let out = render_app(&mut app, 100, 20);
        assert!(out.contains("Run 5k"));
        assert!(out.contains("Priority ★★★★☆"));
        assert!(out.contains("Status   open"));
        assert!(out.contains("Parent   Work"));
        assert!(out.contains("Category Work"));
        assert!(out.contains("Created  20"));
        assert!(out.contains("Before breakfast"));
    }

    #[test]
    fn root_has_no_status_or_parent() {
        let (_tmp, mut app) = app_with_map(sample_map());
        let out = render_app(&mut app, 100, 20);
        assert!(out.contains("Kind     root"));
        assert!(out.contains("Title    locked"));
        assert!(!out.contains("Status"));
        assert!(!out.contains("Parent"));
    }

    #[test]
    fn edit_buffer_replaces_title() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("run".into()));
        app.begin_edit(EditField::Title);
        let edit = app.edit.as_mut().unwrap();
        edit.buffer = "Run 10k".into();
        edit.cursor = edit.buffer.len();
        let out = render_app(&mut app, 100, 20);
        assert!(out.contains("Run 10k▌"));
    }

    #[test]
    fn cursor_sits_at_insertion_point() {
        let (_tmp, mut app) = app_with_map(sample_map());
        app.select(Some("run".into()));
        app.begin_edit(EditField::Title);
        app.edit.as_mut().unwrap().cursor = 3;
        let out = render_app(&mut app, 100, 20);
        assert!(out.contains("Run▌ 5k"));
    }
}
