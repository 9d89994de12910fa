use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use crate::ops::list;
use crate::tui::app::{App, Mode};

use super::priority_stars;

/// Render the list view: search/sort header, goal table, summary footer
pub fn render_list_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // search + sort
            Constraint::Min(1),    // table
            Constraint::Length(1), // summary
        ])
        .split(area);

    app.clamp_list_cursor();
    // Header row of the table takes one line
    let visible = chunks[1].height.saturating_sub(1) as usize;
    if app.list_cursor < app.list_scroll {
        app.list_scroll = app.list_cursor;
    } else if visible > 0 && app.list_cursor >= app.list_scroll + visible {
        app.list_scroll = app.list_cursor + 1 - visible;
    }

    let app = &*app;
    let theme = &app.theme;
    let bg = theme.background;
    let dim = Style::default().fg(theme.dim).bg(bg);
    let text = Style::default().fg(theme.text).bg(bg);

    // Search + sort line
    let searching = app.mode == Mode::Search;
    let mut spans = vec![Span::styled(" / ", dim)];
    if app.search.is_empty() && !searching {
        spans.push(Span::styled("search", dim));
    } else {
        spans.push(Span::styled(
            app.search.clone(),
            Style::default().fg(theme.text_bright).bg(bg),
        ));
    }
    if searching {
        spans.push(Span::styled(
            "\u{258C}",
            Style::default().fg(theme.highlight).bg(bg),
        ));
    }
    let sort_label = app.sort.map_or("unsorted", |s| s.label());
    spans.push(Span::styled(format!("   sort: {}", sort_label), dim));
    frame.render_widget(Paragraph::new(Line::from(spans)).style(dim), chunks[0]);

    let view = list::project(&app.map.nodes, &app.search, app.sort);

    let header = Row::new(vec!["", "Title", "Category", "Priority", "Created"]).style(
        Style::default()
            .fg(theme.dim)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = view
        .rows
        .iter()
        .enumerate()
        .skip(app.list_scroll)
        .take(visible)
        .map(|(i, row)| {
            let node = row.node;
            let mark = if node.completed { "\u{2713}" } else { " " };
            let title_style = if node.completed {
                Style::default()
                    .fg(theme.green)
                    .bg(bg)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default().fg(theme.text_bright).bg(bg)
            };
            let mut r = Row::new(vec![
                Cell::from(mark).style(Style::default().fg(theme.green).bg(bg)),
                Cell::from(node.title.clone()).style(title_style),
                Cell::from(row.category.clone()).style(text),
                Cell::from(priority_stars(node.priority))
                    .style(Style::default().fg(theme.priority_color(node.priority)).bg(bg)),
                Cell::from(node.created_date()).style(dim),
            ]);
            if i == app.list_cursor {
                r = r.style(Style::default().bg(theme.selection_bg));
            }
            r
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(1),
            Constraint::Min(12),
            Constraint::Length(14),
            Constraint::Length(8),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .column_spacing(1)
    .style(Style::default().bg(bg));
    frame.render_widget(table, chunks[1]);

    let summary = if view.rows.is_empty() {
        " No goals match".to_string()
    } else {
        format!(" {}", view.summary())
    };
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(summary, dim))).style(dim),
        chunks[2],
    );
}
