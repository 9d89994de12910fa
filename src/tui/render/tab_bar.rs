use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ops::list::list_items;
use crate::tui::app::{App, View};
use crate::util::unicode::display_width;

/// Render the tab bar: view tabs on the left, counts and zoom on the right
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let bg_style = Style::default().bg(bg);
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    let mut spans: Vec<Span> = vec![
        Span::styled(" ", bg_style),
        Span::styled("\u{2726}", Style::default().fg(app.theme.highlight).bg(bg)),
        Span::styled(" ", bg_style),
        Span::styled(" Map ", tab_style(app, app.view == View::Map)),
        sep.clone(),
        Span::styled(" List ", tab_style(app, app.view == View::List)),
        sep,
    ];

    let goals = list_items(&app.map.nodes);
    let done = goals.iter().filter(|n| n.completed).count();
    let right = format!(
        "{}/{} done  {:.0}% ",
        done,
        goals.len(),
        app.map.view.scale * 100.0
    );

    let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let right_w = display_width(&right);
    let width = area.width as usize;
    if used + right_w < width {
        spans.push(Span::styled(" ".repeat(width - used - right_w), bg_style));
        spans.push(Span::styled(right, Style::default().fg(app.theme.dim).bg(bg)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.dim).bg(app.theme.background)
    }
}
