use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, EditField, Mode, View};
use crate::util::unicode::display_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (left, left_style) = match app.active_toast() {
        Some(toast) => (
            format!(" {}", toast),
            Style::default().fg(app.theme.highlight).bg(bg),
        ),
        None => match (app.mode, &app.edit) {
            (Mode::Edit, Some(edit)) => (
                match edit.field {
                    EditField::Title => " Editing title".to_string(),
                    EditField::Notes => " Editing notes".to_string(),
                },
                Style::default().fg(app.theme.text_bright).bg(bg),
            ),
            _ => (String::new(), Style::default().bg(bg)),
        },
    };

    let hint = match app.mode {
        Mode::Navigate => match app.view {
            View::Map => "a add  e edit  d delete  ? help  q quit ",
            View::List => "/ search  s sort  E export  ? help ",
        },
        Mode::Edit => "Enter save  Esc cancel ",
        Mode::Search => "Enter done  Esc clear ",
        Mode::Confirm => "y confirm  n cancel ",
        Mode::ParentPicker => "\u{2191}\u{2193} choose  Enter move  Esc cancel ",
        Mode::Help => "Esc close ",
    };

    let mut spans = vec![Span::styled(left.clone(), left_style)];
    let used = display_width(&left);
    let hint_w = display_width(hint);
    if used + hint_w < width {
        spans.push(Span::styled(
            " ".repeat(width - used - hint_w),
            Style::default().bg(bg),
        ));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
