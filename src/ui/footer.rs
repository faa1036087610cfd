use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![
        hint("↑↓", "navigate"),
        hint(":", "ask"),
        hint("a", "analyze"),
        hint("r", "refresh"),
        hint("x", "clear chat"),
        hint("q", "quit"),
    ];

    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!(" {} ", app.session.jira().project_key),
        Style::default().fg(Color::Black).bg(Color::Cyan),
    ));

    if let Some((msg, _)) = &app.flash_message {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Yellow)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(Color::DarkGray),
    )
}
