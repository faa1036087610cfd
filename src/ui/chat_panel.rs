use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::model::chat::ChatSender;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let visible_height = area.height.saturating_sub(2) as usize;

    let mut all_lines: Vec<Line> = Vec::new();

    for msg in &app.chat_messages {
        let (who, color) = match msg.sender {
            ChatSender::User => ("you", Color::White),
            ChatSender::Assistant => ("devsense", Color::Magenta),
            ChatSender::System => ("system", Color::Yellow),
        };
        all_lines.push(Line::from(vec![
            Span::styled(format!("{} ", msg.timestamp), Style::default().fg(Color::DarkGray)),
            Span::styled(who, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ]));

        let body_color = match msg.sender {
            ChatSender::Assistant => Color::Rgb(0xCC, 0xCC, 0xCC),
            _ => color,
        };
        for text_line in msg.text.lines() {
            all_lines.push(Line::from(Span::styled(
                format!("  {text_line}"),
                Style::default().fg(body_color),
            )));
        }

        all_lines.push(Line::raw(""));
    }

    // Auto-scroll to bottom
    let total = all_lines.len();
    let skip = total.saturating_sub(visible_height);
    let visible_lines: Vec<Line> = all_lines.into_iter().skip(skip).collect();

    let msg_count = app.chat_messages.len();
    let title = if msg_count > 0 {
        format!(" Chat ({msg_count}) ")
    } else {
        " Chat: press : to ask ".to_string()
    };

    let paragraph = Paragraph::new(visible_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Magenta))
                .title(title),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(paragraph, area);
}
