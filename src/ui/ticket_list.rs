use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{status_color, team_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let visible = area.height.saturating_sub(2) as usize;
    // Keep the selection on screen
    let skip = (app.selected_ticket + 1).saturating_sub(visible);

    let items: Vec<ListItem> = app
        .tickets()
        .iter()
        .enumerate()
        .skip(skip)
        .take(visible)
        .map(|(i, t)| {
            let selected = i == app.selected_ticket;

            let key_span = Span::styled(
                format!("{:<10} ", t.key),
                Style::default().fg(status_color(t.status_category)),
            );

            let max_title = area.width.saturating_sub(32) as usize;
            let title: String = t.summary.chars().take(max_title).collect();
            let title_style = if selected {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let team_span = Span::styled(
                format!(" [{}]", t.team),
                Style::default().fg(team_color(&t.team)),
            );
            let who = t.assignee_name().unwrap_or("-");
            let who_span = Span::styled(format!(" {who}"), Style::default().fg(Color::DarkGray));

            ListItem::new(Line::from(vec![
                key_span,
                Span::styled(title, title_style),
                team_span,
                who_span,
            ]))
        })
        .collect();

    let title = format!(" Tickets ({}) ", app.tickets().len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );

    f.render_widget(list, area);
}
