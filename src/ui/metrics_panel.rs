use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::report::{self, ReportFilter};
use crate::ui::theme::team_color;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let report = report::build(app.tickets(), &ReportFilter::default());
    let bold = Style::default().add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Total ", Style::default().fg(Color::Gray)),
            Span::styled(report.total.to_string(), bold),
            Span::styled("  Closed ", Style::default().fg(Color::Gray)),
            Span::styled(format!("{:.1}%", report.progress), bold.fg(Color::Green)),
        ]),
        Line::raw(""),
        Line::styled("Status", bold),
    ];
    for (status, n) in &report.by_status {
        lines.push(Line::raw(format!("  {status}: {n}")));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Teams", bold));
    for (team, n) in &report.by_team {
        lines.push(Line::from(vec![
            Span::styled(format!("  {team}"), Style::default().fg(team_color(team))),
            Span::raw(format!(": {n}")),
        ]));
    }

    let loaded = app.session.dataset().loaded_at;
    let title = format!(
        " Metrics @ {} ",
        loaded.with_timezone(&chrono::Local).format("%H:%M")
    );
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(paragraph, area);
}
