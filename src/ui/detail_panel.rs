use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{priority_color, status_color, team_color};

fn field<'a>(label: &'a str, value: Span<'a>) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Gray)),
        value,
    ])
}

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Details ");

    let Some(t) = app.selected() else {
        f.render_widget(block, area);
        return;
    };

    let date = |d: Option<chrono::DateTime<chrono::Utc>>| {
        d.map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".into())
    };

    let mut lines: Vec<Line> = vec![
        Line::styled(t.key.clone(), Style::default().fg(Color::White)),
        field(
            "Status: ",
            Span::styled(t.status.clone(), Style::default().fg(status_color(t.status_category))),
        ),
        field(
            "Team: ",
            Span::styled(t.team.clone(), Style::default().fg(team_color(&t.team))),
        ),
        field(
            "Assignee: ",
            Span::raw(t.assignee_name().unwrap_or("Unassigned").to_string()),
        ),
    ];

    if let Some(sprint) = t.sprint_name() {
        lines.push(field("Sprint: ", Span::raw(sprint.to_string())));
    }
    if let Some(priority) = &t.priority {
        lines.push(field(
            "Priority: ",
            Span::styled(priority.clone(), Style::default().fg(priority_color(priority))),
        ));
    }
    if !t.labels.is_empty() {
        lines.push(field("Labels: ", Span::raw(t.labels.join(", "))));
    }
    lines.push(field("Created: ", Span::raw(date(t.created))));
    lines.push(field("Updated: ", Span::raw(date(t.updated))));
    if t.is_done() {
        lines.push(field("Resolved: ", Span::raw(date(t.resolved_at()))));
    }

    lines.push(Line::raw(""));
    lines.push(Line::raw(t.summary.clone()));
    if !t.description.is_empty() {
        lines.push(Line::raw(""));
        let truncated: String = t.description.chars().take(300).collect();
        lines.push(Line::styled(truncated, Style::default().fg(Color::DarkGray)));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
