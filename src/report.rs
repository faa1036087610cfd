use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::aggregate::{pct, tally, truncated_list};
use crate::model::ticket::NormalizedTicket;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub sprint: Option<String>,
    /// Inclusive range on the created date; `end` covers the whole day.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ReportFilter {
    pub fn sprint(name: &str) -> Self {
        Self {
            sprint: Some(name.to_string()),
            ..Self::default()
        }
    }

    fn start_instant(&self) -> Option<DateTime<Utc>> {
        self.start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc())
    }

    fn end_instant(&self) -> Option<DateTime<Utc>> {
        self.end
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc() + Duration::days(1) - Duration::seconds(1))
    }

    pub fn matches(&self, t: &NormalizedTicket) -> bool {
        if let Some(sprint) = &self.sprint {
            if !t.in_sprint(sprint) {
                return false;
            }
        }
        if let Some(start) = self.start_instant() {
            if !t.created.map_or(false, |c| c >= start) {
                return false;
            }
        }
        if let Some(end) = self.end_instant() {
            if !t.created.map_or(false, |c| c <= end) {
                return false;
            }
        }
        true
    }
}

pub struct SprintReport<'a> {
    pub label: String,
    pub by_status: Vec<(String, usize)>,
    pub by_team: Vec<(String, usize)>,
    pub total: usize,
    pub closed: usize,
    pub progress: f64,
    /// Most closures first.
    pub closed_by_member: Vec<(String, usize)>,
    pub load_by_member: Vec<(String, usize)>,
    pub open: Vec<&'a NormalizedTicket>,
    pub done: Vec<&'a NormalizedTicket>,
}

fn display_member(t: &NormalizedTicket) -> Option<String> {
    t.assignee_name()
        .filter(|n| !n.is_empty())
        .or_else(|| t.member())
        .map(str::to_string)
}

fn by_count_desc(mut counts: Vec<(String, usize)>) -> Vec<(String, usize)> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

pub fn build<'a>(tickets: &'a [NormalizedTicket], filter: &ReportFilter) -> SprintReport<'a> {
    let selected: Vec<&NormalizedTicket> = tickets.iter().filter(|t| filter.matches(t)).collect();
    let (done, open): (Vec<_>, Vec<_>) = selected.iter().copied().partition(|t| t.is_done());

    let label = match &filter.sprint {
        Some(s) => format!("sprint '{s}'"),
        None => "all tickets".to_string(),
    };

    SprintReport {
        label,
        by_status: by_count_desc(tally(selected.iter().map(|t| t.status.clone()))),
        by_team: by_count_desc(tally(selected.iter().map(|t| t.team.clone()))),
        total: selected.len(),
        closed: done.len(),
        progress: pct(done.len(), selected.len()),
        closed_by_member: by_count_desc(tally(done.iter().filter_map(|t| display_member(t)))),
        load_by_member: by_count_desc(tally(open.iter().filter_map(|t| display_member(t)))),
        open,
        done,
    }
}

impl SprintReport<'_> {
    pub fn render(&self) -> String {
        let counts = |title: &str, rows: &[(String, usize)]| {
            if rows.is_empty() {
                return format!("{title}\n  (none)");
            }
            let lines: Vec<String> = rows.iter().map(|(k, n)| format!("  {k}: {n}")).collect();
            format!("{title}\n{}", lines.join("\n"))
        };
        let list = |title: &str, rows: &[&NormalizedTicket]| {
            if rows.is_empty() {
                return format!("{title}\n  (none)");
            }
            let lines: Vec<String> = rows
                .iter()
                .map(|t| {
                    format!(
                        "- {}: {}  • {}  • {}",
                        t.key,
                        t.summary,
                        t.status,
                        t.assignee_name().unwrap_or("Unassigned")
                    )
                })
                .collect();
            format!("{title}\n{}", truncated_list(&lines))
        };

        [
            format!("Report for {}", self.label),
            format!(
                "Tickets: {}  Closed: {}  Progress: {:.1}%",
                self.total, self.closed, self.progress
            ),
            counts("By status:", &self.by_status),
            counts("By team:", &self.by_team),
            counts("Closed per member:", &self.closed_by_member),
            counts("Open load per member:", &self.load_by_member),
            list("Open tickets:", &self.open),
            list("Closed tickets:", &self.done),
        ]
        .join("\n\n")
    }
}
