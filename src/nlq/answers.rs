use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};

use crate::aggregate::{
    argmax, argmin, before, count_by, days_ago, group_by, group_sizes, pct, period_label, since,
    tally, truncated_list,
};
use crate::model::ticket::{NormalizedTicket, StatusCategory};
use crate::teams::Rosters;

use super::AnswerError;

pub type AnswerResult = Result<String, AnswerError>;

/// Everything an answer function may look at. `now` is passed in so that
/// every time window is measured from the same instant.
pub struct QueryContext<'a> {
    pub tickets: &'a [NormalizedTicket],
    pub rosters: &'a Rosters,
    pub now: DateTime<Utc>,
}

impl<'a> QueryContext<'a> {
    pub fn new(tickets: &'a [NormalizedTicket], rosters: &'a Rosters) -> Self {
        Self {
            tickets,
            rosters,
            now: Utc::now(),
        }
    }

    fn team(&self, team: &str) -> Vec<&'a NormalizedTicket> {
        self.tickets.iter().filter(|t| t.on_team(team)).collect()
    }

    fn sprint(&self, sprint: &str) -> Vec<&'a NormalizedTicket> {
        self.tickets.iter().filter(|t| t.in_sprint(sprint)).collect()
    }
}

fn key_line(t: &NormalizedTicket) -> String {
    format!("- {}: {}", t.key, t.summary)
}

fn listing<'t>(
    header: String,
    tickets: impl IntoIterator<Item = &'t NormalizedTicket>,
    line: impl Fn(&NormalizedTicket) -> String,
) -> String {
    let lines: Vec<String> = tickets.into_iter().map(line).collect();
    format!("{header}\n{}", truncated_list(&lines))
}

// Counting

pub fn how_many_backlog(ctx: &QueryContext) -> AnswerResult {
    let n = count_by(ctx.tickets, |t| t.is_backlog());
    Ok(format!("{n} ticket(s) are in the backlog."))
}

pub fn how_many_in_sprint(ctx: &QueryContext, sprint: &str) -> AnswerResult {
    let n = count_by(ctx.tickets, |t| t.in_sprint(sprint));
    Ok(format!("{n} ticket(s) are in sprint '{sprint}'."))
}

pub fn how_many_assigned_to(ctx: &QueryContext, person: &str) -> AnswerResult {
    let matches = |value: Option<&str>| value.map_or(false, |v| v.eq_ignore_ascii_case(person));
    let n = count_by(ctx.tickets, |t| {
        matches(t.assignee_name()) || matches(t.assignee_email())
    });
    Ok(format!("{n} ticket(s) are assigned to {person}."))
}

pub fn how_many_unassigned(ctx: &QueryContext) -> AnswerResult {
    let n = count_by(ctx.tickets, |t| t.is_unassigned());
    Ok(format!("{n} ticket(s) are unassigned."))
}

pub fn percent_closed(ctx: &QueryContext) -> AnswerResult {
    let total = ctx.tickets.len();
    let closed = count_by(ctx.tickets, |t| t.is_done());
    Ok(format!(
        "{:.1}% of tickets are closed ({closed}/{total}).",
        pct(closed, total)
    ))
}

pub fn closed_in_last(ctx: &QueryContext, days: i64) -> AnswerResult {
    let start = days_ago(ctx.now, days);
    let n = count_by(ctx.tickets, |t| since(t.resolved_at(), start));
    Ok(format!(
        "{n} ticket(s) closed in the last {}.",
        period_label(days)
    ))
}

pub fn in_progress_count(ctx: &QueryContext) -> AnswerResult {
    let n = count_by(ctx.tickets, |t| {
        t.status_category == StatusCategory::InProgress
    });
    Ok(format!("{n} ticket(s) are currently in progress."))
}

pub fn list_active(ctx: &QueryContext) -> AnswerResult {
    let active: Vec<_> = ctx.tickets.iter().filter(|t| t.is_open()).collect();
    if active.is_empty() {
        return Ok("No active tickets.".into());
    }
    Ok(listing("Active tickets:".into(), active, |t| {
        format!(
            "- {}: {}  • {}  • {}",
            t.key,
            t.summary,
            t.status,
            t.assignee_name().unwrap_or("Unassigned")
        )
    }))
}

pub fn count_by_status(ctx: &QueryContext) -> AnswerResult {
    if ctx.tickets.is_empty() {
        return Ok("No tickets found.".into());
    }
    let mut buckets = tally(ctx.tickets.iter().map(|t| {
        if t.status.is_empty() {
            "Unknown".to_string()
        } else {
            t.status.clone()
        }
    }));
    buckets.sort_by(|a, b| a.0.cmp(&b.0));
    let lines: Vec<String> = buckets.iter().map(|(s, n)| format!("{s}: {n}")).collect();
    Ok(format!("Tickets by status:\n{}", lines.join("\n")))
}

pub fn list_closed(ctx: &QueryContext) -> AnswerResult {
    let closed: Vec<_> = ctx.tickets.iter().filter(|t| t.is_done()).collect();
    if closed.is_empty() {
        return Ok("No closed tickets found.".into());
    }
    let header = format!("Found {} closed ticket(s):", closed.len());
    Ok(listing(header, closed, |t| {
        let resolved = t
            .resolved_at()
            .map(|r| r.format("%d %b %Y").to_string())
            .unwrap_or_else(|| "N/A".into());
        format!("- {}: {}  • Resolved: {resolved}", t.key, t.summary)
    }))
}

// Teams

pub fn team_most_tickets(ctx: &QueryContext) -> AnswerResult {
    let sizes = tally(ctx.tickets.iter().map(|t| t.team.clone()));
    Ok(match argmax(&sizes) {
        Some((team, n)) => format!("Team with the most tickets: {team} ({n})."),
        None => "No tickets found.".into(),
    })
}

pub fn team_least_tickets(ctx: &QueryContext) -> AnswerResult {
    let sizes = tally(ctx.tickets.iter().map(|t| t.team.clone()));
    Ok(match argmin(&sizes) {
        Some((team, n)) => format!("Team with the least tickets: {team} ({n})."),
        None => "No tickets found.".into(),
    })
}

pub fn team_percent_closed(ctx: &QueryContext, team: &str) -> AnswerResult {
    let tickets = ctx.team(team);
    if tickets.is_empty() {
        return Ok(format!("No tickets for team '{team}'."));
    }
    let closed = tickets.iter().filter(|t| t.is_done()).count();
    Ok(format!(
        "{:.1}% of {team} tickets are closed ({closed}/{}).",
        pct(closed, tickets.len()),
        tickets.len()
    ))
}

pub fn backlog_for_team(ctx: &QueryContext, team: &str) -> AnswerResult {
    let backlog: Vec<_> = ctx
        .team(team)
        .into_iter()
        .filter(|t| t.is_backlog())
        .collect();
    if backlog.is_empty() {
        return Ok(format!("No backlog tickets for team '{team}'."));
    }
    Ok(listing(
        format!("Backlog tickets for {team}:"),
        backlog,
        key_line,
    ))
}

// Members

#[derive(Debug, Default, Clone, Copy)]
struct Activity {
    assigned: usize,
    closed: usize,
}

impl Activity {
    fn efficiency(&self) -> f64 {
        self.closed as f64 / self.assigned.max(1) as f64
    }
}

pub fn most_efficient_member(ctx: &QueryContext, team: &str, days: i64) -> AnswerResult {
    let tickets = ctx.team(team);
    if tickets.is_empty() {
        return Ok(format!("No tickets for team '{team}'."));
    }
    let start = days_ago(ctx.now, days);

    // Members appear once they have any activity in the window.
    let mut activity: Vec<(String, Activity)> = Vec::new();
    for t in &tickets {
        let Some(member) = t.member() else { continue };
        let created = since(t.created, start);
        let closed = since(t.resolved_at(), start);
        if !created && !closed {
            continue;
        }
        let slot = match activity.iter().position(|(m, _)| m == member) {
            Some(i) => i,
            None => {
                activity.push((member.to_string(), Activity::default()));
                activity.len() - 1
            }
        };
        if created {
            activity[slot].1.assigned += 1;
        }
        if closed {
            activity[slot].1.closed += 1;
        }
    }

    if activity.is_empty() {
        return Ok(format!("No assignees found for team '{team}'."));
    }
    activity.sort_by(|a, b| b.1.efficiency().total_cmp(&a.1.efficiency()));
    let (member, a) = &activity[0];
    Ok(format!(
        "Most efficient member in {team}: {member} (closed {} / assigned {} last {days} days, efficiency {:.2}).",
        a.closed,
        a.assigned,
        a.efficiency()
    ))
}

pub fn least_active_member(ctx: &QueryContext, team: &str, days: i64) -> AnswerResult {
    let start = days_ago(ctx.now, days);
    let closers = tally(
        ctx.team(team)
            .into_iter()
            .filter(|t| since(t.resolved_at(), start))
            .filter_map(|t| t.member()),
    );
    Ok(match argmin(&closers) {
        Some((member, n)) => format!(
            "Least active member in {team}: {member} ({n} ticket(s) closed in last {days} days)."
        ),
        None => format!("No resolved tickets for team '{team}' in last {days} days."),
    })
}

pub fn member_most_open(ctx: &QueryContext) -> AnswerResult {
    let open = tally(
        ctx.tickets
            .iter()
            .filter(|t| t.is_open())
            .filter_map(|t| t.member()),
    );
    Ok(match argmax(&open) {
        Some((member, n)) => format!("Member with most unclosed tickets: {member} ({n})."),
        None => "No open tickets per member.".into(),
    })
}

/// First instant of the calendar month before the one containing `now`,
/// and the first instant of `now`'s month.
fn last_month(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let (year, month) = (now.year(), now.month());
    let this_month = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (py, pm) = if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    };
    let prev_month = NaiveDate::from_ymd_opt(py, pm, 1)?;
    Some((
        prev_month.and_hms_opt(0, 0, 0)?.and_utc(),
        this_month.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

pub fn top_closer_last_month(ctx: &QueryContext) -> AnswerResult {
    let Some((start, end)) = last_month(ctx.now) else {
        return Ok("No tickets were closed last month.".into());
    };
    let closers = tally(
        ctx.tickets
            .iter()
            .filter(|t| since(t.resolved_at(), start) && before(t.resolved_at(), end))
            .filter_map(|t| t.member()),
    );
    Ok(match argmax(&closers) {
        Some((member, n)) => format!("{member} closed the most tickets last month ({n})."),
        None => "No tickets were closed last month.".into(),
    })
}

/// Open tickets per member across the whole project.
pub fn open_load(tickets: &[NormalizedTicket], member: &str) -> usize {
    tickets
        .iter()
        .filter(|t| t.is_open() && t.member().map_or(false, |m| m.eq_ignore_ascii_case(member)))
        .count()
}

pub fn best_suited_for(ctx: &QueryContext, key: &str) -> AnswerResult {
    let ticket = ctx
        .tickets
        .iter()
        .find(|t| t.key.eq_ignore_ascii_case(key))
        .ok_or_else(|| AnswerError::TicketNotFound(key.to_uppercase()))?;

    let roster = ctx.rosters.members(&ticket.team);
    let mut best: Option<(&str, usize)> = None;
    for member in roster {
        let load = open_load(ctx.tickets, member);
        if best.map_or(true, |(_, b)| load < b) {
            best = Some((member, load));
        }
    }
    Ok(match best {
        Some((member, load)) => format!(
            "Best suited for {}: {member} (team {}, current open load {load}).",
            ticket.key, ticket.team
        ),
        None => format!("No members found for team {}.", ticket.team),
    })
}

// Time

pub fn created_in_last(ctx: &QueryContext, days: i64) -> AnswerResult {
    let start = days_ago(ctx.now, days);
    let n = count_by(ctx.tickets, |t| since(t.created, start));
    Ok(format!(
        "{n} ticket(s) were created in the last {}.",
        period_label(days)
    ))
}

pub fn resolved_in_last(ctx: &QueryContext, days: i64) -> AnswerResult {
    let start = days_ago(ctx.now, days);
    let n = count_by(ctx.tickets, |t| since(t.resolved_at(), start));
    Ok(format!(
        "{n} ticket(s) were resolved in the last {}.",
        period_label(days)
    ))
}

/// Tickets whose status is `status` and that have not been touched for `days`.
pub fn stale_in_status(ctx: &QueryContext, status: &str, days: i64) -> AnswerResult {
    let cutoff = days_ago(ctx.now, days);
    let stale: Vec<_> = ctx
        .tickets
        .iter()
        .filter(|t| t.status.eq_ignore_ascii_case(status) && before(t.updated, cutoff))
        .collect();
    if stale.is_empty() {
        return Ok(format!(
            "No tickets in '{status}' for more than {days} days."
        ));
    }
    Ok(listing(
        format!("Tickets in '{status}' for more than {days} days:"),
        stale,
        key_line,
    ))
}

pub fn changed_last_24h(ctx: &QueryContext) -> AnswerResult {
    let start = ctx.now - Duration::hours(24);
    let changed: Vec<_> = ctx
        .tickets
        .iter()
        .filter(|t| since(t.updated, start))
        .collect();
    if changed.is_empty() {
        return Ok("No tickets changed status in the last 24 hours.".into());
    }
    Ok(listing("Recently changed (24h):".into(), changed, |t| {
        let updated = t
            .updated
            .map(|u| u.with_timezone(&Local).format("%d %b %Y %H:%M").to_string())
            .unwrap_or_default();
        format!("- {}: {}  • updated {updated}", t.key, t.summary)
    }))
}

pub fn idle_for_more_than(ctx: &QueryContext, days: i64) -> AnswerResult {
    let cutoff = days_ago(ctx.now, days);
    let idle: Vec<_> = ctx
        .tickets
        .iter()
        .filter(|t| t.is_open() && before(t.updated, cutoff))
        .collect();
    if idle.is_empty() {
        return Ok(format!("No tickets idle for more than {days} days."));
    }
    Ok(listing(
        format!("Tickets idle for more than {days} days:"),
        idle,
        key_line,
    ))
}

// Sprints

pub fn sprint_unassigned(ctx: &QueryContext, sprint: &str) -> AnswerResult {
    let n = ctx
        .sprint(sprint)
        .into_iter()
        .filter(|t| t.is_unassigned())
        .count();
    Ok(format!("{n} unassigned ticket(s) in sprint '{sprint}'."))
}

pub fn sprint_overloaded(ctx: &QueryContext, sprint: &str) -> AnswerResult {
    let mut load = tally(
        ctx.sprint(sprint)
            .into_iter()
            .filter(|t| t.is_open())
            .filter_map(|t| t.member()),
    );
    if load.is_empty() {
        return Ok(format!(
            "No assigned, open tickets in sprint '{sprint}'."
        ));
    }
    let total: usize = load.iter().map(|(_, n)| n).sum();
    let threshold = total.div_ceil(load.len());
    load.retain(|(_, n)| *n > threshold);
    if load.is_empty() {
        return Ok(format!(
            "No overloaded members detected in sprint '{sprint}'."
        ));
    }
    load.sort_by(|a, b| b.1.cmp(&a.1));
    let lines: Vec<String> = load
        .iter()
        .map(|(m, n)| format!("- {m}: {n} open in sprint (avg threshold {threshold})"))
        .collect();
    Ok(format!(
        "Overloaded members in sprint '{sprint}':\n{}",
        truncated_list(&lines)
    ))
}

pub fn sprint_team_most(ctx: &QueryContext, sprint: &str) -> AnswerResult {
    let groups = group_by(ctx.sprint(sprint), |t| t.team.clone());
    let sizes = group_sizes(&groups);
    Ok(match argmax(&sizes) {
        Some((team, n)) => format!("In sprint '{sprint}', {team} has the most tickets ({n})."),
        None => format!("No tickets in sprint '{sprint}'."),
    })
}

pub fn sprint_closure_rate(ctx: &QueryContext, sprint: &str) -> AnswerResult {
    let tickets = ctx.sprint(sprint);
    if tickets.is_empty() {
        return Ok(format!("No tickets in sprint '{sprint}'."));
    }
    let done = tickets.iter().filter(|t| t.is_done()).count();
    Ok(format!(
        "Sprint '{sprint}' closure rate: {:.1}% ({done}/{}).",
        pct(done, tickets.len()),
        tickets.len()
    ))
}

// Backlog health

pub fn backlog_size_by_team(ctx: &QueryContext) -> AnswerResult {
    let mut sizes = tally(
        ctx.tickets
            .iter()
            .filter(|t| t.is_backlog())
            .map(|t| t.team.clone()),
    );
    if sizes.is_empty() {
        return Ok("Backlog is empty.".into());
    }
    sizes.sort_by(|a, b| a.0.cmp(&b.0));
    let lines: Vec<String> = sizes.iter().map(|(t, n)| format!("- {t}: {n}")).collect();
    Ok(format!("Backlog size by team:\n{}", lines.join("\n")))
}

pub fn backlog_growth(ctx: &QueryContext, days: i64) -> AnswerResult {
    let start = days_ago(ctx.now, days);
    let created = count_by(ctx.tickets, |t| since(t.created, start));
    let resolved = count_by(ctx.tickets, |t| since(t.resolved_at(), start));
    let delta = created as i64 - resolved as i64;
    let trend = match delta {
        d if d > 0 => "grew",
        d if d < 0 => "shrunk",
        _ => "stayed flat",
    };
    Ok(format!(
        "Backlog {trend} by {} in the last {days} days (created {created}, resolved {resolved}).",
        delta.abs()
    ))
}

pub fn backlog_older_than(ctx: &QueryContext, days: i64) -> AnswerResult {
    let cutoff = days_ago(ctx.now, days);
    let old: Vec<_> = ctx
        .tickets
        .iter()
        .filter(|t| t.is_backlog() && before(t.created, cutoff))
        .collect();
    if old.is_empty() {
        return Ok(format!("No backlog tickets older than {days} days."));
    }
    Ok(listing(
        format!("Backlog tickets older than {days} days:"),
        old,
        key_line,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TeamConfig;
    use crate::model::ticket::{ticket, Assignee, Sprint};

    fn now() -> DateTime<Utc> {
        "2024-06-15T12:00:00Z".parse().unwrap()
    }

    fn t(key: &str, category: StatusCategory) -> NormalizedTicket {
        let mut t = ticket(key, category);
        t.created = Some(now() - Duration::days(2));
        t.updated = Some(now() - Duration::days(1));
        t
    }

    fn assigned(mut t: NormalizedTicket, email: &str) -> NormalizedTicket {
        t.assignee = Some(Assignee {
            name: Some(email.split('@').next().unwrap_or(email).to_string()),
            email: Some(email.to_string()),
        });
        t
    }

    fn on_team(mut t: NormalizedTicket, team: &str) -> NormalizedTicket {
        t.team = team.to_string();
        t
    }

    fn in_sprint(mut t: NormalizedTicket, name: &str) -> NormalizedTicket {
        t.sprint = Some(Sprint {
            name: name.to_string(),
            state: Some("active".into()),
        });
        t
    }

    fn resolved(mut t: NormalizedTicket, days_back: i64) -> NormalizedTicket {
        t.resolved = Some(now() - Duration::days(days_back));
        t
    }

    fn ctx<'a>(tickets: &'a [NormalizedTicket], rosters: &'a Rosters) -> QueryContext<'a> {
        QueryContext {
            tickets,
            rosters,
            now: now(),
        }
    }

    fn rosters(teams: &[(&str, &[&str])]) -> Rosters {
        let config: Vec<TeamConfig> = teams
            .iter()
            .map(|(name, members)| TeamConfig {
                name: name.to_string(),
                skills: String::new(),
                members: members.iter().map(|m| m.to_string()).collect(),
            })
            .collect();
        Rosters::from_config(&config)
    }

    #[test]
    fn backlog_counts_to_do_without_sprint() {
        let r = Rosters::default();
        let mut tickets = vec![
            t("A-1", StatusCategory::ToDo),
            t("A-2", StatusCategory::ToDo),
            t("A-3", StatusCategory::InProgress),
        ];
        assert_eq!(
            how_many_backlog(&ctx(&tickets, &r)).unwrap(),
            "2 ticket(s) are in the backlog."
        );

        tickets.push(in_sprint(t("A-4", StatusCategory::ToDo), "S1"));
        assert_eq!(
            how_many_backlog(&ctx(&tickets, &r)).unwrap(),
            "2 ticket(s) are in the backlog."
        );
    }

    #[test]
    fn percent_closed_on_empty_table_is_zero() {
        let r = Rosters::default();
        assert_eq!(
            percent_closed(&ctx(&[], &r)).unwrap(),
            "0.0% of tickets are closed (0/0)."
        );
    }

    #[test]
    fn percent_closed_rounds() {
        let r = Rosters::default();
        let tickets = vec![
            t("A-1", StatusCategory::Done),
            t("A-2", StatusCategory::Done),
            t("A-3", StatusCategory::ToDo),
        ];
        assert_eq!(
            percent_closed(&ctx(&tickets, &r)).unwrap(),
            "66.7% of tickets are closed (2/3)."
        );
    }

    #[test]
    fn assigned_to_matches_name_or_email() {
        let r = Rosters::default();
        let tickets = vec![
            assigned(t("A-1", StatusCategory::ToDo), "alice@x.com"),
            assigned(t("A-2", StatusCategory::Done), "bob@x.com"),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            how_many_assigned_to(&c, "ALICE").unwrap(),
            "1 ticket(s) are assigned to ALICE."
        );
        assert_eq!(
            how_many_assigned_to(&c, "bob@x.com").unwrap(),
            "1 ticket(s) are assigned to bob@x.com."
        );
    }

    #[test]
    fn closed_window_uses_week_label() {
        let r = Rosters::default();
        let tickets = vec![
            resolved(t("A-1", StatusCategory::Done), 3),
            resolved(t("A-2", StatusCategory::Done), 10),
            // resolution date on a reopened ticket does not count
            resolved(t("A-3", StatusCategory::InProgress), 1),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            closed_in_last(&c, 7).unwrap(),
            "1 ticket(s) closed in the last week."
        );
        assert_eq!(
            closed_in_last(&c, 14).unwrap(),
            "2 ticket(s) closed in the last 14 days."
        );
    }

    #[test]
    fn list_active_truncates_at_fifty() {
        let r = Rosters::default();
        let tickets: Vec<_> = (0..75)
            .map(|i| t(&format!("A-{i}"), StatusCategory::ToDo))
            .collect();
        let out = list_active(&ctx(&tickets, &r)).unwrap();
        assert_eq!(out.lines().filter(|l| l.starts_with("- A-")).count(), 50);
        assert!(out.ends_with("(and 25 more...)"));
        assert!(out.contains("  • To Do  • Unassigned"));
    }

    #[test]
    fn empty_results_are_polite() {
        let r = Rosters::default();
        let c = ctx(&[], &r);
        assert_eq!(list_active(&c).unwrap(), "No active tickets.");
        assert_eq!(list_closed(&c).unwrap(), "No closed tickets found.");
        assert_eq!(team_most_tickets(&c).unwrap(), "No tickets found.");
        assert_eq!(member_most_open(&c).unwrap(), "No open tickets per member.");
        assert_eq!(backlog_size_by_team(&c).unwrap(), "Backlog is empty.");
        assert_eq!(
            top_closer_last_month(&c).unwrap(),
            "No tickets were closed last month."
        );
        assert_eq!(
            sprint_closure_rate(&c, "S1").unwrap(),
            "No tickets in sprint 'S1'."
        );
    }

    #[test]
    fn status_buckets_are_sorted() {
        let r = Rosters::default();
        let mut blocked = t("A-3", StatusCategory::InProgress);
        blocked.status = "Blocked".into();
        let tickets = vec![
            t("A-1", StatusCategory::ToDo),
            blocked,
            t("A-2", StatusCategory::ToDo),
        ];
        assert_eq!(
            count_by_status(&ctx(&tickets, &r)).unwrap(),
            "Tickets by status:\nBlocked: 1\nTo Do: 2"
        );
    }

    #[test]
    fn team_extremes_prefer_first_seen_on_ties() {
        let r = Rosters::default();
        let tickets = vec![
            on_team(t("A-1", StatusCategory::ToDo), "QA"),
            on_team(t("A-2", StatusCategory::ToDo), "Backend"),
            on_team(t("A-3", StatusCategory::ToDo), "Backend"),
            on_team(t("A-4", StatusCategory::ToDo), "QA"),
            on_team(t("A-5", StatusCategory::ToDo), "DevOps"),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            team_most_tickets(&c).unwrap(),
            "Team with the most tickets: QA (2)."
        );
        assert_eq!(
            team_least_tickets(&c).unwrap(),
            "Team with the least tickets: DevOps (1)."
        );
    }

    #[test]
    fn team_percent_closed_and_backlog() {
        let r = Rosters::default();
        let tickets = vec![
            on_team(t("A-1", StatusCategory::Done), "QA"),
            on_team(t("A-2", StatusCategory::ToDo), "QA"),
            on_team(t("A-3", StatusCategory::ToDo), "Backend"),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            team_percent_closed(&c, "qa").unwrap(),
            "50.0% of qa tickets are closed (1/2)."
        );
        assert_eq!(
            team_percent_closed(&c, "Mobile").unwrap(),
            "No tickets for team 'Mobile'."
        );
        assert_eq!(
            backlog_for_team(&c, "QA").unwrap(),
            "Backlog tickets for QA:\n- A-2: Summary of A-2"
        );
        assert_eq!(
            backlog_for_team(&c, "DevOps").unwrap(),
            "No backlog tickets for team 'DevOps'."
        );
    }

    #[test]
    fn efficiency_ranks_closed_over_assigned() {
        let r = Rosters::default();
        let tickets = vec![
            // alice: 2 created, 2 closed
            on_team(resolved(assigned(t("A-1", StatusCategory::Done), "alice@x.com"), 1), "QA"),
            on_team(resolved(assigned(t("A-2", StatusCategory::Done), "alice@x.com"), 1), "QA"),
            // bob: 2 created, 1 closed
            on_team(resolved(assigned(t("A-3", StatusCategory::Done), "bob@x.com"), 1), "QA"),
            on_team(assigned(t("A-4", StatusCategory::ToDo), "bob@x.com"), "QA"),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            most_efficient_member(&c, "QA", 30).unwrap(),
            "Most efficient member in QA: alice@x.com (closed 2 / assigned 2 last 30 days, efficiency 1.00)."
        );
        assert_eq!(
            least_active_member(&c, "QA", 30).unwrap(),
            "Least active member in QA: bob@x.com (1 ticket(s) closed in last 30 days)."
        );
        assert_eq!(
            least_active_member(&c, "Backend", 30).unwrap(),
            "No resolved tickets for team 'Backend' in last 30 days."
        );
    }

    #[test]
    fn efficiency_without_activity() {
        let r = Rosters::default();
        let mut old = on_team(assigned(t("A-1", StatusCategory::ToDo), "a@x.com"), "QA");
        old.created = Some(now() - Duration::days(90));
        let tickets = vec![old];
        assert_eq!(
            most_efficient_member(&ctx(&tickets, &r), "QA", 30).unwrap(),
            "No assignees found for team 'QA'."
        );
    }

    #[test]
    fn member_with_most_open() {
        let r = Rosters::default();
        let tickets = vec![
            assigned(t("A-1", StatusCategory::ToDo), "a@x.com"),
            assigned(t("A-2", StatusCategory::InProgress), "b@x.com"),
            assigned(t("A-3", StatusCategory::ToDo), "b@x.com"),
            assigned(t("A-4", StatusCategory::Done), "a@x.com"),
        ];
        assert_eq!(
            member_most_open(&ctx(&tickets, &r)).unwrap(),
            "Member with most unclosed tickets: b@x.com (2)."
        );
    }

    #[test]
    fn top_closer_uses_previous_calendar_month() {
        let r = Rosters::default();
        // now is 15 June; May covers 15..45 days back
        let tickets = vec![
            resolved(assigned(t("A-1", StatusCategory::Done), "a@x.com"), 20),
            resolved(assigned(t("A-2", StatusCategory::Done), "b@x.com"), 35),
            resolved(assigned(t("A-3", StatusCategory::Done), "b@x.com"), 40),
            resolved(assigned(t("A-4", StatusCategory::Done), "a@x.com"), 5),
        ];
        assert_eq!(
            top_closer_last_month(&ctx(&tickets, &r)).unwrap(),
            "b@x.com closed the most tickets last month (2)."
        );
    }

    #[test]
    fn last_month_wraps_year() {
        let jan: DateTime<Utc> = "2024-01-10T00:00:00Z".parse().unwrap();
        let (start, end) = last_month(jan).unwrap();
        assert_eq!(start.to_rfc3339(), "2023-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn best_suited_uses_project_wide_load() {
        let r = rosters(&[("QA", &["a@x.com", "b@x.com"])]);
        let tickets = vec![
            on_team(t("QA-1", StatusCategory::ToDo), "QA"),
            // a@x.com is busy on another team's ticket
            on_team(assigned(t("BE-1", StatusCategory::InProgress), "a@x.com"), "Backend"),
            on_team(assigned(t("BE-2", StatusCategory::Done), "b@x.com"), "Backend"),
        ];
        assert_eq!(
            best_suited_for(&ctx(&tickets, &r), "qa-1").unwrap(),
            "Best suited for QA-1: b@x.com (team QA, current open load 0)."
        );
    }

    #[test]
    fn best_suited_ties_go_to_roster_order() {
        let r = rosters(&[("QA", &["a@x.com", "b@x.com"])]);
        let tickets = vec![on_team(t("QA-1", StatusCategory::ToDo), "QA")];
        assert!(best_suited_for(&ctx(&tickets, &r), "QA-1")
            .unwrap()
            .contains(": a@x.com "));
    }

    #[test]
    fn best_suited_errors_and_empty_roster() {
        let r = rosters(&[("QA", &[])]);
        let tickets = vec![on_team(t("QA-1", StatusCategory::ToDo), "QA")];
        let c = ctx(&tickets, &r);
        assert!(matches!(
            best_suited_for(&c, "QA-9"),
            Err(AnswerError::TicketNotFound(k)) if k == "QA-9"
        ));
        assert_eq!(
            best_suited_for(&c, "QA-1").unwrap(),
            "No members found for team QA."
        );
    }

    #[test]
    fn stale_and_idle_use_updated() {
        let r = Rosters::default();
        let mut stale = t("A-1", StatusCategory::ToDo);
        stale.updated = Some(now() - Duration::days(20));
        let mut done_old = t("A-2", StatusCategory::Done);
        done_old.updated = Some(now() - Duration::days(20));
        let tickets = vec![stale, done_old, t("A-3", StatusCategory::ToDo)];
        let c = ctx(&tickets, &r);

        assert_eq!(
            stale_in_status(&c, "To Do", 14).unwrap(),
            "Tickets in 'To Do' for more than 14 days:\n- A-1: Summary of A-1"
        );
        assert_eq!(
            stale_in_status(&c, "In Progress", 14).unwrap(),
            "No tickets in 'In Progress' for more than 14 days."
        );
        assert_eq!(
            idle_for_more_than(&c, 7).unwrap(),
            "Tickets idle for more than 7 days:\n- A-1: Summary of A-1"
        );
    }

    #[test]
    fn changed_in_last_day() {
        let r = Rosters::default();
        let mut recent = t("A-1", StatusCategory::ToDo);
        recent.updated = Some(now() - Duration::hours(3));
        let mut older = t("A-2", StatusCategory::ToDo);
        older.updated = Some(now() - Duration::hours(25));
        let mut boundary = t("A-3", StatusCategory::ToDo);
        boundary.updated = Some(now() - Duration::hours(24));
        let tickets = vec![recent, older, boundary];
        let out = changed_last_24h(&ctx(&tickets, &r)).unwrap();
        assert!(out.starts_with("Recently changed (24h):\n- A-1: Summary of A-1  • updated "));
        assert!(!out.contains("A-2"));
        // exactly 24h back is still inside the window
        assert!(out.contains("- A-3: Summary of A-3"));
    }

    #[test]
    fn sprint_answers() {
        let r = Rosters::default();
        let tickets = vec![
            on_team(in_sprint(assigned(t("S-1", StatusCategory::ToDo), "a@x.com"), "Sprint 7"), "QA"),
            on_team(in_sprint(assigned(t("S-2", StatusCategory::ToDo), "a@x.com"), "Sprint 7"), "QA"),
            on_team(in_sprint(assigned(t("S-3", StatusCategory::ToDo), "a@x.com"), "Sprint 7"), "Backend"),
            on_team(in_sprint(assigned(t("S-4", StatusCategory::ToDo), "b@x.com"), "Sprint 7"), "Backend"),
            on_team(in_sprint(t("S-5", StatusCategory::Done), "Sprint 7"), "Backend"),
            in_sprint(t("S-6", StatusCategory::ToDo), "Sprint 8"),
        ];
        let c = ctx(&tickets, &r);

        assert_eq!(
            how_many_in_sprint(&c, "sprint 7").unwrap(),
            "5 ticket(s) are in sprint 'sprint 7'."
        );
        assert_eq!(
            sprint_unassigned(&c, "Sprint 7").unwrap(),
            "1 unassigned ticket(s) in sprint 'Sprint 7'."
        );
        // loads a=3, b=1; threshold ceil(4/2) = 2
        assert_eq!(
            sprint_overloaded(&c, "Sprint 7").unwrap(),
            "Overloaded members in sprint 'Sprint 7':\n- a@x.com: 3 open in sprint (avg threshold 2)"
        );
        // QA 2, Backend 3
        assert_eq!(
            sprint_team_most(&c, "Sprint 7").unwrap(),
            "In sprint 'Sprint 7', Backend has the most tickets (3)."
        );
        assert_eq!(
            sprint_closure_rate(&c, "Sprint 7").unwrap(),
            "Sprint 'Sprint 7' closure rate: 20.0% (1/5)."
        );
        assert_eq!(
            sprint_overloaded(&c, "Sprint 8").unwrap(),
            "No assigned, open tickets in sprint 'Sprint 8'."
        );
    }

    #[test]
    fn balanced_sprint_has_no_overload() {
        let r = Rosters::default();
        let tickets = vec![
            in_sprint(assigned(t("S-1", StatusCategory::ToDo), "a@x.com"), "S1"),
            in_sprint(assigned(t("S-2", StatusCategory::ToDo), "b@x.com"), "S1"),
        ];
        assert_eq!(
            sprint_overloaded(&ctx(&tickets, &r), "S1").unwrap(),
            "No overloaded members detected in sprint 'S1'."
        );
    }

    #[test]
    fn backlog_health() {
        let r = Rosters::default();
        let mut old = on_team(t("B-1", StatusCategory::ToDo), "QA");
        old.created = Some(now() - Duration::days(40));
        let tickets = vec![
            old,
            on_team(t("B-2", StatusCategory::ToDo), "Backend"),
            on_team(t("B-3", StatusCategory::ToDo), "QA"),
            resolved(t("B-4", StatusCategory::Done), 1),
        ];
        let c = ctx(&tickets, &r);
        assert_eq!(
            backlog_size_by_team(&c).unwrap(),
            "Backlog size by team:\n- Backend: 1\n- QA: 2"
        );
        // created in window: B-2, B-3, B-4; resolved: B-4
        assert_eq!(
            backlog_growth(&c, 30).unwrap(),
            "Backlog grew by 2 in the last 30 days (created 3, resolved 1)."
        );
        assert_eq!(
            backlog_older_than(&c, 30).unwrap(),
            "Backlog tickets older than 30 days:\n- B-1: Summary of B-1"
        );
    }
}
