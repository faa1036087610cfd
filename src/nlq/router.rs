use regex::{Captures, Regex};
use tracing::{debug, warn};

use super::answers::{self, AnswerResult, QueryContext};
use super::{AnswerError, NOT_UNDERSTOOD};

/// Longest window a question may ask about.
const MAX_DAYS: i64 = 36_500;

/// Values captured from a question, in pattern order. Alternatives that did
/// not take part in the match contribute nothing.
pub struct Params(Vec<String>);

impl Params {
    fn from_captures(caps: &Captures) -> Self {
        Params(
            caps.iter()
                .skip(1)
                .flatten()
                .map(|m| clean(m.as_str()))
                .filter(|s| !s.is_empty())
                .collect(),
        )
    }

    fn text(&self, what: &'static str) -> Result<&str, AnswerError> {
        self.0
            .first()
            .map(String::as_str)
            .ok_or(AnswerError::MissingParameter(what))
    }

    fn days(&self) -> Result<i64, AnswerError> {
        let raw = self.text("number of days")?;
        raw.parse::<i64>()
            .ok()
            .filter(|d| (0..=MAX_DAYS).contains(d))
            .ok_or_else(|| AnswerError::InvalidDays(raw.to_string()))
    }
}

fn clean(s: &str) -> String {
    s.trim()
        .trim_end_matches(['?', '.', '!'])
        .trim()
        .to_string()
}

type Handler = fn(&QueryContext<'_>, &Params) -> AnswerResult;

pub struct Rule {
    pub intent: &'static str,
    pattern: Regex,
    handler: Handler,
}

fn rule(intent: &'static str, pattern: &str, handler: Handler) -> Rule {
    Rule {
        intent,
        pattern: Regex::new(&format!("(?i){pattern}")).expect("Invalid intent pattern"),
        handler,
    }
}

/// Ordered question bank. The first rule whose pattern is found anywhere in
/// the question answers it, so narrower phrasings sit above the broad ones
/// they overlap with (sprint and team questions before "tickets for X").
pub struct IntentRouter {
    rules: Vec<Rule>,
}

impl Default for IntentRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl IntentRouter {
    pub fn new() -> Self {
        let rules = vec![
            rule(
                "best_suited_for",
                r"who is best suited for ticket ([A-Z]+-\d+)|best person for ([A-Z]+-\d+)",
                |c, p| answers::best_suited_for(c, p.text("ticket key")?),
            ),
            // sprint
            rule(
                "sprint_unassigned",
                r"how many.* in sprint (.+?) (?:are|is) unassigned|how many.* unassigned.* in sprint ([\w\s-]+)",
                |c, p| answers::sprint_unassigned(c, p.text("sprint")?),
            ),
            rule(
                "sprint_overloaded",
                r"which members in sprint ([\w\s-]+) are overloaded|overloaded members in sprint ([\w\s-]+)",
                |c, p| answers::sprint_overloaded(c, p.text("sprint")?),
            ),
            rule(
                "sprint_team_most",
                r"which team in sprint ([\w\s-]+) is handling the most tickets|team with (?:the )?most tickets in sprint ([\w\s-]+)",
                |c, p| answers::sprint_team_most(c, p.text("sprint")?),
            ),
            rule(
                "sprint_closure_rate",
                r"closure rate for sprint ([\w\s-]+)",
                |c, p| answers::sprint_closure_rate(c, p.text("sprint")?),
            ),
            rule(
                "how_many_in_sprint",
                r"how many tickets.* in sprint ([\w\s-]+)",
                |c, p| answers::how_many_in_sprint(c, p.text("sprint")?),
            ),
            // backlog
            rule(
                "backlog_size_by_team",
                r"backlog size by team",
                |c, _| answers::backlog_size_by_team(c),
            ),
            rule(
                "backlog_growth",
                r"backlog growth.* last month",
                |c, _| answers::backlog_growth(c, 30),
            ),
            rule(
                "backlog_older_than",
                r"backlog tickets older than (\d+)\s*days",
                |c, p| answers::backlog_older_than(c, p.days()?),
            ),
            rule(
                "backlog_for_team",
                r"show.* backlog tickets for (.+)|backlog for (.+)",
                |c, p| answers::backlog_for_team(c, p.text("team")?),
            ),
            rule(
                "how_many_backlog",
                r"how many tickets.* in (?:the )?backlog|backlog.* size|how many.* backlog tickets",
                |c, _| answers::how_many_backlog(c),
            ),
            // counting
            rule(
                "how_many_unassigned",
                r"how many.* unassigned tickets|how many tickets.* unassigned|number of unassigned tickets|unassigned ticket count",
                |c, _| answers::how_many_unassigned(c),
            ),
            rule(
                "team_percent_closed",
                r"what percentage of tickets for (.+) are closed",
                |c, p| answers::team_percent_closed(c, p.text("team")?),
            ),
            rule(
                "percent_closed",
                r"what percentage.* closed|closed tickets percentage|percent.* closed tickets",
                |c, _| answers::percent_closed(c),
            ),
            rule(
                "closed_last_week",
                r"how many.* closed.* last week|closed tickets.* last week",
                |c, _| answers::closed_in_last(c, 7),
            ),
            rule(
                "closed_last_days",
                r"how many.* closed.* last (\d+)\s*days|closed tickets.* last (\d+)\s*days",
                |c, p| answers::closed_in_last(c, p.days()?),
            ),
            rule(
                "created_last_week",
                r"how many tickets.* created.* last week",
                |c, _| answers::created_in_last(c, 7),
            ),
            rule(
                "created_last_days",
                r"how many tickets.* created.* last (\d+)\s*days",
                |c, p| answers::created_in_last(c, p.days()?),
            ),
            rule(
                "resolved_last_week",
                r"how many tickets.* resolved.* last week",
                |c, _| answers::resolved_in_last(c, 7),
            ),
            rule(
                "resolved_last_days",
                r"how many tickets.* resolved.* last (\d+)\s*days",
                |c, p| answers::resolved_in_last(c, p.days()?),
            ),
            rule(
                "stale_to_do",
                r"list tickets in (?:to do|todo) for more than (\d+)\s*days",
                |c, p| answers::stale_in_status(c, "To Do", p.days()?),
            ),
            rule(
                "stale_in_progress",
                r"list tickets in progress for more than (\d+)\s*days",
                |c, p| answers::stale_in_status(c, "In Progress", p.days()?),
            ),
            rule(
                "in_progress_count",
                r"how many tickets.* in progress|in progress ticket count|number of.* in progress",
                |c, _| answers::in_progress_count(c),
            ),
            rule(
                "list_active",
                r"list.* active tickets|show.* active tickets",
                |c, _| answers::list_active(c),
            ),
            rule(
                "count_by_status",
                r"list tickets by status|ticket count by status|tickets by status",
                |c, _| answers::count_by_status(c),
            ),
            rule(
                "list_closed",
                r"list.* closed tickets|show.* closed tickets",
                |c, _| answers::list_closed(c),
            ),
            // teams
            rule(
                "team_most_tickets",
                r"which team has the most tickets|team with most tickets",
                |c, _| answers::team_most_tickets(c),
            ),
            rule(
                "team_least_tickets",
                r"which team has the least tickets|team with least tickets",
                |c, _| answers::team_least_tickets(c),
            ),
            // members
            rule(
                "most_efficient_member",
                r"who is the most efficient member of (.+)|most efficient in (.+)",
                |c, p| answers::most_efficient_member(c, p.text("team")?, 30),
            ),
            rule(
                "least_active_member",
                r"who is the least active member of (.+)|least active in (.+)",
                |c, p| answers::least_active_member(c, p.text("team")?, 30),
            ),
            rule(
                "member_most_open",
                r"which member has the most unclosed tickets|most open tickets by member",
                |c, _| answers::member_most_open(c),
            ),
            rule(
                "top_closer_last_month",
                r"who closed the most tickets last month",
                |c, _| answers::top_closer_last_month(c),
            ),
            // time
            rule(
                "changed_last_24h",
                r"which tickets changed.* last 24 hours",
                |c, _| answers::changed_last_24h(c),
            ),
            rule(
                "idle_for_more_than",
                r"which tickets.* idle for more than (\d+)\s*days",
                |c, p| answers::idle_for_more_than(c, p.days()?),
            ),
            // broadest phrasing last
            rule(
                "how_many_assigned_to",
                r"(?:how many tickets.* assigned to|tickets for) (.+)",
                |c, p| answers::how_many_assigned_to(c, p.text("person")?),
            ),
        ];
        Self { rules }
    }

    /// First rule matching the trimmed question, with its captured values.
    pub fn route(&self, query: &str) -> Option<(&Rule, Params)> {
        let query = query.trim();
        self.rules.iter().find_map(|rule| {
            rule.pattern
                .captures(query)
                .map(|caps| (rule, Params::from_captures(&caps)))
        })
    }

    pub fn intent(&self, query: &str) -> Option<&'static str> {
        self.route(query).map(|(rule, _)| rule.intent)
    }

    pub fn answer(&self, query: &str, ctx: &QueryContext) -> String {
        let Some((rule, params)) = self.route(query) else {
            debug!(query = query.trim(), "no intent matched");
            return NOT_UNDERSTOOD.to_string();
        };
        debug!(intent = rule.intent, "answering");
        match (rule.handler)(ctx, &params) {
            Ok(text) => text,
            Err(e) => {
                warn!(intent = rule.intent, error = %e, "answer failed");
                format!("⚠️ Error answering that: {e}")
            }
        }
    }
}
