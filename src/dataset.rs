use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::classifier::TeamClassifier;
use crate::config::JiraConfig;
use crate::model::ticket::{Assignee, NormalizedTicket, Sprint, StatusCategory};
use crate::providers::{fetch_all_issues, RawIssue, Tracker};
use crate::util::adf::description_to_text;

/// An immutable snapshot of the project, rebuilt wholesale on refresh.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub tickets: Vec<NormalizedTicket>,
    pub loaded_at: DateTime<Utc>,
}

impl Dataset {
    pub fn new(tickets: Vec<NormalizedTicket>) -> Self {
        Self {
            tickets,
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

pub fn project_jql(project_key: &str) -> String {
    format!("project = \"{project_key}\" ORDER BY created DESC")
}

/// Pull every issue of the project, flatten, classify and normalize it.
pub async fn load(
    tracker: &dyn Tracker,
    classifier: &TeamClassifier,
    jira: &JiraConfig,
) -> Result<Dataset> {
    let tickets = fetch_tickets(tracker, classifier, jira, &project_jql(&jira.project_key))
        .await
        .with_context(|| format!("Failed to load project {}", jira.project_key))?;
    let data = Dataset::new(tickets);
    if data.is_empty() {
        warn!(project = %jira.project_key, "project returned no issues");
    }
    info!(tickets = data.len(), project = %jira.project_key, "dataset loaded");
    Ok(data)
}

/// Fetch and normalize every issue matching `jql`.
pub async fn fetch_tickets(
    tracker: &dyn Tracker,
    classifier: &TeamClassifier,
    jira: &JiraConfig,
    jql: &str,
) -> Result<Vec<NormalizedTicket>> {
    let raw = fetch_all_issues(tracker, jql, jira.max_results, jira.page_size)
        .await
        .with_context(|| format!("Failed to fetch issues for: {jql}"))?;

    let fetched = raw.len();
    let mut tickets = Vec::with_capacity(fetched);
    for issue in raw {
        if let Some(ticket) = normalize_issue(issue, classifier, &jira.sprint_field).await? {
            tickets.push(ticket);
        }
    }
    if tickets.len() < fetched {
        warn!(fetched, kept = tickets.len(), "some issues were dropped");
    }
    Ok(tickets)
}

/// Normalize one issue. Issues without a key are dropped; classification
/// failures propagate.
pub async fn normalize_issue(
    issue: RawIssue,
    classifier: &TeamClassifier,
    sprint_field: &str,
) -> Result<Option<NormalizedTicket>> {
    let key = match issue.key.as_deref().map(str::trim) {
        Some(k) if !k.is_empty() => k.to_string(),
        _ => {
            warn!("skipping issue without a key");
            return Ok(None);
        }
    };
    let fields = issue.fields;

    let summary = fields.summary.unwrap_or_default();
    let description = fields
        .description
        .as_ref()
        .map(description_to_text)
        .unwrap_or_default();

    let (status, status_category) = match fields.status {
        Some(s) => {
            let category = s.status_category.and_then(|c| c.name);
            (
                s.name.unwrap_or_default(),
                StatusCategory::from_tracker(category.as_deref()),
            )
        }
        None => (String::new(), StatusCategory::ToDo),
    };

    let assignee = fields.assignee.and_then(|a| {
        if a.display_name.is_none() && a.email_address.is_none() {
            None
        } else {
            Some(Assignee {
                name: a.display_name,
                email: a.email_address,
            })
        }
    });

    let team = classifier
        .classify(&summary, &description)
        .await
        .with_context(|| format!("Failed to classify {key}"))?;

    Ok(Some(NormalizedTicket {
        created: fields.created.as_deref().and_then(parse_datetime),
        updated: fields.updated.as_deref().and_then(parse_datetime),
        resolved: fields.resolutiondate.as_deref().and_then(parse_datetime),
        due: fields.duedate.as_deref().and_then(parse_datetime),
        priority: fields.priority.and_then(|p| p.name),
        labels: fields.labels.unwrap_or_default(),
        sprint: parse_sprint(fields.extra.get(sprint_field)),
        key,
        summary,
        description,
        status,
        status_category,
        assignee,
        team,
    }))
}

/// Parse tracker timestamps: RFC 3339, Jira's `+0000` offsets, or bare dates
/// (taken as midnight UTC). Anything else is absent.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Extract the sprint from the sprint reference field. The field is a list of
/// sprint objects or, on older servers, encoded `key=value,...` strings. The
/// active sprint wins, otherwise the most recent entry.
pub fn parse_sprint(value: Option<&Value>) -> Option<Sprint> {
    let sprints: Vec<Sprint> = match value? {
        Value::Array(entries) => entries.iter().filter_map(parse_sprint_entry).collect(),
        single => parse_sprint_entry(single).into_iter().collect(),
    };

    let active = sprints.iter().position(|s| {
        s.state
            .as_deref()
            .map_or(false, |st| st.eq_ignore_ascii_case("active"))
    });
    match active {
        Some(i) => sprints.into_iter().nth(i),
        None => sprints.into_iter().last(),
    }
}

fn parse_sprint_entry(value: &Value) -> Option<Sprint> {
    let (name, state) = match value {
        Value::Object(obj) => (
            obj.get("name").and_then(Value::as_str).map(String::from),
            obj.get("state").and_then(Value::as_str).map(String::from),
        ),
        Value::String(encoded) => parse_legacy_sprint(encoded),
        _ => (None, None),
    };

    let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())?;
    Some(Sprint { name, state })
}

// com.atlassian.greenhopper.service.sprint.Sprint@1a2b[id=1,state=ACTIVE,name=S1,...]
fn parse_legacy_sprint(encoded: &str) -> (Option<String>, Option<String>) {
    let body = match (encoded.find('['), encoded.rfind(']')) {
        (Some(start), Some(end)) if start < end => &encoded[start + 1..end],
        _ => encoded,
    };

    let mut name = None;
    let mut state = None;
    for part in body.split(',') {
        let part = part.trim();
        if let Some(v) = part.strip_prefix("name=") {
            name = Some(v.to_string());
        } else if let Some(v) = part.strip_prefix("state=") {
            state = Some(v.to_string());
        }
    }
    (name, state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Datelike, Timelike};
    use serde_json::json;

    use super::*;
    use crate::config::TeamConfig;
    use crate::embedding::fake::TableEmbedder;
    use crate::providers::mock::{raw_issue, MockTracker};

    async fn classifier() -> TeamClassifier {
        let embedder = Arc::new(
            TableEmbedder::new()
                .with("react css", vec![1.0, 0.0])
                .with("sql index", vec![0.0, 1.0])
                .with_fallback(vec![0.9, 0.1]),
        );
        let teams = vec![
            TeamConfig {
                name: "Frontend".into(),
                skills: "react css".into(),
                members: vec![],
            },
            TeamConfig {
                name: "Database".into(),
                skills: "sql index".into(),
                members: vec![],
            },
        ];
        TeamClassifier::build(embedder, &teams).await.unwrap()
    }

    fn jira() -> JiraConfig {
        JiraConfig {
            url: "https://x".into(),
            email: "e".into(),
            api_token: "t".into(),
            project_key: "ABC".into(),
            board_id: None,
            sprint_field: "customfield_10020".into(),
            max_results: 1000,
            page_size: 2,
        }
    }

    #[test]
    fn parses_jira_offsets_and_zulu() {
        let a = parse_datetime("2024-05-01T10:00:00.000+0000").unwrap();
        let b = parse_datetime("2024-05-01T10:00:00Z").unwrap();
        assert_eq!(a, b);

        let c = parse_datetime("2024-05-01T12:00:00.000+0200").unwrap();
        assert_eq!(c, a);
    }

    #[test]
    fn bare_date_is_midnight_utc() {
        let d = parse_datetime("2024-06-30").unwrap();
        assert_eq!((d.year(), d.month(), d.day(), d.hour()), (2024, 6, 30, 0));
    }

    #[test]
    fn garbage_dates_are_absent() {
        assert_eq!(parse_datetime(""), None);
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2024-13-45"), None);
    }

    #[test]
    fn sprint_from_object_list_prefers_active() {
        let field = json!([
            { "name": "S1", "state": "closed" },
            { "name": "S2", "state": "active" },
            { "name": "S3", "state": "future" }
        ]);
        let sprint = parse_sprint(Some(&field)).unwrap();
        assert_eq!(sprint.name, "S2");
        assert_eq!(sprint.state.as_deref(), Some("active"));
    }

    #[test]
    fn sprint_without_active_takes_last() {
        let field = json!([{ "name": "S1", "state": "closed" }, { "name": "S4", "state": "closed" }]);
        assert_eq!(parse_sprint(Some(&field)).unwrap().name, "S4");
    }

    #[test]
    fn sprint_from_legacy_string() {
        let field = json!([
            "com.atlassian.greenhopper.service.sprint.Sprint@14b1c359[id=1,rapidViewId=1,state=ACTIVE,name=Sprint 7,goal=,startDate=2024-05-01T10:00:00.000Z]"
        ]);
        let sprint = parse_sprint(Some(&field)).unwrap();
        assert_eq!(sprint.name, "Sprint 7");
        assert_eq!(sprint.state.as_deref(), Some("ACTIVE"));

        let bare = json!(["name=S1,state=future"]);
        assert_eq!(parse_sprint(Some(&bare)).unwrap().name, "S1");
    }

    #[test]
    fn missing_or_empty_sprint_is_backlog() {
        assert_eq!(parse_sprint(None), None);
        assert_eq!(parse_sprint(Some(&Value::Null)), None);
        assert_eq!(parse_sprint(Some(&json!([]))), None);
        assert_eq!(parse_sprint(Some(&json!([{ "state": "active" }]))), None);
    }

    #[tokio::test]
    async fn normalizes_full_issue() {
        let c = classifier().await;
        let raw: RawIssue = serde_json::from_value(json!({
            "key": "ABC-7",
            "fields": {
                "summary": "Slow report",
                "description": {
                    "type": "doc",
                    "content": [{ "type": "paragraph", "content": [{ "type": "text", "text": "needs index" }] }]
                },
                "status": { "name": "Code Review", "statusCategory": { "name": "In Progress" } },
                "assignee": { "displayName": "Alice", "emailAddress": "alice@x.com" },
                "created": "2024-05-01T10:00:00.000+0000",
                "updated": "not a date",
                "resolutiondate": null,
                "duedate": "2024-06-30",
                "priority": { "name": "High" },
                "labels": ["perf"],
                "customfield_10020": [{ "name": "S1", "state": "active" }]
            }
        }))
        .unwrap();

        let t = normalize_issue(raw, &c, "customfield_10020")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.key, "ABC-7");
        assert_eq!(t.description, "needs index");
        assert_eq!(t.status, "Code Review");
        assert_eq!(t.status_category, StatusCategory::InProgress);
        assert_eq!(t.assignee_email(), Some("alice@x.com"));
        assert!(t.created.is_some());
        assert!(t.updated.is_none());
        assert!(t.due.is_some());
        assert_eq!(t.priority.as_deref(), Some("High"));
        assert_eq!(t.sprint_name(), Some("S1"));
        assert_eq!(t.team, "Frontend");
    }

    #[tokio::test]
    async fn sparse_issue_still_normalizes() {
        let c = classifier().await;
        let raw: RawIssue = serde_json::from_value(json!({ "key": "ABC-8", "fields": {} })).unwrap();
        let t = normalize_issue(raw, &c, "customfield_10020")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.summary, "");
        assert_eq!(t.status_category, StatusCategory::ToDo);
        assert!(t.assignee.is_none());
        assert!(t.is_backlog());
        assert_eq!(t.team, "General");
    }

    #[tokio::test]
    async fn issue_without_key_is_dropped() {
        let c = classifier().await;
        let raw: RawIssue = serde_json::from_value(json!({ "fields": { "summary": "x" } })).unwrap();
        assert!(normalize_issue(raw, &c, "customfield_10020").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn load_pages_and_classifies_everything() {
        let c = classifier().await;
        let tracker = MockTracker::from_json(vec![
            raw_issue("ABC-1", "Button color", "To Do", None),
            raw_issue("ABC-2", "Deploy", "In Progress", Some("bob@x.com")),
            raw_issue("ABC-3", "Release", "Done", None),
        ]);
        let data = load(&tracker, &c, &jira()).await.unwrap();
        assert_eq!(data.len(), 3);
        assert!(data.tickets.iter().all(|t| !t.team.is_empty()));
        assert!(data
            .tickets
            .iter()
            .all(|t| StatusCategory::ALL.contains(&t.status_category)));

        let requests = tracker.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].0, "project = \"ABC\" ORDER BY created DESC");
    }

    #[tokio::test]
    async fn numeric_created_keeps_the_ticket() {
        let c = classifier().await;
        let mut bad = raw_issue("ABC-2", "Button color", "To Do", None);
        bad["fields"]["created"] = json!(1714557600000i64);
        let tracker = MockTracker::from_json(vec![
            raw_issue("ABC-1", "Release", "Done", None),
            bad,
        ]);
        let data = load(&tracker, &c, &jira()).await.unwrap();
        assert_eq!(data.len(), 2);
        let t = &data.tickets[1];
        assert_eq!(t.key, "ABC-2");
        assert!(t.created.is_none());
        assert!(t.updated.is_some());
        assert_eq!(t.summary, "Button color");
    }

    #[tokio::test]
    async fn load_fails_when_tracker_fails() {
        let c = classifier().await;
        let tracker = MockTracker::from_json(vec![]).with_failure();
        assert!(load(&tracker, &c, &jira()).await.is_err());
    }
}
