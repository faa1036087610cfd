use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{RawIssue, SearchPage, Tracker};

/// In-memory tracker: serves canned issues page by page and records writes.
pub struct MockTracker {
    issues: Vec<RawIssue>,
    /// Overrides the reported total, to exercise pagination edge cases.
    reported_total: Option<usize>,
    pub requests: Mutex<Vec<(String, usize, usize)>>,
    pub assignments: Mutex<Vec<(String, String)>>,
    pub created: Mutex<Vec<(String, Option<String>, String)>>,
    pub sprints: Mutex<Vec<(String, u64)>>,
    pub sprint_moves: Mutex<Vec<(u64, Vec<String>)>>,
    unknown_emails: Vec<String>,
    should_fail: bool,
}

impl MockTracker {
    pub fn new(issues: Vec<RawIssue>) -> Self {
        Self {
            issues,
            reported_total: None,
            requests: Mutex::new(Vec::new()),
            assignments: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            sprints: Mutex::new(Vec::new()),
            sprint_moves: Mutex::new(Vec::new()),
            unknown_emails: Vec::new(),
            should_fail: false,
        }
    }

    pub fn from_json(issues: Vec<Value>) -> Self {
        Self::new(
            issues
                .into_iter()
                .map(|v| serde_json::from_value(v).expect("valid raw issue"))
                .collect(),
        )
    }

    pub fn with_total(mut self, total: usize) -> Self {
        self.reported_total = Some(total);
        self
    }

    pub fn with_unknown_email(mut self, email: &str) -> Self {
        self.unknown_emails.push(email.to_string());
        self
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    pub fn assigned(&self) -> Vec<(String, String)> {
        self.assignments.lock().unwrap().clone()
    }
}

#[async_trait]
impl Tracker for MockTracker {
    fn name(&self) -> &str {
        "Mock"
    }

    async fn search_page(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage> {
        if self.should_fail {
            bail!("Mock failure");
        }
        self.requests
            .lock()
            .unwrap()
            .push((jql.to_string(), start_at, max_results));
        let issues: Vec<RawIssue> = self
            .issues
            .iter()
            .skip(start_at)
            .take(max_results)
            .cloned()
            .collect();
        Ok(SearchPage {
            issues,
            skipped: 0,
            total: self.reported_total.unwrap_or(self.issues.len()),
        })
    }

    async fn assign_issue(&self, key: &str, email: &str) -> Result<()> {
        if self.should_fail || self.unknown_emails.iter().any(|e| e == email) {
            bail!("No Jira account found for {email}");
        }
        self.assignments
            .lock()
            .unwrap()
            .push((key.to_string(), email.to_string()));
        Ok(())
    }

    async fn create_issue(
        &self,
        summary: &str,
        description: Option<&str>,
        issue_type: &str,
    ) -> Result<String> {
        if self.should_fail {
            bail!("Mock failure");
        }
        let mut created = self.created.lock().unwrap();
        created.push((
            summary.to_string(),
            description.map(String::from),
            issue_type.to_string(),
        ));
        Ok(format!("MOCK-{}", created.len()))
    }

    async fn create_sprint(&self, name: &str, board_id: u64) -> Result<u64> {
        if self.should_fail {
            bail!("Mock failure");
        }
        let mut sprints = self.sprints.lock().unwrap();
        sprints.push((name.to_string(), board_id));
        Ok(100 + sprints.len() as u64)
    }

    async fn add_issues_to_sprint(&self, sprint_id: u64, keys: &[String]) -> Result<()> {
        if self.should_fail {
            bail!("Mock failure");
        }
        self.sprint_moves
            .lock()
            .unwrap()
            .push((sprint_id, keys.to_vec()));
        Ok(())
    }
}

/// A raw issue with the fields most tests care about.
pub fn raw_issue(key: &str, summary: &str, category: &str, assignee: Option<&str>) -> Value {
    let assignee = assignee.map(|email| {
        serde_json::json!({ "displayName": email.split('@').next().unwrap_or(email), "emailAddress": email })
    });
    serde_json::json!({
        "key": key,
        "fields": {
            "summary": summary,
            "status": { "name": category, "statusCategory": { "name": category } },
            "assignee": assignee,
            "created": "2024-05-01T10:00:00.000+0000",
            "updated": "2024-05-02T10:00:00.000+0000",
            "labels": []
        }
    })
}
