use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusCategory {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

impl StatusCategory {
    pub const ALL: [StatusCategory; 3] = [
        StatusCategory::ToDo,
        StatusCategory::InProgress,
        StatusCategory::Done,
    ];

    /// Map the tracker's category name onto the fixed lifecycle set.
    /// Anything that is not recognisably "in progress" or "done" is still to do.
    pub fn from_tracker(name: Option<&str>) -> Self {
        match name.map(|n| n.trim().to_lowercase()).as_deref() {
            Some("done") | Some("complete") => StatusCategory::Done,
            Some("in progress") | Some("indeterminate") => StatusCategory::InProgress,
            _ => StatusCategory::ToDo,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusCategory::ToDo => "To Do",
            StatusCategory::InProgress => "In Progress",
            StatusCategory::Done => "Done",
        }
    }
}

impl fmt::Display for StatusCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedTicket {
    pub key: String,
    pub summary: String,
    pub description: String,
    pub status: String,
    pub status_category: StatusCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<Assignee>,
    /// Absent only when the tracker sent an unparseable timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sprint: Option<Sprint>,
    pub team: String,
}

impl NormalizedTicket {
    pub fn assignee_name(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|a| a.name.as_deref())
    }

    pub fn assignee_email(&self) -> Option<&str> {
        self.assignee.as_ref().and_then(|a| a.email.as_deref())
    }

    /// Identity used for per-member aggregation: email first, display name otherwise.
    pub fn member(&self) -> Option<&str> {
        self.assignee_email()
            .filter(|e| !e.is_empty())
            .or_else(|| self.assignee_name().filter(|n| !n.is_empty()))
    }

    pub fn is_unassigned(&self) -> bool {
        self.assignee_email().map_or(true, str::is_empty)
    }

    pub fn is_done(&self) -> bool {
        self.status_category == StatusCategory::Done
    }

    pub fn is_open(&self) -> bool {
        !self.is_done()
    }

    pub fn is_backlog(&self) -> bool {
        self.status_category == StatusCategory::ToDo && self.sprint.is_none()
    }

    pub fn sprint_name(&self) -> Option<&str> {
        self.sprint.as_ref().map(|s| s.name.as_str())
    }

    pub fn in_sprint(&self, name: &str) -> bool {
        self.sprint_name()
            .map_or(false, |s| s.eq_ignore_ascii_case(name.trim()))
    }

    pub fn on_team(&self, team: &str) -> bool {
        self.team.eq_ignore_ascii_case(team.trim())
    }

    /// Resolution instant, trusted only once the ticket is actually done.
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        if self.is_done() {
            self.resolved
        } else {
            None
        }
    }
}

#[cfg(test)]
pub fn ticket(key: &str, category: StatusCategory) -> NormalizedTicket {
    NormalizedTicket {
        key: key.to_string(),
        summary: format!("Summary of {key}"),
        description: String::new(),
        status: category.as_str().to_string(),
        status_category: category,
        assignee: None,
        created: Some(Utc::now()),
        updated: Some(Utc::now()),
        resolved: None,
        due: None,
        priority: None,
        labels: vec![],
        sprint: None,
        team: "General".to_string(),
    }
}
