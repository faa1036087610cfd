pub mod jira;

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::debug;

/// One issue as the tracker search API returns it. Every field is optional;
/// the dataset normalizer decides what missing data means.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIssue {
    #[serde(default, deserialize_with = "lenient")]
    pub key: Option<String>,
    #[serde(default, deserialize_with = "lenient_fields")]
    pub fields: RawFields,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFields {
    #[serde(default, deserialize_with = "lenient")]
    pub summary: Option<String>,
    pub description: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<RawStatus>,
    #[serde(default, deserialize_with = "lenient")]
    pub assignee: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub updated: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub resolutiondate: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duedate: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub priority: Option<RawNamed>,
    #[serde(default, deserialize_with = "lenient")]
    pub labels: Option<Vec<String>>,
    /// Custom fields, including the sprint reference.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStatus {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(rename = "statusCategory")]
    #[serde(default, deserialize_with = "lenient")]
    pub status_category: Option<RawNamed>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNamed {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email_address: Option<String>,
}

// A value of the wrong type reads as absent instead of rejecting the whole issue.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw: Option<Value> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

fn lenient_fields<'de, D>(deserializer: D) -> Result<RawFields, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

pub struct SearchPage {
    pub issues: Vec<RawIssue>,
    /// Entries the server sent that could not be decoded at all.
    pub skipped: usize,
    pub total: usize,
}

impl SearchPage {
    pub fn returned(&self) -> usize {
        self.issues.len() + self.skipped
    }
}

#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &str;
    async fn search_page(&self, jql: &str, start_at: usize, max_results: usize)
        -> Result<SearchPage>;
    async fn assign_issue(&self, key: &str, email: &str) -> Result<()>;
    /// Create an issue in the configured project and return its key.
    async fn create_issue(
        &self,
        summary: &str,
        description: Option<&str>,
        issue_type: &str,
    ) -> Result<String>;
    /// Create a sprint on a board and return its id.
    async fn create_sprint(&self, name: &str, board_id: u64) -> Result<u64>;
    async fn add_issues_to_sprint(&self, sprint_id: u64, keys: &[String]) -> Result<()>;
}

/// Page through a search until the server total, an empty page, or `limit`.
pub async fn fetch_all_issues(
    tracker: &dyn Tracker,
    jql: &str,
    limit: usize,
    page_size: usize,
) -> Result<Vec<RawIssue>> {
    let page_size = page_size.max(1);
    let mut start_at = 0;
    let mut issues = Vec::new();

    while start_at < limit {
        let want = page_size.min(limit - start_at);
        let page = tracker.search_page(jql, start_at, want).await?;
        let returned = page.returned();
        debug!(
            tracker = tracker.name(),
            start_at,
            returned,
            total = page.total,
            "fetched page"
        );
        issues.extend(page.issues);

        if returned == 0 || start_at + returned >= page.total {
            break;
        }
        start_at += returned;
    }

    Ok(issues)
}

#[cfg(test)]
pub mod mock;
