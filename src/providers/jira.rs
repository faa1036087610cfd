use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{RawIssue, SearchPage, Tracker};
use crate::config::JiraConfig;
use crate::util::adf::text_to_adf;

const SPRINT_BATCH: usize = 50;

pub struct JiraClient {
    base_url: String,
    auth_header: String,
    project_key: String,
    sprint_field: String,
    client: reqwest::Client,
}

impl JiraClient {
    pub fn new(config: &JiraConfig) -> Self {
        let creds = format!("{}:{}", config.email, config.api_token);
        let encoded = base64::engine::general_purpose::STANDARD.encode(creds);
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {encoded}"),
            project_key: config.project_key.clone(),
            sprint_field: config.sprint_field.clone(),
            client: reqwest::Client::new(),
        }
    }

    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url, key)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
    }

    fn send_json(&self, method: reqwest::Method, url: &str, body: &Value) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", &self.auth_header)
            .header("Accept", "application/json")
            .json(body)
    }

    async fn account_id(&self, email: &str) -> Result<String> {
        let url = format!(
            "{}/rest/api/3/user/search?query={}",
            self.base_url,
            urlencoding::encode(email)
        );
        let users: Vec<UserRecord> = self
            .get(&url)
            .send()
            .await
            .context("Jira user search failed")?
            .error_for_status()
            .context("Jira user search rejected")?
            .json()
            .await
            .context("Failed to parse Jira user search")?;

        users
            .into_iter()
            .next()
            .map(|u| u.account_id)
            .ok_or_else(|| anyhow!("No Jira account found for {email}"))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<Value>,
    #[serde(default)]
    total: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    account_id: String,
}

#[derive(Deserialize)]
struct CreatedIssue {
    key: String,
}

#[derive(Deserialize)]
struct CreatedSprint {
    id: u64,
}

#[async_trait]
impl Tracker for JiraClient {
    fn name(&self) -> &str {
        "Jira"
    }

    async fn search_page(
        &self,
        jql: &str,
        start_at: usize,
        max_results: usize,
    ) -> Result<SearchPage> {
        let fields = format!(
            "summary,description,status,assignee,created,updated,resolutiondate,duedate,priority,labels,{}",
            self.sprint_field
        );
        let url = format!(
            "{}/rest/api/3/search?jql={}&startAt={start_at}&maxResults={max_results}&fields={}",
            self.base_url,
            urlencoding::encode(jql),
            urlencoding::encode(&fields)
        );

        let resp = self
            .get(&url)
            .send()
            .await
            .context("Jira API request failed")?
            .error_for_status()
            .context("Jira search rejected")?;

        let search: SearchResponse = resp.json().await.context("Failed to parse Jira response")?;

        let mut skipped = 0;
        let issues = search
            .issues
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<RawIssue>(raw) {
                Ok(issue) => Some(issue),
                Err(e) => {
                    warn!("skipping undecodable issue: {e}");
                    skipped += 1;
                    None
                }
            })
            .collect();

        Ok(SearchPage {
            issues,
            skipped,
            total: search.total,
        })
    }

    async fn assign_issue(&self, key: &str, email: &str) -> Result<()> {
        let account_id = self.account_id(email).await?;
        let url = format!("{}/rest/api/3/issue/{}/assignee", self.base_url, key);
        self.send_json(reqwest::Method::PUT, &url, &json!({ "accountId": account_id }))
            .send()
            .await
            .with_context(|| format!("Failed to assign {key}"))?
            .error_for_status()
            .with_context(|| format!("Jira rejected assignment of {key} to {email}"))?;
        info!(key, email, "assigned");
        Ok(())
    }

    async fn create_issue(
        &self,
        summary: &str,
        description: Option<&str>,
        issue_type: &str,
    ) -> Result<String> {
        let mut fields = json!({
            "project": { "key": self.project_key },
            "summary": summary,
            "issuetype": { "name": issue_type },
        });
        if let Some(desc) = description {
            fields["description"] = text_to_adf(desc);
        }

        let url = format!("{}/rest/api/3/issue", self.base_url);
        let created: CreatedIssue = self
            .send_json(reqwest::Method::POST, &url, &json!({ "fields": fields }))
            .send()
            .await
            .context("Jira create issue request failed")?
            .error_for_status()
            .context("Jira rejected the new issue")?
            .json()
            .await
            .context("Failed to parse created issue")?;

        info!(key = %created.key, "issue created");
        Ok(created.key)
    }

    async fn create_sprint(&self, name: &str, board_id: u64) -> Result<u64> {
        let url = format!("{}/rest/agile/1.0/sprint", self.base_url);
        let sprint: CreatedSprint = self
            .send_json(
                reqwest::Method::POST,
                &url,
                &json!({ "name": name, "originBoardId": board_id }),
            )
            .send()
            .await
            .context("Jira create sprint request failed")?
            .error_for_status()
            .with_context(|| format!("Jira rejected sprint {name}"))?
            .json()
            .await
            .context("Failed to parse created sprint")?;

        info!(sprint = name, id = sprint.id, "sprint created");
        Ok(sprint.id)
    }

    async fn add_issues_to_sprint(&self, sprint_id: u64, keys: &[String]) -> Result<()> {
        let url = format!("{}/rest/agile/1.0/sprint/{}/issue", self.base_url, sprint_id);
        for chunk in keys.chunks(SPRINT_BATCH) {
            self.send_json(reqwest::Method::POST, &url, &json!({ "issues": chunk }))
                .send()
                .await
                .context("Jira add-to-sprint request failed")?
                .error_for_status()
                .with_context(|| format!("Jira rejected moving issues into sprint {sprint_id}"))?;
        }
        info!(sprint_id, count = keys.len(), "issues added to sprint");
        Ok(())
    }
}
