use anyhow::{bail, Context, Result};
use tracing::info;

use super::{apply_assignments, Assignment, LoadBook};
use crate::classifier::TeamClassifier;
use crate::config::JiraConfig;
use crate::dataset::fetch_tickets;
use crate::llm::{parse_story_points, story_points_prompt, Completer};
use crate::model::ticket::NormalizedTicket;
use crate::providers::Tracker;
use crate::teams::Rosters;

#[derive(Debug, Clone)]
pub struct PlannedTicket {
    pub key: String,
    pub summary: String,
    pub team: String,
    pub story_points: u32,
    /// Set when the planner picked someone for a ticket nobody owned.
    pub new_assignee: Option<String>,
}

#[derive(Debug)]
pub struct SprintPlan {
    pub sprint_id: u64,
    pub sprint_name: String,
    pub tickets: Vec<PlannedTicket>,
}

impl SprintPlan {
    pub fn total_points(&self) -> u32 {
        self.tickets.iter().map(|t| t.story_points).sum()
    }
}

pub fn backlog_jql(project_key: &str) -> String {
    format!(
        "project = \"{project_key}\" AND sprint is EMPTY AND statusCategory = \"To Do\" ORDER BY created ASC"
    )
}

pub async fn estimate(completer: &dyn Completer, ticket: &NormalizedTicket) -> Result<u32> {
    let reply = completer
        .complete(&story_points_prompt(&ticket.summary, &ticket.description))
        .await
        .with_context(|| format!("Failed to estimate {}", ticket.key))?;
    Ok(parse_story_points(&reply))
}

/// Pull the backlog into a new sprint: estimate each ticket, hand unowned
/// tickets to the least-loaded member of their team, then create the sprint
/// and move everything into it.
///
/// `current` is the project snapshot used to measure member load.
pub async fn run(
    tracker: &dyn Tracker,
    classifier: &TeamClassifier,
    completer: &dyn Completer,
    jira: &JiraConfig,
    rosters: &Rosters,
    current: &[NormalizedTicket],
    sprint_name: &str,
) -> Result<SprintPlan> {
    let board_id = jira
        .board_id
        .context("Missing [jira].board_id; needed to create a sprint")?;

    let backlog = fetch_tickets(tracker, classifier, jira, &backlog_jql(&jira.project_key))
        .await
        .context("Failed to load the backlog")?;
    if backlog.is_empty() {
        bail!("Backlog is empty; no sprint created");
    }
    info!(tickets = backlog.len(), sprint = sprint_name, "planning sprint");

    let mut book = LoadBook::from_tickets(current);
    let mut planned = Vec::with_capacity(backlog.len());
    let mut assignments = Vec::new();
    for t in &backlog {
        let story_points = estimate(completer, t).await?;
        let new_assignee = if t.assignee.is_none() {
            book.pick(rosters.members(&t.team))
        } else {
            None
        };
        if let Some(email) = &new_assignee {
            assignments.push(Assignment {
                key: t.key.clone(),
                team: t.team.clone(),
                email: email.clone(),
            });
        }
        planned.push(PlannedTicket {
            key: t.key.clone(),
            summary: t.summary.clone(),
            team: t.team.clone(),
            story_points,
            new_assignee,
        });
    }

    let sprint_id = tracker
        .create_sprint(sprint_name, board_id)
        .await
        .with_context(|| format!("Failed to create sprint {sprint_name}"))?;
    info!(sprint_id, sprint = sprint_name, "sprint created");

    apply_assignments(tracker, &assignments).await?;

    let keys: Vec<String> = planned.iter().map(|t| t.key.clone()).collect();
    tracker
        .add_issues_to_sprint(sprint_id, &keys)
        .await
        .with_context(|| format!("Failed to move issues into sprint {sprint_name}"))?;

    Ok(SprintPlan {
        sprint_id,
        sprint_name: sprint_name.to_string(),
        tickets: planned,
    })
}
