use anyhow::{Context, Result};
use tracing::info;

use super::{apply_assignments, Assignment};
use crate::aggregate::group_by;
use crate::classifier::TeamClassifier;
use crate::config::JiraConfig;
use crate::dataset::fetch_tickets;
use crate::model::ticket::NormalizedTicket;
use crate::providers::Tracker;
use crate::teams::Rosters;

#[derive(Debug, Default)]
pub struct RebalancePlan {
    pub assignments: Vec<Assignment>,
    /// Teams with no one to hand work to, and how many tickets they hold.
    pub skipped_teams: Vec<(String, usize)>,
}

/// Search for a sprint by numeric id or by name.
pub fn sprint_jql(project_key: &str, sprint: &str) -> String {
    let sprint = sprint.trim();
    if sprint.parse::<u64>().is_ok() {
        format!("project = \"{project_key}\" AND sprint = {sprint}")
    } else {
        format!(
            "project = \"{project_key}\" AND sprint = \"{}\"",
            sprint.replace('"', "\\\"")
        )
    }
}

/// Deal each team's sprint tickets round-robin over the team roster, teams
/// in the order they first appear.
pub fn plan(tickets: &[NormalizedTicket], rosters: &Rosters) -> RebalancePlan {
    let mut plan = RebalancePlan::default();
    for (team, group) in group_by(tickets, |t| t.team.clone()) {
        let roster = rosters.members(&team);
        if roster.is_empty() {
            plan.skipped_teams.push((team, group.len()));
            continue;
        }
        for (i, t) in group.iter().enumerate() {
            plan.assignments.push(Assignment {
                key: t.key.clone(),
                team: team.clone(),
                email: roster[i % roster.len()].clone(),
            });
        }
    }
    plan
}

pub async fn run(
    tracker: &dyn Tracker,
    classifier: &TeamClassifier,
    jira: &JiraConfig,
    rosters: &Rosters,
    sprint: &str,
) -> Result<RebalancePlan> {
    let tickets = fetch_tickets(tracker, classifier, jira, &sprint_jql(&jira.project_key, sprint))
        .await
        .with_context(|| format!("Failed to load sprint {sprint}"))?;
    info!(sprint, tickets = tickets.len(), "rebalancing sprint");

    let plan = plan(&tickets, rosters);
    apply_assignments(tracker, &plan.assignments).await?;
    Ok(plan)
}
