use anyhow::Result;
use tracing::info;

use super::{apply_assignments, Assignment, LoadBook};
use crate::model::ticket::NormalizedTicket;
use crate::providers::Tracker;
use crate::teams::Rosters;

#[derive(Debug, Default)]
pub struct AssignmentPlan {
    pub assignments: Vec<Assignment>,
    /// Tickets whose team (and the General fallback) has nobody to take them.
    pub skipped: Vec<(String, String)>,
}

/// Give every open, unassigned ticket to the least-loaded member of its team.
/// Load is counted across the whole project and grows as the plan is built.
pub fn plan(tickets: &[NormalizedTicket], rosters: &Rosters) -> AssignmentPlan {
    let mut book = LoadBook::from_tickets(tickets);
    let mut plan = AssignmentPlan::default();

    // Any assignee record counts as owned, even one without an email.
    for t in tickets.iter().filter(|t| t.is_open() && t.assignee.is_none()) {
        match book.pick(rosters.members(&t.team)) {
            Some(email) => plan.assignments.push(Assignment {
                key: t.key.clone(),
                team: t.team.clone(),
                email,
            }),
            None => plan.skipped.push((t.key.clone(), t.team.clone())),
        }
    }
    plan
}

pub async fn run(
    tracker: &dyn Tracker,
    tickets: &[NormalizedTicket],
    rosters: &Rosters,
) -> Result<AssignmentPlan> {
    let plan = plan(tickets, rosters);
    info!(
        planned = plan.assignments.len(),
        skipped = plan.skipped.len(),
        "auto-assignment planned"
    );
    apply_assignments(tracker, &plan.assignments).await?;
    Ok(plan)
}
