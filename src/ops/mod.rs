//! Operations that write back to the tracker. Each one builds a plan first,
//! then applies it, so the plan can be shown and tested on its own.

pub mod assign;
pub mod insight;
pub mod planner;
pub mod rebalance;

use std::collections::HashMap;

use anyhow::{Context, Result};
use tracing::info;

use crate::model::ticket::NormalizedTicket;
use crate::providers::Tracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub key: String,
    pub team: String,
    pub email: String,
}

/// Open tickets per member email, project-wide.
#[derive(Debug, Default, Clone)]
pub struct LoadBook {
    load: HashMap<String, usize>,
}

impl LoadBook {
    pub fn from_tickets(tickets: &[NormalizedTicket]) -> Self {
        let mut load = HashMap::new();
        for t in tickets.iter().filter(|t| t.is_open()) {
            if let Some(email) = t.assignee_email().filter(|e| !e.is_empty()) {
                *load.entry(email.to_lowercase()).or_insert(0) += 1;
            }
        }
        Self { load }
    }

    pub fn load(&self, email: &str) -> usize {
        self.load.get(&email.to_lowercase()).copied().unwrap_or(0)
    }

    /// Least-loaded roster member (first in roster order on ties). The pick
    /// counts towards that member's load straight away.
    pub fn pick(&mut self, roster: &[String]) -> Option<String> {
        let mut best: Option<(&String, usize)> = None;
        for member in roster {
            let load = self.load(member);
            if best.map_or(true, |(_, b)| load < b) {
                best = Some((member, load));
            }
        }
        let chosen = best?.0.clone();
        *self.load.entry(chosen.to_lowercase()).or_insert(0) += 1;
        Some(chosen)
    }
}

/// Apply assignments in order. The first failure stops the run.
pub async fn apply_assignments(tracker: &dyn Tracker, assignments: &[Assignment]) -> Result<usize> {
    for a in assignments {
        tracker
            .assign_issue(&a.key, &a.email)
            .await
            .with_context(|| format!("Failed to assign {} to {}", a.key, a.email))?;
        info!(key = %a.key, email = %a.email, team = %a.team, "assigned");
    }
    Ok(assignments.len())
}
