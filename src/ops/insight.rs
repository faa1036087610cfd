use anyhow::{Context, Result};
use tracing::info;

use crate::llm::{insight_prompt, Completer};
use crate::model::ticket::NormalizedTicket;

/// Ask the model for a summary, root causes, fixes and skill tags.
pub async fn analyze(completer: &dyn Completer, ticket: &NormalizedTicket) -> Result<String> {
    info!(key = %ticket.key, "requesting ticket insight");
    let reply = completer
        .complete(&insight_prompt(ticket))
        .await
        .with_context(|| format!("Failed to analyze {}", ticket.key))?;
    Ok(reply.trim().to_string())
}
