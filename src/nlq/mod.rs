//! Natural-language questions over the ticket table.

pub mod answers;
pub mod router;

pub use answers::QueryContext;
pub use router::IntentRouter;

use thiserror::Error;

/// Failures inside an answer function. The router turns these into a
/// diagnostic line instead of ending the session.
#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("ticket {0} not found")]
    TicketNotFound(String),
    #[error("'{0}' is not a usable number of days")]
    InvalidDays(String),
    #[error("missing {0} in the question")]
    MissingParameter(&'static str),
}

pub const NOT_UNDERSTOOD: &str =
    "Sorry, that query is not in the question bank. Type 'help' to see what I can answer.";

pub const HELP_TEXT: &str = "\
Examples you can ask:
- How many tickets are in backlog?
- How many tickets are in sprint s1?
- How many tickets are assigned to kriti khurana?
- How many tickets are unassigned?
- What percentage of tickets are closed?
- How many tickets have been closed in the last week?
- How many tickets are in progress?
- List all active tickets
- List tickets by status
- List all closed tickets

Team insights:
- Which team has the most tickets?
- Which team has the least tickets?
- What percentage of tickets for Backend are closed?
- Show me backlog tickets for QA

Member insights:
- Who is the most efficient member of Backend?
- Who is the least active member of DevOps?
- Which member has the most unclosed tickets?
- Who closed the most tickets last month?

Recommendations:
- Who is best suited for ticket SCRUM-41?

Time-based:
- How many tickets were created in the last week?
- How many tickets were resolved in the last week?
- List tickets in To Do for more than 14 days
- Which tickets changed status in the last 24 hours?
- Which tickets have been idle for more than 7 days?

Sprint:
- How many tickets in sprint s1 are unassigned?
- Which members in sprint s1 are overloaded?
- Which team in sprint s1 is handling the most tickets?
- Closure rate for sprint s1

Backlog health:
- Backlog size by team
- Backlog growth in the last month
- Backlog tickets older than 30 days

Type 'refresh' to reload data, 'help' to see this list, or 'exit' to quit.";
