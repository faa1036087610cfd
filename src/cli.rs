use anyhow::{bail, Context, Result};
use chrono::NaiveDate;

use crate::config::{self, AppConfig};
use crate::ops;
use crate::providers::jira::JiraClient;
use crate::providers::Tracker;
use crate::report::{self, ReportFilter};
use crate::repl;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dashboard,
    Ask,
    Assign,
    Rebalance(String),
    Plan(String),
    Analyze(String),
    Report(ReportFilter),
    Add(NewIssue),
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub title: String,
    pub description: Option<String>,
    pub issue_type: String,
}

pub fn parse(args: &[String]) -> Result<Command> {
    let Some((first, rest)) = args.split_first() else {
        return Ok(Command::Dashboard);
    };
    let joined = || rest.join(" ").trim().to_string();

    match first.as_str() {
        "ask" => Ok(Command::Ask),
        "assign" => Ok(Command::Assign),
        "rebalance" => match joined() {
            s if s.is_empty() => bail!("Usage: devsense rebalance <sprint-id>"),
            s => Ok(Command::Rebalance(s)),
        },
        "plan" => match joined() {
            s if s.is_empty() => bail!("Usage: devsense plan <sprint name>"),
            s => Ok(Command::Plan(s)),
        },
        "analyze" => match rest {
            [key] => Ok(Command::Analyze(key.to_uppercase())),
            _ => bail!("Usage: devsense analyze <KEY>"),
        },
        "report" => parse_report_args(rest).map(Command::Report),
        "add" => parse_add_args(rest).map(Command::Add),
        "help" | "-h" | "--help" => Ok(Command::Help),
        other => bail!("Unknown command '{other}'. Run `devsense help` for usage."),
    }
}

fn parse_date(flag: &str, value: Option<&String>) -> Result<NaiveDate> {
    let value = value.with_context(|| format!("Missing value for {flag}"))?;
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date for {flag}: {value} (expected YYYY-MM-DD)"))
}

/// `devsense report [sprint name] [--from YYYY-MM-DD] [--to YYYY-MM-DD]`
pub fn parse_report_args(args: &[String]) -> Result<ReportFilter> {
    let mut filter = ReportFilter::default();
    let mut sprint_parts: Vec<&str> = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--from" => filter.start = Some(parse_date("--from", iter.next())?),
            "--to" => filter.end = Some(parse_date("--to", iter.next())?),
            other => sprint_parts.push(other),
        }
    }

    if let (Some(start), Some(end)) = (filter.start, filter.end) {
        if start > end {
            bail!("--from {start} is after --to {end}");
        }
    }
    if !sprint_parts.is_empty() {
        filter.sprint = Some(sprint_parts.join(" "));
    }
    Ok(filter)
}

/// Parse `devsense add` arguments.
///
/// Supported forms:
///   devsense add "My task title"
///   devsense add My task title
///   devsense add "My task" -d "The description"
///   devsense add "Crash on save" -t Bug
pub fn parse_add_args(args: &[String]) -> Result<NewIssue> {
    if args.is_empty() {
        bail!("Usage: devsense add <title> [-d <description>] [-t <type>]\n\nExamples:\n  devsense add \"Fix the login bug\"\n  devsense add \"Fix the login bug\" -d \"Users can't log in with SSO\" -t Bug");
    }

    let mut title_parts: Vec<String> = Vec::new();
    let mut description: Option<String> = None;
    let mut issue_type = "Task".to_string();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "-d" | "--desc" | "--description" => {
                i += 1;
                if i < args.len() {
                    description = Some(args[i].clone());
                } else {
                    bail!("Missing value for -d/--desc flag");
                }
            }
            "-t" | "--type" => {
                i += 1;
                if i < args.len() {
                    issue_type = args[i].clone();
                } else {
                    bail!("Missing value for -t/--type flag");
                }
            }
            _ => {
                title_parts.push(args[i].clone());
            }
        }
        i += 1;
    }

    let title = title_parts.join(" ");
    if title.is_empty() {
        bail!("Issue title cannot be empty");
    }

    Ok(NewIssue {
        title,
        description,
        issue_type,
    })
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Dashboard => crate::run_dashboard(config).await?,
        Command::Help => print_help(),
        Command::Add(issue) => handle_add(config, issue).await?,
        Command::Ask => {
            println!("🔄 Loading Jira data...");
            let mut session = Session::connect(config).await?;
            repl::run(&mut session).await?;
        }
        Command::Assign => {
            let session = Session::connect(config).await?;
            let plan = ops::assign::run(session.tracker(), session.tickets(), session.rosters())
                .await?;
            for a in &plan.assignments {
                println!("✅ {} → {} ({})", a.key, a.email, a.team);
            }
            for (key, team) in &plan.skipped {
                println!("⚠️  {key}: no members for team {team}");
            }
            println!("Assigned {} ticket(s).", plan.assignments.len());
        }
        Command::Rebalance(sprint) => {
            let session = Session::connect(config).await?;
            let plan = ops::rebalance::run(
                session.tracker(),
                session.classifier(),
                session.jira(),
                session.rosters(),
                &sprint,
            )
            .await?;
            let mut team = "";
            for a in &plan.assignments {
                if a.team != team {
                    team = &a.team;
                    println!("\nRebalanced team '{team}':");
                }
                println!("  - {} → {}", a.key, a.email);
            }
            for (team, n) in &plan.skipped_teams {
                println!("⚠️  {team}: {n} ticket(s) left as they were, nobody on the roster");
            }
            println!("\nSprint {sprint} rebalanced.");
        }
        Command::Plan(name) => {
            let session = Session::connect(config).await?;
            let plan = ops::planner::run(
                session.tracker(),
                session.classifier(),
                session.completer()?,
                session.jira(),
                session.rosters(),
                session.tickets(),
                &name,
            )
            .await?;
            for t in &plan.tickets {
                let who = t
                    .new_assignee
                    .as_deref()
                    .map(|e| format!(" → {e}"))
                    .unwrap_or_default();
                println!("{}: {} pts  [{}]{who}  {}", t.key, t.story_points, t.team, t.summary);
            }
            println!(
                "\nCreated sprint '{}' (id {}) with {} ticket(s), {} story points.",
                plan.sprint_name,
                plan.sprint_id,
                plan.tickets.len(),
                plan.total_points()
            );
        }
        Command::Analyze(key) => {
            let session = Session::connect(config).await?;
            let ticket = session
                .find(&key)
                .with_context(|| format!("Ticket {key} not found"))?;
            println!("--- {} ---", ticket.key);
            println!("Status: {}  Team: {}", ticket.status, ticket.team);
            println!("Summary: {}\n", ticket.summary);
            let insight = ops::insight::analyze(session.completer()?, ticket).await?;
            println!("{insight}");
        }
        Command::Report(filter) => {
            let session = Session::connect(config).await?;
            println!("{}", report::build(session.tickets(), &filter).render());
        }
    }
    Ok(())
}

async fn handle_add(config: &AppConfig, issue: NewIssue) -> Result<()> {
    let jira = config.require_jira()?;
    let client = JiraClient::new(jira);
    let key = client
        .create_issue(&issue.title, issue.description.as_deref(), &issue.issue_type)
        .await
        .context("Failed to create issue")?;
    println!("Created {}: {}", key, issue.title);
    println!("  {}", client.browse_url(&key));
    Ok(())
}

pub fn print_help() {
    println!("devsense: Jira cockpit with natural-language questions\n");
    println!("USAGE:");
    println!("  devsense                      Launch the TUI dashboard");
    println!("  devsense ask                  Ask questions at an nlq> prompt");
    println!("  devsense assign               Assign open, unassigned tickets to the least-loaded team member");
    println!("  devsense rebalance <sprint>   Spread a sprint's tickets round-robin across each team");
    println!("  devsense plan <sprint name>   Estimate the backlog and move it into a new sprint");
    println!("  devsense analyze <KEY>        AI summary, root causes and fixes for one ticket");
    println!("  devsense report [sprint]      Sprint report (--from/--to YYYY-MM-DD filter on created)");
    println!("  devsense add <title>          Create a new issue");
    println!();
    println!("ADD OPTIONS:");
    println!("  -d, --desc <text>  Set a description for the issue");
    println!("  -t, --type <type>  Issue type (default Task)");
    println!();
    println!("CONFIG: {}", config::config_path().display());
}
