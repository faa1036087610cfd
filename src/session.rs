use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::classifier::TeamClassifier;
use crate::config::{AppConfig, JiraConfig};
use crate::dataset::{self, Dataset};
use crate::embedding::ApiEmbedder;
use crate::llm::{ChatCompleter, Completer};
use crate::model::ticket::NormalizedTicket;
use crate::nlq::{IntentRouter, QueryContext, HELP_TEXT};
use crate::providers::jira::JiraClient;
use crate::providers::Tracker;
use crate::teams::Rosters;

/// One line typed at the prompt. Reserved words win over questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    Help,
    Refresh,
    Exit,
    Ask(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Command::Empty,
            "help" => Command::Help,
            "refresh" => Command::Refresh,
            "exit" | "quit" | ":q" => Command::Exit,
            _ => Command::Ask(line.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Nothing,
    Text(String),
    Exit,
}

pub struct Session {
    tracker: Arc<dyn Tracker>,
    classifier: TeamClassifier,
    completer: Option<Arc<dyn Completer>>,
    router: IntentRouter,
    rosters: Rosters,
    jira: JiraConfig,
    dataset: Arc<Dataset>,
}

impl Session {
    /// Wire the real collaborators from configuration and load the project.
    pub async fn connect(config: &AppConfig) -> Result<Self> {
        let jira = config.require_jira()?.clone();
        let tracker: Arc<dyn Tracker> = Arc::new(JiraClient::new(&jira));
        let embedder = Arc::new(ApiEmbedder::from_config(&config.embedding)?);
        let teams = config.team_profiles();
        let classifier = TeamClassifier::build(embedder, &teams)
            .await
            .context("Failed to build the team classifier")?;

        let completer: Option<Arc<dyn Completer>> = match ChatCompleter::from_config(&config.llm) {
            Ok(c) => Some(Arc::new(c)),
            Err(e) => {
                warn!(error = %e, "AI features disabled");
                None
            }
        };

        Self::start(tracker, classifier, completer, Rosters::from_config(&teams), jira).await
    }

    pub async fn start(
        tracker: Arc<dyn Tracker>,
        classifier: TeamClassifier,
        completer: Option<Arc<dyn Completer>>,
        rosters: Rosters,
        jira: JiraConfig,
    ) -> Result<Self> {
        let data = dataset::load(tracker.as_ref(), &classifier, &jira).await?;
        Ok(Self {
            tracker,
            classifier,
            completer,
            router: IntentRouter::new(),
            rosters,
            jira,
            dataset: Arc::new(data),
        })
    }

    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    pub fn tickets(&self) -> &[NormalizedTicket] {
        &self.dataset.tickets
    }

    pub fn tracker(&self) -> &dyn Tracker {
        self.tracker.as_ref()
    }

    pub fn classifier(&self) -> &TeamClassifier {
        &self.classifier
    }

    pub fn rosters(&self) -> &Rosters {
        &self.rosters
    }

    pub fn jira(&self) -> &JiraConfig {
        &self.jira
    }

    pub fn completer(&self) -> Result<&dyn Completer> {
        self.completer
            .as_deref()
            .ok_or_else(|| anyhow!("AI features need [llm].api_key or LLM_API_KEY"))
    }

    pub fn find(&self, key: &str) -> Option<&NormalizedTicket> {
        self.tickets()
            .iter()
            .find(|t| t.key.eq_ignore_ascii_case(key.trim()))
    }

    /// Rebuild the snapshot and swap it in. Readers holding the old one keep it.
    pub async fn refresh(&mut self) -> Result<usize> {
        let data = dataset::load(self.tracker.as_ref(), &self.classifier, &self.jira).await?;
        let count = data.len();
        self.dataset = Arc::new(data);
        info!(count, "dataset refreshed");
        Ok(count)
    }

    pub fn ask(&self, question: &str) -> String {
        let ctx = QueryContext::new(self.tickets(), &self.rosters);
        self.router.answer(question, &ctx)
    }

    pub async fn handle(&mut self, line: &str) -> Reply {
        match Command::parse(line) {
            Command::Empty => Reply::Nothing,
            Command::Help => Reply::Text(HELP_TEXT.to_string()),
            Command::Exit => Reply::Exit,
            Command::Refresh => match self.refresh().await {
                Ok(n) => Reply::Text(format!("✅ Reloaded {n} issue(s).")),
                Err(e) => {
                    warn!(error = %e, "refresh failed");
                    Reply::Text(format!("⚠️ Refresh failed: {e:#}"))
                }
            },
            Command::Ask(q) => Reply::Text(self.ask(&q)),
        }
    }
}
