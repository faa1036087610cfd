use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LlmConfig;
use crate::model::ticket::NormalizedTicket;

/// Estimate used whenever the model's reply is not a number.
pub const DEFAULT_STORY_POINTS: u32 = 3;

const TEMPERATURE: f32 = 0.3;

#[async_trait]
pub trait Completer: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompleter {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompleter {
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| anyhow!("LLM API key missing: set [llm].api_key or LLM_API_KEY"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create LLM HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Completer for ChatCompleter {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: TEMPERATURE,
        };

        debug!(chars = prompt.len(), model = %self.model, "completion request");
        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .context("LLM request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            bail!("LLM API error ({status}): {body}");
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .context("Failed to parse LLM response")?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .ok_or_else(|| anyhow!("LLM returned no choices"))
    }
}

pub fn insight_prompt(ticket: &NormalizedTicket) -> String {
    format!(
        "You are an AI assistant for a scrum master.
Analyze the following Jira ticket and provide:

1. Concise summary.
2. Possible root causes.
3. Suggested fixes.
4. Suggested skill tags (frontend, backend, devops, general, etc).

Ticket Summary: {}
Ticket Description: {}",
        ticket.summary, ticket.description
    )
}

pub fn story_points_prompt(title: &str, description: &str) -> String {
    let description = if description.trim().is_empty() {
        "No description"
    } else {
        description
    };
    format!(
        "You are a Jira Scrum Master.
Estimate the story points for this ticket based on its title and description:
Title: {title}
Description: {description}
Give only a number (1, 2, 3, 5, 8, 13)."
    )
}

/// Reads the first word of a reply as a story-point count.
pub fn parse_story_points(reply: &str) -> u32 {
    reply
        .split_whitespace()
        .next()
        .and_then(|word| word.trim_end_matches(['.', ',']).parse().ok())
        .unwrap_or(DEFAULT_STORY_POINTS)
}
