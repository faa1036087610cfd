use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_TEAM: &str = "General";

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    pub jira: Option<JiraConfig>,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JiraConfig {
    pub url: String,
    pub email: String,
    pub api_token: String,
    pub project_key: String,
    pub board_id: Option<u64>,
    #[serde(default = "default_sprint_field")]
    pub sprint_field: String,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

/// One team: its skill profile text and its roster of member emails.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TeamConfig {
    pub name: String,
    pub skills: String,
    #[serde(default)]
    pub members: Vec<String>,
}

fn default_sprint_field() -> String {
    "customfield_10020".into()
}

fn default_max_results() -> usize {
    1000
}

fn default_page_size() -> usize {
    100
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

fn default_llm_url() -> String {
    "https://api.groq.com/openai/v1".into()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".into()
}

fn default_timeout() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_url(),
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl AppConfig {
    /// The tracker section, required by every command that talks to Jira.
    pub fn require_jira(&self) -> Result<&JiraConfig> {
        match &self.jira {
            Some(jira) => Ok(jira),
            None => bail!(
                "Missing [jira] configuration. Add url, email, api_token and project_key to {} or set JIRA_URL, JIRA_EMAIL, JIRA_API_TOKEN, JIRA_PROJECT_KEY",
                config_path().display()
            ),
        }
    }

    /// Configured teams in file order, or the built-in profiles when none are set.
    pub fn team_profiles(&self) -> Vec<TeamConfig> {
        if self.teams.is_empty() {
            default_teams()
        } else {
            self.teams.clone()
        }
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        let url = env("JIRA_URL");
        let email = env("JIRA_EMAIL");
        let token = env("JIRA_API_TOKEN");
        let project = env("JIRA_PROJECT_KEY");

        match &mut self.jira {
            Some(jira) => {
                if let Some(v) = url {
                    jira.url = v;
                }
                if let Some(v) = email {
                    jira.email = v;
                }
                if let Some(v) = token {
                    jira.api_token = v;
                }
                if let Some(v) = project {
                    jira.project_key = v;
                }
            }
            None => {
                if let (Some(url), Some(email), Some(api_token), Some(project_key)) =
                    (url, email, token, project)
                {
                    self.jira = Some(JiraConfig {
                        url,
                        email,
                        api_token,
                        project_key,
                        board_id: None,
                        sprint_field: default_sprint_field(),
                        max_results: default_max_results(),
                        page_size: default_page_size(),
                    });
                }
            }
        }

        if let Some(key) = env("EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
        if let Some(key) = env("LLM_API_KEY") {
            self.llm.api_key = Some(key);
        }
    }
}

pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".devsense")
}

pub fn config_path() -> PathBuf {
    data_dir().join("config.toml")
}

pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path(), |name| std::env::var(name).ok())
}

pub fn load_config_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig> {
    let mut config = if path.exists() {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        toml::from_str(&contents).with_context(|| "Failed to parse config.toml")?
    } else {
        AppConfig::default()
    };
    config.apply_env(env);
    Ok(config)
}

pub fn default_teams() -> Vec<TeamConfig> {
    let profiles = [
        (
            "Frontend",
            "React Angular Vue JavaScript TypeScript CSS HTML SASS LESS Bootstrap Material-UI Tailwind Responsive Design \
             UI UX Accessibility Cross-browser Compatibility Web Performance SEO Progressive Web Apps SPA \
             DOM Event Handling State Management Redux MobX Vuex Jest Cypress Webpack Babel",
        ),
        (
            "Backend",
            "API REST GraphQL Node.js Express Django Flask Spring Boot Java Python Ruby PHP Microservices Serverless \
             Auth OAuth JWT SOAP MVC ORM Caching Rate Limiting RabbitMQ Kafka Redis SQL NoSQL PostgreSQL MySQL Oracle \
             Security Encryption Logging Unit Testing Integration Testing TDD BDD Docker Kubernetes AWS Azure GCP CI/CD",
        ),
        (
            "Database",
            "MySQL PostgreSQL MongoDB Redis Cassandra Oracle SQLServer SQLite Indexing Query Optimization Schema Design \
             Transactions ACID Backup Recovery Replication Sharding Partitioning Stored Procedures Views ETL OLAP OLTP",
        ),
        (
            "DevOps",
            "CI/CD Jenkins GitLab GitHub Actions Docker Kubernetes Helm Terraform Ansible Puppet Chef AWS Azure GCP \
             Monitoring Logging Prometheus Grafana ELK Bash Python Networking Load Balancing Auto Scaling IaC Security",
        ),
        (
            "QA",
            "Manual Testing Automation Selenium Cypress JMeter Postman Performance Load API Testing Regression TDD BDD \
             Agile Scrum Test Planning Bug Reporting Code Coverage Static Analysis",
        ),
        (
            "Security",
            "OWASP Penetration Vulnerability Encryption SSL TLS OAuth JWT Auth Firewall IDS IPS Secure Coding Threat Modeling \
             Incident Response GDPR HIPAA IAM Cryptography PKI",
        ),
        (
            DEFAULT_TEAM,
            "Documentation Requirements Agile Scrum Kanban Project Management Communication Collaboration Code Review \
             Git GitHub GitLab Bitbucket Estimation Planning Retrospective",
        ),
    ];

    profiles
        .into_iter()
        .map(|(name, skills)| TeamConfig {
            name: name.to_string(),
            skills: skills.to_string(),
            members: Vec::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml"), no_env).unwrap();
        assert!(config.jira.is_none());
        assert!(config.require_jira().is_err());
        assert_eq!(config.team_profiles().len(), 7);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn parses_jira_and_ordered_teams() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[jira]
url = "https://acme.atlassian.net"
email = "bot@acme.io"
api_token = "secret"
project_key = "ABC"
board_id = 7

[[teams]]
name = "QA"
skills = "Selenium Cypress"
members = ["qa1@acme.io", "qa2@acme.io"]

[[teams]]
name = "Backend"
skills = "API REST"
"#
        )
        .unwrap();

        let config = load_config_from(file.path(), no_env).unwrap();
        let jira = config.require_jira().unwrap();
        assert_eq!(jira.project_key, "ABC");
        assert_eq!(jira.board_id, Some(7));
        assert_eq!(jira.sprint_field, "customfield_10020");
        assert_eq!(jira.max_results, 1000);

        let teams = config.team_profiles();
        assert_eq!(teams[0].name, "QA");
        assert_eq!(teams[0].members.len(), 2);
        assert_eq!(teams[1].name, "Backend");
        assert!(teams[1].members.is_empty());
    }

    #[test]
    fn env_builds_jira_section_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        let env = |name: &str| match name {
            "JIRA_URL" => Some("https://x.atlassian.net".to_string()),
            "JIRA_EMAIL" => Some("me@x.com".to_string()),
            "JIRA_API_TOKEN" => Some("t".to_string()),
            "JIRA_PROJECT_KEY" => Some("X".to_string()),
            "LLM_API_KEY" => Some("llm".to_string()),
            _ => None,
        };
        let config = load_config_from(&dir.path().join("none.toml"), env).unwrap();
        assert_eq!(config.require_jira().unwrap().project_key, "X");
        assert_eq!(config.llm.api_key.as_deref(), Some("llm"));
    }

    #[test]
    fn partial_env_does_not_invent_jira_section() {
        let dir = tempfile::tempdir().unwrap();
        let env = |name: &str| (name == "JIRA_URL").then(|| "https://x".to_string());
        let config = load_config_from(&dir.path().join("none.toml"), env).unwrap();
        assert!(config.jira.is_none());
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[jira\nurl=").unwrap();
        let err = load_config_from(file.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
