use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::{TeamConfig, DEFAULT_TEAM};
use crate::embedding::{cosine_similarity, Embedder};

/// Best scores below this are not trusted; the ticket goes to the default team.
pub const SIMILARITY_FLOOR: f32 = 0.30;

#[derive(Debug, Clone)]
pub struct TeamProfile {
    pub name: String,
    embedding: Vec<f32>,
}

/// Assigns tickets to teams by nearest skill-profile embedding.
///
/// Profile embeddings are computed once in [`TeamClassifier::build`] and reused
/// for every ticket.
pub struct TeamClassifier {
    embedder: Arc<dyn Embedder>,
    profiles: Vec<TeamProfile>,
}

impl TeamClassifier {
    pub async fn build(embedder: Arc<dyn Embedder>, teams: &[TeamConfig]) -> Result<Self> {
        let mut by_skills: HashMap<&str, Vec<f32>> = HashMap::new();
        let mut profiles = Vec::with_capacity(teams.len());

        for team in teams {
            let skills = team.skills.trim();
            let embedding = match by_skills.get(skills) {
                Some(v) => v.clone(),
                None => {
                    let v = embedder
                        .embed(skills)
                        .await
                        .with_context(|| format!("Failed to embed skill profile for {}", team.name))?;
                    by_skills.insert(skills, v.clone());
                    v
                }
            };
            profiles.push(TeamProfile {
                name: team.name.clone(),
                embedding,
            });
        }

        info!(teams = profiles.len(), "team profiles embedded");
        Ok(Self { embedder, profiles })
    }

    pub fn profiles(&self) -> &[TeamProfile] {
        &self.profiles
    }

    /// Classify a ticket. Embedding failures propagate; blank text goes to the
    /// default team without touching the embedder.
    pub async fn classify(&self, summary: &str, description: &str) -> Result<String> {
        let text = format!("{summary}\n{description}");
        let text = text.trim();
        if text.is_empty() {
            return Ok(DEFAULT_TEAM.to_string());
        }

        let vector = self
            .embedder
            .embed(text)
            .await
            .context("Failed to embed ticket text")?;

        let team = match self.best_match(&vector) {
            Some((name, score)) if score >= SIMILARITY_FLOOR => {
                debug!(team = name, score, "classified");
                name.to_string()
            }
            best => {
                debug!(?best, "below similarity floor");
                DEFAULT_TEAM.to_string()
            }
        };
        Ok(team)
    }

    /// Highest-scoring profile; the first one wins ties.
    pub fn best_match(&self, vector: &[f32]) -> Option<(&str, f32)> {
        let mut best: Option<(&str, f32)> = None;
        for profile in &self.profiles {
            let score = cosine_similarity(vector, &profile.embedding);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((profile.name.as_str(), score));
            }
        }
        best
    }
}
