//! Capability index: keyword scoring over a directory snapshot.
//!
//! A pure, read-only view. Query tokens are matched case-insensitively
//! against each agent's description, skill names/descriptions, examples,
//! and tags; an exact tag hit outweighs a plain substring hit.

use crate::registry::{AgentDirectory, LiveAgent};
use std::cmp::Ordering;

/// Score for a token that exactly matches a tag.
pub const TAG_WEIGHT: f32 = 2.0;

/// Score for a token found as a substring of descriptive text.
pub const TEXT_WEIGHT: f32 = 1.0;

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredAgent {
    /// Registry name of the matching agent
    pub name: String,
    /// Accumulated match score
    pub score: f32,
}

/// Read-only keyword index over a directory snapshot.
pub struct CapabilityIndex<'a> {
    directory: &'a AgentDirectory,
}

impl<'a> CapabilityIndex<'a> {
    /// Build an index view over a snapshot.
    #[must_use]
    pub fn new(directory: &'a AgentDirectory) -> Self {
        Self { directory }
    }

    /// Score every live agent against the query.
    ///
    /// Returns hits ordered by descending score; equal scores keep the
    /// directory's stable order. Empty when no token matches anything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<ScoredAgent> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<ScoredAgent> = self
            .directory
            .iter()
            .filter_map(|agent| {
                let score = score_agent(agent, &tokens);
                (score > 0.0).then(|| ScoredAgent {
                    name: agent.name.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort: ties keep directory order
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits
    }
}

/// Lowercase, split on non-alphanumeric, drop single characters, dedup.
fn tokenize(query: &str) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
    {
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

fn score_agent(agent: &LiveAgent, tokens: &[String]) -> f32 {
    let tags = agent.card.tag_set();

    let mut haystack = agent.card.description.to_lowercase();
    for skill in &agent.card.skills {
        haystack.push(' ');
        haystack.push_str(&skill.name.to_lowercase());
        haystack.push(' ');
        haystack.push_str(&skill.description.to_lowercase());
        for example in &skill.examples {
            haystack.push(' ');
            haystack.push_str(&example.to_lowercase());
        }
    }

    let mut score = 0.0;
    for token in tokens {
        if tags.contains(token) {
            score += TAG_WEIGHT;
        } else if haystack.contains(token.as_str()) {
            score += TEXT_WEIGHT;
        }
    }
    score
}
