//! Agent card data model.
//!
//! An agent card is the capability descriptor an agent publishes about
//! itself at `/.well-known/agent.json`: who it is, where it lives, and
//! which skills it offers. Cards are immutable once fetched; re-discovery
//! replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Well-known path where agents serve their card.
pub const WELL_KNOWN_CARD_PATH: &str = "/.well-known/agent.json";

/// Capability descriptor published by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    /// Display name the agent publishes for itself
    pub name: String,
    /// Free-text description of what the agent does
    #[serde(default)]
    pub description: String,
    /// Network endpoint the agent answers on
    pub url: String,
    /// Skills the agent offers
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
    /// Protocol capabilities (opaque to routing)
    #[serde(default)]
    pub capabilities: HashMap<String, serde_json::Value>,
    /// Card-level tags (optional; most agents tag per skill)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// A single skill advertised on an agent card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Stable skill identifier
    pub id: String,
    /// Skill name
    pub name: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Keyword tags
    #[serde(default)]
    pub tags: Vec<String>,
    /// Example queries this skill handles
    #[serde(default)]
    pub examples: Vec<String>,
}

impl AgentCard {
    /// All tags on the card and its skills, lowercased and deduplicated.
    #[must_use]
    pub fn tag_set(&self) -> BTreeSet<String> {
        self.tags
            .iter()
            .chain(self.skills.iter().flat_map(|s| s.tags.iter()))
            .map(|t| t.to_lowercase())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserializes_wire_shape() {
        // Exact field names from the capability-fetch response
        let raw = r#"{
            "name": "Tell Time Agent",
            "description": "Tells the current time",
            "url": "http://localhost:10001/",
            "skills": [{
                "id": "tell_time",
                "name": "Tell Time",
                "description": "Replies with the current time",
                "tags": ["Time", "clock"],
                "examples": ["What time is it?", "current time please"]
            }],
            "capabilities": {"streaming": false}
        }"#;

        let card: AgentCard = serde_json::from_str(raw).unwrap();
        assert_eq!(card.name, "Tell Time Agent");
        assert_eq!(card.url, "http://localhost:10001/");
        assert_eq!(card.skills.len(), 1);
        assert_eq!(card.skills[0].id, "tell_time");
        assert_eq!(card.skills[0].examples.len(), 2);
        assert!(card.capabilities.contains_key("streaming"));
    }

    #[test]
    fn test_card_tolerates_missing_optionals() {
        let raw = r#"{"name": "Minimal", "url": "http://localhost:9/"}"#;
        let card: AgentCard = serde_json::from_str(raw).unwrap();
        assert!(card.description.is_empty());
        assert!(card.skills.is_empty());
        assert!(card.capabilities.is_empty());
    }

    #[test]
    fn test_tag_set_is_lowercased_and_merged() {
        let raw = r#"{
            "name": "A", "url": "http://a/",
            "tags": ["Greeting"],
            "skills": [
                {"id": "s1", "name": "S1", "tags": ["Hello", "greeting"]},
                {"id": "s2", "name": "S2", "tags": ["conversation"]}
            ]
        }"#;
        let card: AgentCard = serde_json::from_str(raw).unwrap();
        let tags = card.tag_set();
        assert_eq!(
            tags.into_iter().collect::<Vec<_>>(),
            vec!["conversation", "greeting", "hello"]
        );
    }
}
