use super::*;
use crate::card::{AgentCard, AgentSkill};
use crate::transport::{AgentTransport, TransportError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Serves canned cards by base url; entries can be removed between passes
/// to simulate agents going away.
struct StaticTransport {
    cards: Mutex<HashMap<String, AgentCard>>,
}

impl StaticTransport {
    fn new(cards: Vec<(&str, AgentCard)>) -> Self {
        Self {
            cards: Mutex::new(
                cards
                    .into_iter()
                    .map(|(url, card)| (url.to_string(), card))
                    .collect(),
            ),
        }
    }

    fn remove(&self, url: &str) {
        self.cards.lock().unwrap().remove(url);
    }
}

#[async_trait::async_trait]
impl AgentTransport for StaticTransport {
    async fn fetch_card(
        &self,
        base_url: &str,
    ) -> std::result::Result<AgentCard, TransportError> {
        self.cards
            .lock()
            .unwrap()
            .get(base_url)
            .cloned()
            .ok_or_else(|| TransportError::Http("connection refused".to_string()))
    }

    async fn send_text(
        &self,
        _base_url: &str,
        _query: &str,
    ) -> std::result::Result<String, TransportError> {
        Err(TransportError::Http("dispatch not supported".to_string()))
    }
}

fn card(name: &str, description: &str, tags: &[&str]) -> AgentCard {
    AgentCard {
        name: name.to_string(),
        description: description.to_string(),
        url: format!("http://{name}.local/"),
        skills: vec![AgentSkill {
            id: format!("{name}_main"),
            name: name.to_string(),
            description: description.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            examples: Vec::new(),
        }],
        capabilities: HashMap::new(),
        tags: Vec::new(),
    }
}

#[test]
fn test_config_parses_valid_document() {
    let config = RegistryConfig::from_json_str(
        r#"{"time_agent": "http://localhost:10001", "greeting_agent": "http://localhost:10002"}"#,
    )
    .unwrap();

    assert_eq!(config.len(), 2);
    assert_eq!(config.address_of("time_agent"), Some("http://localhost:10001"));

    // Stable order is lexicographic by name
    let names: Vec<&str> = config.entries().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["greeting_agent", "time_agent"]);
}

#[test]
fn test_config_rejects_malformed_document() {
    let err = RegistryConfig::from_json_str("not json").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_config_rejects_empty_document() {
    let err = RegistryConfig::from_json_str("{}").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_config_rejects_non_string_addresses() {
    let err = RegistryConfig::from_json_str(r#"{"a": 1}"#).unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[tokio::test]
async fn test_discovery_excludes_failed_agents() {
    // Three configured, only two serve cards
    let config = RegistryConfig::from_json_str(
        r#"{
            "greeting_agent": "http://g.local",
            "time_agent": "http://t.local",
            "dead_agent": "http://dead.local"
        }"#,
    )
    .unwrap();

    let transport = Arc::new(StaticTransport::new(vec![
        ("http://g.local", card("greeter", "Says hello", &["greeting"])),
        ("http://t.local", card("clock", "Tells time", &["time"])),
    ]));

    let registry = Registry::new(config, transport);
    let report = registry.discover().await;

    assert_eq!(report.discovered, 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "dead_agent");

    let directory = registry.snapshot().await;
    assert_eq!(directory.len(), 2);
    assert!(directory.get("greeting_agent").is_some());
    assert!(directory.get("time_agent").is_some());
    assert!(directory.get("dead_agent").is_none());
}

#[tokio::test]
async fn test_directory_preserves_stable_order() {
    let config = RegistryConfig::from_json_str(
        r#"{"zeta": "http://z.local", "alpha": "http://a.local"}"#,
    )
    .unwrap();

    let transport = Arc::new(StaticTransport::new(vec![
        ("http://z.local", card("z", "last", &[])),
        ("http://a.local", card("a", "first", &[])),
    ]));

    let registry = Registry::new(config, transport);
    registry.discover().await;

    let directory = registry.snapshot().await;
    let names: Vec<&str> = directory.names().collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(directory.first().unwrap().name, "alpha");
}

#[tokio::test]
async fn test_refresh_replaces_snapshot_wholesale() {
    let config = RegistryConfig::from_json_str(
        r#"{"greeting_agent": "http://g.local", "time_agent": "http://t.local"}"#,
    )
    .unwrap();

    let transport = Arc::new(StaticTransport::new(vec![
        ("http://g.local", card("greeter", "Says hello", &["greeting"])),
        ("http://t.local", card("clock", "Tells time", &["time"])),
    ]));

    let registry = Registry::new(config, Arc::clone(&transport) as Arc<dyn AgentTransport>);
    registry.discover().await;

    let before = registry.snapshot().await;
    assert_eq!(before.len(), 2);
    assert_eq!(before.version(), 1);

    // time_agent goes away; refresh must drop it in one swap
    transport.remove("http://t.local");
    let report = registry.refresh().await;
    assert_eq!(report.discovered, 1);

    let after = registry.snapshot().await;
    assert_eq!(after.len(), 1);
    assert_eq!(after.version(), 2);
    assert!(after.get("time_agent").is_none());

    // A reader holding the old snapshot still sees the old, complete view
    assert_eq!(before.len(), 2);
    assert!(before.get("time_agent").is_some());
}

#[tokio::test]
async fn test_empty_directory_before_first_discovery() {
    let config = RegistryConfig::from_json_str(r#"{"a": "http://a.local"}"#).unwrap();
    let transport = Arc::new(StaticTransport::new(vec![]));
    let registry = Registry::new(config, transport);

    let directory = registry.snapshot().await;
    assert!(directory.is_empty());
    assert_eq!(directory.version(), 0);
}

#[test]
fn test_catalog_lists_skills_and_tags() {
    let directory = AgentDirectory {
        version: 1,
        agents: vec![LiveAgent {
            name: "time_agent".to_string(),
            endpoint: "http://t.local".to_string(),
            card: {
                let mut c = card("clock", "Tells the current time", &["time", "clock"]);
                c.skills[0].examples =
                    vec!["What time is it?".to_string(), "time please".to_string()];
                c
            },
        }],
    };

    let catalog = directory.catalog();
    assert!(catalog.contains("**time_agent**"));
    assert!(catalog.contains("Tells the current time"));
    assert!(catalog.contains("Examples: What time is it?, time please"));
    assert!(catalog.contains("Tags: clock, time"));
}

#[test]
fn test_catalog_empty_directory() {
    let directory = AgentDirectory::default();
    assert_eq!(directory.catalog(), "No agents available.");
}
