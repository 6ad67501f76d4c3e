//! Agent registry: static configuration plus live capability discovery.
//!
//! The registry pairs a configured `name → base address` mapping with the
//! agent cards fetched from those addresses. Discovery is best-effort: a
//! failed fetch excludes that one agent and never aborts the pass. Each
//! pass publishes a fresh immutable [`AgentDirectory`] snapshot in a single
//! atomic swap, so concurrent routing never observes a half-updated
//! mapping.

use crate::card::AgentCard;
use crate::error::{Error, Result};
use crate::transport::AgentTransport;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Static registry configuration: agent name → base address.
///
/// Iteration order is lexicographic by name and is the stable order used
/// everywhere downstream (directory listing, fallback default, tie-breaks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    entries: BTreeMap<String, String>,
}

impl RegistryConfig {
    /// Parse a registry document: a JSON object of `"name": "base-url"` pairs.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: BTreeMap<String, String> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid registry document: {e}")))?;
        if entries.is_empty() {
            return Err(Error::Config("registry has no agents".to_string()));
        }
        Ok(Self { entries })
    }

    /// Load the registry document from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Configured entries in stable order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Base address for a configured agent.
    #[must_use]
    pub fn address_of(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|s| s.as_str())
    }

    /// Number of configured agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the configuration is empty (never true after a successful load).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One live agent: configured name, dispatch endpoint, fetched card.
#[derive(Debug, Clone)]
pub struct LiveAgent {
    /// Configured registry name — the routing key
    pub name: String,
    /// Base address queries are dispatched to (from configuration)
    pub endpoint: String,
    /// Capability card fetched from the agent
    pub card: AgentCard,
}

/// Immutable, versioned snapshot of discovered agents.
///
/// Agents appear in the registry's stable order. The snapshot may be
/// empty when no configured agent answered discovery.
#[derive(Debug, Default)]
pub struct AgentDirectory {
    version: u64,
    agents: Vec<LiveAgent>,
}

impl AgentDirectory {
    /// Snapshot version; incremented on every discovery pass.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of live agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether any agent is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Look up a live agent by its registry name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&LiveAgent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Live agents in stable order.
    pub fn iter(&self) -> impl Iterator<Item = &LiveAgent> {
        self.agents.iter()
    }

    /// Registry names of live agents, in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.agents.iter().map(|a| a.name.as_str())
    }

    /// First live agent in stable order (the deterministic routing default).
    #[must_use]
    pub fn first(&self) -> Option<&LiveAgent> {
        self.agents.first()
    }

    /// Build a directory directly from live agents, bypassing discovery.
    #[cfg(test)]
    pub(crate) fn for_tests(agents: Vec<LiveAgent>) -> Self {
        Self { version: 1, agents }
    }

    /// Formatted catalog of all live agents, used both for the routing
    /// prompt and for human-facing listings.
    #[must_use]
    pub fn catalog(&self) -> String {
        if self.agents.is_empty() {
            return "No agents available.".to_string();
        }
        let mut out = String::from("Available agents:\n");
        for agent in &self.agents {
            out.push_str(&format!(
                "\n- **{}**: {}\n",
                agent.name, agent.card.description
            ));
            if !agent.card.skills.is_empty() {
                out.push_str("  Skills:\n");
                for skill in &agent.card.skills {
                    out.push_str(&format!("    • {}: {}\n", skill.name, skill.description));
                    if !skill.examples.is_empty() {
                        let examples: Vec<&str> =
                            skill.examples.iter().take(3).map(|s| s.as_str()).collect();
                        out.push_str(&format!("      Examples: {}\n", examples.join(", ")));
                    }
                }
            }
            let tags = agent.card.tag_set();
            if !tags.is_empty() {
                let tags: Vec<String> = tags.into_iter().collect();
                out.push_str(&format!("  Tags: {}\n", tags.join(", ")));
            }
        }
        out
    }
}

/// Outcome of one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryReport {
    /// Agents whose card fetch succeeded
    pub discovered: usize,
    /// Agents excluded this pass: (name, reason)
    pub failed: Vec<(String, String)>,
    /// When the pass completed
    pub refreshed_at: DateTime<Utc>,
}

/// Registry with live capability discovery.
pub struct Registry {
    config: RegistryConfig,
    transport: Arc<dyn AgentTransport>,
    directory: RwLock<Arc<AgentDirectory>>,
}

impl Registry {
    /// Create a registry over a configuration and a transport.
    ///
    /// The directory starts empty; call [`Registry::discover`] to populate it.
    pub fn new(config: RegistryConfig, transport: Arc<dyn AgentTransport>) -> Self {
        Self {
            config,
            transport,
            directory: RwLock::new(Arc::new(AgentDirectory::default())),
        }
    }

    /// The static configuration this registry was built from.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Current directory snapshot (cheap `Arc` clone; immutable).
    pub async fn snapshot(&self) -> Arc<AgentDirectory> {
        Arc::clone(&*self.directory.read().await)
    }

    /// Run one discovery pass: fetch every configured agent's card
    /// concurrently, then atomically publish the new snapshot.
    ///
    /// Per-agent failures are logged and excluded; they never abort the
    /// pass or leave the previous snapshot partially updated.
    pub async fn discover(&self) -> DiscoveryReport {
        let targets: Vec<(String, String)> = self
            .config
            .entries()
            .map(|(name, url)| (name.to_string(), url.to_string()))
            .collect();

        let fetches = targets.into_iter().map(|(name, url)| {
            let transport = Arc::clone(&self.transport);
            async move {
                let outcome = transport.fetch_card(&url).await;
                (name, url, outcome)
            }
        });

        let results = futures::future::join_all(fetches).await;

        let mut agents = Vec::new();
        let mut failed = Vec::new();
        for (name, url, outcome) in results {
            match outcome {
                Ok(card) => {
                    info!(agent = %name, description = %card.description, "Agent discovered");
                    agents.push(LiveAgent {
                        name,
                        endpoint: url,
                        card,
                    });
                }
                Err(e) => {
                    warn!(agent = %name, error = %e, "Agent discovery failed, excluding");
                    failed.push((name, e.to_string()));
                }
            }
        }

        let discovered = agents.len();

        // Single atomic swap: readers hold the old Arc until they drop it.
        {
            let mut guard = self.directory.write().await;
            let version = guard.version() + 1;
            *guard = Arc::new(AgentDirectory { version, agents });
        }

        DiscoveryReport {
            discovered,
            failed,
            refreshed_at: Utc::now(),
        }
    }

    /// Re-run discovery, replacing the previous snapshot wholesale.
    pub async fn refresh(&self) -> DiscoveryReport {
        self.discover().await
    }
}

#[cfg(test)]
mod tests;
