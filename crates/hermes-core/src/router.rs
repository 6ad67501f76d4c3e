//! Query router: model-based selection with a deterministic fallback.
//!
//! Two strategies, evaluated fresh per query with no persistent state:
//!
//! 1. Ask an LLM to pick an agent from the live directory, and validate
//!    the answer against the directory.
//! 2. On any model failure (disabled, timeout, API error, unusable name),
//!    fall back to keyword scoring, then to the first agent in stable
//!    order. As long as one agent is live, routing always produces a
//!    deterministic answer.

use crate::error::{Error, Result};
use crate::index::CapabilityIndex;
use crate::registry::AgentDirectory;
use hermes_llm::{CompletionRequest, LlmProvider, Message};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error as ThisError;
use tracing::{debug, warn};

/// System prompt for the agent-selection call.
const ROUTING_SYSTEM_PROMPT: &str =
    "You are an intelligent agent orchestrator. Analyze the user query and \
     select the MOST APPROPRIATE agent to handle it.";

/// Build the user prompt embedding the agent catalog and the query.
fn routing_prompt(catalog: &str, query: &str) -> String {
    format!(
        "{catalog}\n\
         \n\
         User Query: \"{query}\"\n\
         \n\
         Rules:\n\
         1. Choose the agent whose skills BEST match the user's request\n\
         2. Respond with ONLY the agent name\n\
         3. If no agent is perfect, choose the closest match\n\
         4. Be concise - respond with just the agent name\n\
         \n\
         Agent to use:"
    )
}

/// Which strategy produced a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMethod {
    /// The LLM picked the agent
    Model,
    /// Keyword scoring or the deterministic default picked the agent
    Fallback,
}

impl RouteMethod {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::Fallback => "fallback",
        }
    }
}

/// Output of the router; produced fresh per query, never persisted.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    /// Chosen agent name (always a member of the directory used)
    pub agent: String,
    /// Strategy that produced the choice
    pub method: RouteMethod,
    /// False only for the last-resort first-agent default
    pub confident: bool,
}

/// Why the model-based attempt did not produce a usable agent name.
///
/// Every variant recovers to the fallback; this is a result the router
/// branches on, not an error it propagates.
#[derive(Debug, ThisError)]
pub enum ModelRouteFailure {
    /// No provider configured, or disabled by configuration
    #[error("model routing disabled")]
    Disabled,

    /// The call did not return within the configured timeout
    #[error("model call timed out after {0}ms")]
    Timeout(u64),

    /// The provider call itself failed
    #[error("model call failed: {0}")]
    Call(String),

    /// The reply did not name any live agent
    #[error("model returned unusable agent name: {raw:?}")]
    InvalidName {
        /// Raw model output, for logging
        raw: String,
    },
}

/// Router configuration with explicit defaults.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Whether the model-based strategy runs at all
    pub model_enabled: bool,
    /// Upper bound on the model call round trip
    pub model_timeout: Duration,
    /// Token cap for the model reply (an agent name is a few tokens)
    pub max_tokens: u32,
    /// Sampling temperature for the model call
    pub temperature: f32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            model_enabled: true,
            model_timeout: Duration::from_secs(5),
            max_tokens: 32,
            temperature: 0.0,
        }
    }
}

/// Two-tier query router over a directory snapshot.
pub struct Router {
    provider: Option<Arc<dyn LlmProvider>>,
    config: RouterConfig,
}

impl Router {
    /// Create a router with no provider (fallback-only).
    #[must_use]
    pub fn new(config: RouterConfig) -> Self {
        Self {
            provider: None,
            config,
        }
    }

    /// Attach an LLM provider for the model-based strategy.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Route a query to exactly one live agent.
    ///
    /// Fails only with [`Error::NoAgentsAvailable`] when the directory is
    /// empty; otherwise a decision is always produced.
    pub async fn route(&self, directory: &AgentDirectory, query: &str) -> Result<RoutingDecision> {
        if directory.is_empty() {
            return Err(Error::NoAgentsAvailable);
        }

        match self.route_by_model(directory, query).await {
            Ok(agent) => {
                debug!(agent = %agent, "Model selected agent");
                Ok(RoutingDecision {
                    agent,
                    method: RouteMethod::Model,
                    confident: true,
                })
            }
            Err(ModelRouteFailure::Disabled) => {
                debug!("Model routing disabled, using fallback");
                Self::fallback(directory, query)
            }
            Err(failure) => {
                warn!(error = %failure, "Model routing failed, using fallback");
                Self::fallback(directory, query)
            }
        }
    }

    /// Model-based strategy: one completion call, validated against the
    /// directory.
    async fn route_by_model(
        &self,
        directory: &AgentDirectory,
        query: &str,
    ) -> std::result::Result<String, ModelRouteFailure> {
        let provider = match &self.provider {
            Some(p) if self.config.model_enabled => p,
            _ => return Err(ModelRouteFailure::Disabled),
        };

        let request = CompletionRequest::new("")
            .with_message(Message::system(ROUTING_SYSTEM_PROMPT))
            .with_message(Message::user(routing_prompt(&directory.catalog(), query)))
            .with_max_tokens(self.config.max_tokens)
            .with_temperature(self.config.temperature);

        let timeout_ms = self.config.model_timeout.as_millis() as u64;
        let response = tokio::time::timeout(self.config.model_timeout, provider.complete(request))
            .await
            .map_err(|_| ModelRouteFailure::Timeout(timeout_ms))?
            .map_err(|e| ModelRouteFailure::Call(e.to_string()))?;

        let raw = response.content;
        let name = normalize_agent_name(&raw);
        if name.is_empty() {
            return Err(ModelRouteFailure::InvalidName { raw });
        }

        // Exact match first
        if directory.get(&name).is_some() {
            return Ok(name);
        }

        // Partial match: the model often decorates the name
        for candidate in directory.names() {
            if name.contains(candidate) || candidate.contains(name.as_str()) {
                debug!(raw = %raw, agent = %candidate, "Model reply matched partially");
                return Ok(candidate.to_string());
            }
        }

        Err(ModelRouteFailure::InvalidName { raw })
    }

    /// Deterministic fallback: keyword scoring, then first agent in stable
    /// order. Pure function of the directory and query.
    pub fn fallback(directory: &AgentDirectory, query: &str) -> Result<RoutingDecision> {
        let hits = CapabilityIndex::new(directory).search(query);
        if let Some(top) = hits.first() {
            debug!(agent = %top.name, score = top.score, "Fallback keyword match");
            return Ok(RoutingDecision {
                agent: top.name.clone(),
                method: RouteMethod::Fallback,
                confident: true,
            });
        }

        let first = directory.first().ok_or(Error::NoAgentsAvailable)?;
        debug!(agent = %first.name, "No keyword match, using first agent");
        Ok(RoutingDecision {
            agent: first.name.clone(),
            method: RouteMethod::Fallback,
            confident: false,
        })
    }
}

/// Normalize a model reply down to a candidate agent name: first line,
/// trimmed of quotes and trailing punctuation, lowercased.
fn normalize_agent_name(raw: &str) -> String {
    raw.lines()
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | ',' | ':' | ';' | '!'))
        .to_lowercase()
}

#[cfg(test)]
mod tests;
