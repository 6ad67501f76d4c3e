//! Orchestrator: registry + router + dispatcher facade.
//!
//! Owns the full per-query flow: meta-commands, routing over the current
//! snapshot, dispatch to the chosen agent. Queries run concurrently over
//! immutable snapshots; only an explicit refresh mutates shared state.

use crate::dispatcher::Dispatcher;
use crate::error::Result;
use crate::registry::{DiscoveryReport, Registry};
use crate::router::{RouteMethod, Router, RoutingDecision};
use std::sync::Arc;
use tracing::info;

/// A dispatched query's reply, annotated with how it was routed.
#[derive(Debug, Clone)]
pub struct AgentReply {
    /// Agent that handled the query
    pub agent: String,
    /// Strategy that selected the agent
    pub method: RouteMethod,
    /// False when the agent was the last-resort default
    pub confident: bool,
    /// Reply text, verbatim from the agent
    pub text: String,
}

/// What the orchestrator produced for one input.
#[derive(Debug, Clone)]
pub enum OrchestratorReply {
    /// The input was a listing meta-command; no agent was called
    Listing(String),
    /// The input was routed and dispatched
    Answer(AgentReply),
}

/// Ties registry, router, and dispatcher into one query pipeline.
pub struct Orchestrator {
    registry: Arc<Registry>,
    router: Router,
    dispatcher: Dispatcher,
}

impl Orchestrator {
    /// Assemble an orchestrator from its parts.
    pub fn new(registry: Arc<Registry>, router: Router, dispatcher: Dispatcher) -> Self {
        Self {
            registry,
            router,
            dispatcher,
        }
    }

    /// The registry backing this orchestrator.
    #[must_use]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Route a query without dispatching it.
    pub async fn route(&self, query: &str) -> Result<RoutingDecision> {
        let directory = self.registry.snapshot().await;
        self.router.route(&directory, query).await
    }

    /// Re-run discovery, atomically replacing the directory snapshot.
    pub async fn refresh(&self) -> DiscoveryReport {
        self.registry.refresh().await
    }

    /// Handle one user input: listing meta-commands are answered from the
    /// snapshot; everything else is routed and dispatched.
    pub async fn handle(&self, query: &str) -> Result<OrchestratorReply> {
        let directory = self.registry.snapshot().await;

        if is_listing_command(query) {
            return Ok(OrchestratorReply::Listing(directory.catalog()));
        }

        let decision = self.router.route(&directory, query).await?;
        info!(
            agent = %decision.agent,
            method = decision.method.as_str(),
            confident = decision.confident,
            "Query routed"
        );

        let text = self
            .dispatcher
            .send(&directory, &decision.agent, query)
            .await?;

        Ok(OrchestratorReply::Answer(AgentReply {
            agent: decision.agent,
            method: decision.method,
            confident: decision.confident,
            text,
        }))
    }
}

/// Listing meta-commands answered without routing.
fn is_listing_command(query: &str) -> bool {
    matches!(
        query.trim().to_lowercase().as_str(),
        "list" | "agents" | "list agents" | "show agents"
    )
}
