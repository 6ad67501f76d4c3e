//! Hermes Core - Agent Discovery & Query Routing
//!
//! This crate provides the core logic for the Hermes orchestrator:
//! - Registry: static name→address configuration plus live capability
//!   discovery, published as immutable versioned snapshots
//! - Capability Index: keyword scoring over a snapshot
//! - Router: model-based agent selection with a deterministic fallback
//! - Dispatcher: forwarding a query to the chosen agent
//! - Transport: the capability-set interface to remote agents

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod card;
pub mod dispatcher;
pub mod error;
pub mod index;
pub mod orchestrator;
pub mod registry;
pub mod router;
pub mod transport;

pub use card::{AgentCard, AgentSkill, WELL_KNOWN_CARD_PATH};
pub use dispatcher::Dispatcher;
pub use error::{Error, Result};
pub use index::{CapabilityIndex, ScoredAgent, TAG_WEIGHT, TEXT_WEIGHT};
pub use orchestrator::{AgentReply, Orchestrator, OrchestratorReply};
pub use registry::{AgentDirectory, DiscoveryReport, LiveAgent, Registry, RegistryConfig};
pub use router::{ModelRouteFailure, RouteMethod, Router, RouterConfig, RoutingDecision};
pub use transport::{AgentTransport, HttpTransport, HttpTransportConfig, TransportError};
