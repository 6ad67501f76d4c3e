//! Error types for hermes-core
//!
//! Routing failures are typed so callers can distinguish "no agents
//! registered" from "selected agent unreachable" and decide whether to
//! retry, reconfigure, or report upstream.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Registry configuration missing or malformed; fatal at startup
    #[error("configuration error: {0}")]
    Config(String),

    /// One agent's capability fetch failed; the agent is excluded from routing
    #[error("discovery failed for '{agent}': {reason}")]
    Discovery {
        /// Configured agent name
        agent: String,
        /// What went wrong
        reason: String,
    },

    /// The model-based routing call failed or returned unusable output
    #[error("routing model error: {0}")]
    RoutingModel(String),

    /// No live agent descriptors are available to route to
    #[error("no agents available")]
    NoAgentsAvailable,

    /// Dispatch to the selected agent failed
    #[error("agent '{agent}' unreachable: {reason}")]
    AgentUnreachable {
        /// Selected agent name
        agent: String,
        /// What went wrong
        reason: String,
    },

    /// Internal error (serialization, transport plumbing)
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
