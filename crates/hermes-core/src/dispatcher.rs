//! Dispatcher: forwards a routed query to the selected agent.
//!
//! One outbound call, reply returned verbatim, no retries. Retry policy,
//! if any, belongs to the caller.

use crate::error::{Error, Result};
use crate::registry::AgentDirectory;
use crate::transport::AgentTransport;
use std::sync::Arc;
use tracing::debug;

/// Forwards queries over the agent transport.
pub struct Dispatcher {
    transport: Arc<dyn AgentTransport>,
}

impl Dispatcher {
    /// Create a dispatcher over a transport.
    pub fn new(transport: Arc<dyn AgentTransport>) -> Self {
        Self { transport }
    }

    /// Send a query to a live agent and return its reply text verbatim.
    ///
    /// Fails with [`Error::AgentUnreachable`] when the agent is not in
    /// the directory or the call errors or times out.
    pub async fn send(
        &self,
        directory: &AgentDirectory,
        agent: &str,
        query: &str,
    ) -> Result<String> {
        let live = directory.get(agent).ok_or_else(|| Error::AgentUnreachable {
            agent: agent.to_string(),
            reason: "not in the current directory".to_string(),
        })?;

        debug!(agent = %agent, endpoint = %live.endpoint, "Dispatching query");

        self.transport
            .send_text(&live.endpoint, query)
            .await
            .map_err(|e| Error::AgentUnreachable {
                agent: agent.to_string(),
                reason: e.to_string(),
            })
    }
}
