//! Agent transport: capability fetch and message dispatch.
//!
//! Components above this layer (Registry, Dispatcher) depend only on the
//! `AgentTransport` trait, never on a concrete wire protocol. The shipped
//! implementation speaks JSON-RPC 2.0 `message/send` over HTTP, with the
//! agent card served at the well-known path.

use crate::card::{AgentCard, WELL_KNOWN_CARD_PATH};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Transport-level error
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP request failed (connect, timeout, TLS)
    #[error("http error: {0}")]
    Http(String),

    /// Non-success HTTP status
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Truncated response body
        body: String,
    },

    /// Response body could not be parsed
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// Agent returned a JSON-RPC error object
    #[error("agent error {code}: {message}")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// Error message from the agent
        message: String,
    },
}

/// Capability-set interface to a remote agent.
///
/// One implementation per transport; routing logic never sees concrete
/// agent types.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Fetch the agent's capability card from its base address.
    async fn fetch_card(&self, base_url: &str) -> std::result::Result<AgentCard, TransportError>;

    /// Send a free-text query to the agent and return its reply text verbatim.
    async fn send_text(
        &self,
        base_url: &str,
        query: &str,
    ) -> std::result::Result<String, TransportError>;
}

// ============================================================================
// JSON-RPC envelope
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest<T> {
    jsonrpc: &'static str,
    id: String,
    method: &'static str,
    params: T,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Serialize)]
struct MessageSendParams {
    message: OutboundMessage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundMessage {
    role: &'static str,
    parts: Vec<TextPart>,
    message_id: String,
}

#[derive(Debug, Serialize)]
struct TextPart {
    kind: &'static str,
    text: String,
}

/// Pull display text out of a `message/send` result.
///
/// Agents differ in where they put the reply: completed tasks carry
/// artifacts, working tasks carry a status message, bare messages carry
/// parts directly. Checked in that order; the raw result JSON is the
/// last resort so the caller always gets something printable.
fn extract_reply_text(result: &serde_json::Value) -> String {
    let part_text = |parts: &serde_json::Value| -> Option<String> {
        let texts: Vec<&str> = parts
            .as_array()?
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join("\n"))
        }
    };

    if let Some(artifacts) = result.get("artifacts").and_then(|a| a.as_array()) {
        for artifact in artifacts {
            if let Some(text) = artifact.get("parts").and_then(&part_text) {
                return text;
            }
        }
    }

    if let Some(text) = result
        .pointer("/status/message/parts")
        .and_then(&part_text)
    {
        return text;
    }

    if let Some(text) = result.get("parts").and_then(&part_text) {
        return text;
    }

    result.to_string()
}

/// Truncate a response body for error messages without splitting a character.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }
    let end = body
        .char_indices()
        .take_while(|(i, _)| *i < MAX)
        .last()
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0);
    format!("{}...", &body[..end])
}

// ============================================================================
// HTTP implementation
// ============================================================================

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    /// Timeout for capability-card fetches
    pub card_timeout: Duration,
    /// Timeout for dispatch calls (agents may run an LLM before replying)
    pub send_timeout: Duration,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            card_timeout: Duration::from_secs(10),
            send_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP transport speaking the A2A-style JSON-RPC surface.
pub struct HttpTransport {
    client: Client,
    config: HttpTransportConfig,
}

impl HttpTransport {
    /// Create a new HTTP transport.
    pub fn new(config: HttpTransportConfig) -> std::result::Result<Self, TransportError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Create a transport with default timeouts.
    pub fn with_defaults() -> std::result::Result<Self, TransportError> {
        Self::new(HttpTransportConfig::default())
    }

    fn card_url(base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), WELL_KNOWN_CARD_PATH)
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn fetch_card(&self, base_url: &str) -> std::result::Result<AgentCard, TransportError> {
        let url = Self::card_url(base_url);
        debug!(url = %url, "Fetching agent card");

        let response = self
            .client
            .get(&url)
            .timeout(self.config.card_timeout)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        response
            .json::<AgentCard>()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }

    async fn send_text(
        &self,
        base_url: &str,
        query: &str,
    ) -> std::result::Result<String, TransportError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: Uuid::new_v4().to_string(),
            method: "message/send",
            params: MessageSendParams {
                message: OutboundMessage {
                    role: "user",
                    parts: vec![TextPart {
                        kind: "text",
                        text: query.to_string(),
                    }],
                    message_id: Uuid::new_v4().simple().to_string(),
                },
            },
        };

        let response = self
            .client
            .post(base_url)
            .timeout(self.config.send_timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let envelope: JsonRpcResponse = response
            .json()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(TransportError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        let result = envelope
            .result
            .ok_or_else(|| TransportError::InvalidBody("missing result".to_string()))?;

        Ok(extract_reply_text(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_url_joins_well_known_path() {
        assert_eq!(
            HttpTransport::card_url("http://localhost:10001"),
            "http://localhost:10001/.well-known/agent.json"
        );
        assert_eq!(
            HttpTransport::card_url("http://localhost:10001/"),
            "http://localhost:10001/.well-known/agent.json"
        );
    }

    #[test]
    fn test_request_envelope_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "req-1".to_string(),
            method: "message/send",
            params: MessageSendParams {
                message: OutboundMessage {
                    role: "user",
                    parts: vec![TextPart {
                        kind: "text",
                        text: "What time is it?".to_string(),
                    }],
                    message_id: "abc".to_string(),
                },
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["jsonrpc"], "2.0");
        assert_eq!(value["method"], "message/send");
        assert_eq!(value["params"]["message"]["role"], "user");
        assert_eq!(value["params"]["message"]["parts"][0]["kind"], "text");
        assert_eq!(value["params"]["message"]["messageId"], "abc");
    }

    #[test]
    fn test_extract_reply_from_artifacts() {
        let result = serde_json::json!({
            "artifacts": [{"parts": [{"kind": "text", "text": "It is 3pm"}]}],
            "status": {"state": "completed"}
        });
        assert_eq!(extract_reply_text(&result), "It is 3pm");
    }

    #[test]
    fn test_extract_reply_from_status_message() {
        let result = serde_json::json!({
            "status": {
                "state": "input-required",
                "message": {"parts": [{"kind": "text", "text": "Which timezone?"}]}
            }
        });
        assert_eq!(extract_reply_text(&result), "Which timezone?");
    }

    #[test]
    fn test_extract_reply_from_bare_message() {
        let result = serde_json::json!({
            "role": "agent",
            "parts": [{"kind": "text", "text": "Hello!"}, {"kind": "text", "text": "How can I help?"}]
        });
        assert_eq!(extract_reply_text(&result), "Hello!\nHow can I help?");
    }

    #[test]
    fn test_extract_reply_falls_back_to_raw_json() {
        let result = serde_json::json!({"unexpected": true});
        assert!(extract_reply_text(&result).contains("unexpected"));
    }

    #[test]
    fn test_rpc_error_surfaces() {
        let raw = r#"{"jsonrpc": "2.0", "id": "1", "error": {"code": -32603, "message": "boom"}}"#;
        let envelope: JsonRpcResponse = serde_json::from_str(raw).unwrap();
        let error = envelope.error.unwrap();
        assert_eq!(error.code, -32603);
        assert_eq!(error.message, "boom");
    }

    #[test]
    fn test_truncate_body_multibyte() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.len() <= 204);
        assert!(truncated.ends_with("..."));
    }
}
