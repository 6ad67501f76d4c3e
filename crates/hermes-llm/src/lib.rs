//! Hermes LLM - LLM Provider Abstraction
//!
//! This crate provides the LLM integration used by the Hermes query router:
//! - Provider: trait definition shared by all providers
//! - Gemini: Google Gemini provider
//! - OpenAI: OpenAI-compatible chat completions provider
//!
//! Routing needs exactly one completion round trip per query, so the trait
//! surface is minimal by design.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod gemini;
pub mod openai;
pub mod provider;
pub mod util;

pub use error::{Error, Result};
pub use provider::{
    CompletionRequest, CompletionResponse, LlmProvider, Message, MessageRole, TokenUsage,
};

// Re-export provider types
pub use gemini::{GeminiConfig, GeminiProvider};
pub use openai::{OpenAiConfig, OpenAiProvider};
