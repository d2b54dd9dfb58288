//! # quarry-llm
//!
//! Reasoning-service client speaking the Ollama generate protocol.
//!
//! [`OllamaClient`] implements [`ReasoningService`](quarry_core::ReasoningService):
//! classification verdicts, read-only query proposals, and context-bound
//! answers. Deadlines are applied by the caller; the client only bounds
//! connection setup.

mod client;
mod error;
mod http;
pub mod prompts;

pub use client::OllamaClient;
pub use error::LlmError;
