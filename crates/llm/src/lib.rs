//! Interview gateway LLM provider adapters.
//!
//! Implements the [`interview::LlmProvider`] trait for Google Gemini (the
//! primary provider) and OpenAI chat completions (the secondary provider).
//! Both adapters share one [`HttpTransport`] so they share a connection pool
//! and a request deadline.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** All HTTP transport, request formatting, and response
//! envelope validation live here. The orchestration crate sees only
//! [`interview::LlmProvider`] and [`interview::ProviderFailure`].
//!
//! Each provider's response body is deserialised into a tagged envelope
//! (`Failure { error }` or `Success { .. }`) before any text is extracted, so
//! an unexpected shape is reported as
//! [`interview::ProviderFailure::MalformedEnvelope`] rather than silently
//! yielding empty text. Adapters never retry.

pub mod config;
pub mod gemini;
mod http;
pub mod openai;

use thiserror::Error;

pub use config::{GeminiConfig, OpenAiConfig, ProvidersConfig};
pub use gemini::GeminiProvider;
pub use http::HttpTransport;
pub use openai::OpenAiProvider;

/// Errors raised while constructing provider adapters.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The HTTP client could not be built (e.g. TLS backend initialisation).
    #[error("failed to build HTTP client: {message}")]
    ClientBuild { message: String },
}
