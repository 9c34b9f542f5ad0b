//! Interview gateway orchestration.
//!
//! This crate provides the provider fallback state machine, the three
//! built-in tasks (`generate-questions`, `evaluate-answers`,
//! `evaluate-outfit`), and the [`Gateway`] entry point that turns a
//! [`interview::GatewayRequest`] into an [`Envelope`].
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The orchestrator sequences calls between the
//! business logic in the [`interview`] crate (prompts, normalisation, static
//! fallbacks) and the [`interview::LlmProvider`] trait. It contains no domain
//! rules of its own and performs no I/O beyond awaiting providers.
//!
//! ## Failure handling
//!
//! Provider and normalisation failures are absorbed by the orchestrator and
//! turned into stage transitions. Only request validation errors (and the
//! reserved `AllProvidersUnavailable`) reach [`Gateway::handle`], which
//! converts them into `{ "error": ... }` envelopes.

pub mod entry;
pub mod envelope;
pub mod orchestrator;
pub mod tasks;

pub use entry::{Gateway, GatewaySettings};
pub use envelope::{Envelope, EnvelopeBody};
pub use orchestrator::{FallbackOrchestrator, ProviderChain, Stage, Task, DEFAULT_ATTEMPT_TIMEOUT};
