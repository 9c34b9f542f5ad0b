//! Core domain for the interview gateway.
//!
//! This crate contains every value type, error type, and port trait the
//! gateway is built from, plus the pure logic that turns provider text into
//! typed results and supplies static fallbacks. Infrastructure crates
//! implement the traits defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Per-request correlation identifier |
//! | [`types`] | Profiles, actions, scores, results, provenance, the wire request |
//! | [`errors`] | Stage failures and caller-visible gateway errors |
//! | [`ports`] | The [`LlmProvider`] trait and its request type |
//! | [`prompts`] | Prompt templates keyed by action |
//! | [`normalize`] | Provider text → typed result conversion |
//! | [`fallback`] | Deterministic content used when no provider succeeds |

pub mod errors;
pub mod fallback;
pub mod identifiers;
pub mod normalize;
pub mod ports;
pub mod prompts;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{GatewayError, NormalizationFailure, ProviderFailure, StageFailure};
pub use identifiers::RequestId;
pub use ports::{GenerationParams, ImageReference, LlmProvider, ProviderRequest};
pub use prompts::{build_prompt, generation_params, PromptTask};
pub use types::{
    Action, EvaluationResult, GatewayRequest, InterviewProfile, InterviewScore, OutfitEvaluation,
    OutfitScore, ProviderKind, QuestionSet, Source, Sourced, TaskOutput,
};
