//! Error taxonomy for the interview gateway.
//!
//! Two families of errors exist:
//!
//! - **Stage failures** ([`ProviderFailure`], [`NormalizationFailure`]) occur
//!   while one provider stage runs. They never reach the caller: the
//!   orchestrator converts each into a transition to the next stage.
//! - **Gateway errors** ([`GatewayError`]) are the only errors a caller can
//!   observe. They are converted into an `{ error }` envelope at the gateway
//!   entry point.

use std::time::Duration;

use thiserror::Error;

use crate::Action;

// ---------------------------------------------------------------------------
// Stage failures
// ---------------------------------------------------------------------------

/// A single live provider could not produce text.
///
/// Every way a provider call can go wrong collapses into this type; the
/// orchestrator does not distinguish between variants when deciding to move
/// on, but logs them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderFailure {
    /// The request could not be sent or the response body could not be read.
    #[error("transport error: {message}")]
    Transport {
        /// Underlying transport error text.
        message: String,
    },

    /// The provider answered with a non-success HTTP status.
    #[error("HTTP {status}: {message}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Provider-reported message if the body carried one, else the raw body.
        message: String,
    },

    /// The response body did not match the provider's documented schema.
    #[error("malformed provider response: {reason}")]
    MalformedEnvelope {
        /// What was missing or unexpected.
        reason: String,
    },

    /// The provider returned a well-formed error object.
    #[error("provider reported error: {message}")]
    Reported {
        /// Message supplied by the provider.
        message: String,
    },

    /// The image attached to the request was refused or could not be used.
    #[error("image rejected: {reason}")]
    ImageRejected {
        /// Why the image was not sent to the provider.
        reason: String,
    },

    /// The attempt did not complete within the configured deadline.
    #[error("no response within {after:?}")]
    Timeout {
        /// The deadline that expired.
        after: Duration,
    },
}

/// Provider text could not be coerced into the expected structured shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("could not normalise provider output into {expected}: {reason}")]
pub struct NormalizationFailure {
    /// Name of the shape that was expected (e.g. `"question list"`).
    pub expected: &'static str,
    /// Why the last extraction strategy failed.
    pub reason: String,
}

impl NormalizationFailure {
    pub fn new(expected: &'static str, reason: impl Into<String>) -> Self {
        Self {
            expected,
            reason: reason.into(),
        }
    }
}

/// Either failure that makes one provider stage unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StageFailure {
    #[error(transparent)]
    Provider(#[from] ProviderFailure),

    #[error(transparent)]
    Normalization(#[from] NormalizationFailure),
}

// ---------------------------------------------------------------------------
// Caller-visible errors
// ---------------------------------------------------------------------------

/// Errors that surface to the caller as an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The requested action is not one the gateway supports.
    ///
    /// Raised before orchestration begins; no provider is invoked.
    #[error("Invalid action specified: {action}")]
    InvalidAction {
        /// The action string as received.
        action: String,
    },

    /// A field required by the action is missing or unusable.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of the problem.
        message: String,
    },

    /// No provider produced a result and the action has no static fallback.
    ///
    /// Unreachable for the three built-in actions, which all define one.
    #[error("No AI provider available for {action}")]
    AllProvidersUnavailable {
        /// The action that could not be served.
        action: Action,
    },
}

impl GatewayError {
    /// Returns `true` if the caller is at fault (HTTP 4xx semantics).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            GatewayError::InvalidAction { .. } | GatewayError::InvalidRequest { .. }
        )
    }
}
