//! Uniform response envelope.

use interview::{GatewayError, TaskOutput};
use serde::Serialize;

/// HTTP-style status of an envelope.
pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Body of an envelope: the result fields plus `source`, or `{ "error" }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EnvelopeBody {
    Success(TaskOutput),
    Failure { error: String },
}

/// What the gateway returns for every request.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: u16,
    pub body: EnvelopeBody,
}

impl Envelope {
    pub fn success(output: TaskOutput) -> Self {
        Self {
            status: STATUS_OK,
            body: EnvelopeBody::Success(output),
        }
    }

    /// Client errors map to 400, everything else to 500.
    pub fn failure(error: &GatewayError) -> Self {
        let status = if error.is_client_error() {
            STATUS_BAD_REQUEST
        } else {
            STATUS_INTERNAL_ERROR
        };
        Self {
            status,
            body: EnvelopeBody::Failure {
                error: error.to_string(),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.body, EnvelopeBody::Success(_))
    }

    /// The successful output, if any.
    pub fn output(&self) -> Option<&TaskOutput> {
        match &self.body {
            EnvelopeBody::Success(output) => Some(output),
            EnvelopeBody::Failure { .. } => None,
        }
    }
}
