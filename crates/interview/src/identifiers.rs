//! Newtype identifiers.
//!
//! The gateway itself is stateless, so the only identity it hands out is a
//! per-invocation [`RequestId`]. It is attached to the tracing span of every
//! gateway call so all provider attempts made on behalf of one request can be
//! correlated in logs and traces.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies a single gateway invocation.
///
/// Generated fresh for every call to the gateway entry point; never returned
/// to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Generates a new random request identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a [`RequestId`] from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
