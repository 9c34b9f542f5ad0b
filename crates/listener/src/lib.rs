//! Browser-facing HTTP endpoint for the interview gateway.
//!
//! Exposes [`gateway::Gateway::handle`] over HTTP:
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `POST` | `/` | Run one gateway request |
//! | `POST` | `/gemini-interview` | Same, under the path the web client calls |
//! | `GET` | `/health` | Liveness plus the configured provider list |
//! | `OPTIONS` | any | CORS pre-flight |
//!
//! ## Architectural Layer
//!
//! **Transport.** Request decoding, status mapping, CORS, and body limits
//! live here. The [`gateway`] crate never sees HTTP types.

use std::net::SocketAddr;

use thiserror::Error;

pub mod routes;
pub mod server;

pub use routes::{router, MAX_BODY_BYTES};
pub use server::{bind, serve};

/// Errors raised while running the HTTP endpoint.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP server failed: {0}")]
    Serve(#[source] std::io::Error),
}
