//! Router and handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderName, Method, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use gateway::{Envelope, EnvelopeBody, Gateway};
use interview::{GatewayError, GatewayRequest};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const ALLOWED_HEADERS: [&str; 4] = ["authorization", "x-client-info", "apikey", "content-type"];

type SharedGateway = Arc<Gateway>;

/// Builds the complete router, layers included.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/", post(invoke))
        .route("/gemini-interview", post(invoke))
        .route("/health", get(health))
        .with_state(Arc::new(gateway))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(map_response(oversized_as_envelope))
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}

fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static))
}

async fn invoke(State(gateway): State<SharedGateway>, body: Bytes) -> Response {
    let envelope = match serde_json::from_slice::<GatewayRequest>(&body) {
        Ok(request) => gateway.handle(request).await,
        Err(e) => {
            tracing::debug!(error = %e, "rejecting undecodable request body");
            Envelope::failure(&GatewayError::InvalidRequest {
                message: format!("malformed JSON body: {e}"),
            })
        }
    };
    envelope_response(envelope)
}

fn envelope_response(envelope: Envelope) -> Response {
    let status = StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope.body)).into_response()
}

/// Rewrites the body-limit rejection into the `{ "error" }` envelope.
async fn oversized_as_envelope(response: Response) -> Response {
    if response.status() != StatusCode::PAYLOAD_TOO_LARGE {
        return response;
    }
    envelope_response(Envelope {
        status: StatusCode::PAYLOAD_TOO_LARGE.as_u16(),
        body: EnvelopeBody::Failure {
            error: format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
        },
    })
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    providers: Vec<&'static str>,
}

async fn health(State(gateway): State<SharedGateway>) -> Json<Health> {
    Json(Health {
        status: "ok",
        providers: gateway
            .configured_providers()
            .into_iter()
            .map(|kind| kind.label())
            .collect(),
    })
}
