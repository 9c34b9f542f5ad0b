//! Router tests driven through `tower::ServiceExt::oneshot`.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use gateway::{Gateway, GatewaySettings, ProviderChain};
use listener::{router, MAX_BODY_BYTES};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(Gateway::new(ProviderChain::default(), GatewaySettings::default()))
}

fn post_json(path: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::ORIGIN, "https://interview.example")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn questions_body() -> String {
    json!({
        "action": "generate-questions",
        "profile": {
            "name": "Alex",
            "jobRole": "data_scientist",
            "experienceLevel": "entry_level",
            "interviewType": "Technical"
        }
    })
    .to_string()
}

#[tokio::test]
async fn root_path_serves_gateway_requests() {
    let response = app().oneshot(post_json("/", questions_body())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
    let body = json_body(response).await;
    assert_eq!(body["source"], "Fallback System");
    assert_eq!(body["questions"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn named_path_is_an_alias() {
    let response = app()
        .oneshot(post_json("/gemini-interview", questions_body()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["source"], "Fallback System");
}

#[tokio::test]
async fn unknown_action_is_bad_request() {
    let body = json!({"action": "summarize", "profile": null}).to_string();
    let response = app().oneshot(post_json("/", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Invalid action specified: summarize"})
    );
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let response = app().oneshot(post_json("/", "{not json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("malformed JSON body"));
}

#[tokio::test]
async fn preflight_allows_client_headers() {
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/gemini-interview")
        .header(header::ORIGIN, "https://interview.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(
            header::ACCESS_CONTROL_REQUEST_HEADERS,
            "authorization, x-client-info, apikey, content-type",
        )
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert!(response.status().is_success());
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let allowed = headers[header::ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap();
    for name in ["authorization", "x-client-info", "apikey", "content-type"] {
        assert!(allowed.contains(name), "{name} missing from {allowed}");
    }
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn health_lists_configured_providers() {
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "providers": []})
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let body = vec![b' '; MAX_BODY_BYTES + 1];
    let mut request = post_json("/", body);
    request
        .headers_mut()
        .insert(header::CONTENT_LENGTH, (MAX_BODY_BYTES + 1).into());

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("exceeds"), "{body}");
}

#[tokio::test]
async fn oversized_body_without_length_header_is_an_envelope() {
    let body = format!(r#"{{"action": "generate-questions", "pad": "{}"}}"#, "x".repeat(MAX_BODY_BYTES));
    let response = app().oneshot(post_json("/", body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn get_on_gateway_path_is_not_allowed() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
