//! Router tests driven through `tower::ServiceExt::oneshot`

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use inference_forwarder::{
    create_router, AppState, EndpointRequest, Forwarder, PredictionClient, INVALID_UTF8_MESSAGE,
};
use serde_json::{json, Value};
use service_core::UpstreamError;
use std::sync::Arc;
use tower::ServiceExt;

/// Predicts class 0 for every instance it receives
struct ZeroClassClient;

#[async_trait]
impl PredictionClient for ZeroClassClient {
    async fn invoke_endpoint(&self, request: EndpointRequest) -> Result<Vec<u8>, UpstreamError> {
        let payload: Value = serde_json::from_slice(&request.body)
            .map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        let count = payload["instances"].as_array().map_or(0, Vec::len);
        Ok(serde_json::to_vec(&json!({ "predictions": vec![0; count] })).unwrap())
    }
}

fn app() -> axum::Router {
    let forwarder = Forwarder::new(Arc::new(ZeroClassClient), "iris-rf");
    create_router(Arc::new(AppState::new(forwarder, None)))
}

async fn send(method: &str, uri: &str, body: &str) -> (StatusCode, String, String) {
    send_bytes(method, uri, body.as_bytes().to_vec()).await
}

async fn send_bytes(method: &str, uri: &str, body: Vec<u8>) -> (StatusCode, String, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_proxy_invoke_success() {
    let (status, content_type, body) =
        send("POST", "/invoke", r#"{"instances": [[5.1, 3.5, 1.4, 0.2], [6.0, 2.2, 5.0, 1.5]]}"#).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type, "application/json");
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"predictions": [0, 0]}));
}

#[tokio::test]
async fn test_proxy_invoke_missing_instances_is_500() {
    let (status, _, body) = send("POST", "/invoke", r#"{"features": [1, 2]}"#).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("instances"));
}

#[tokio::test]
async fn test_proxy_invoke_invalid_utf8_is_500() {
    let (status, _, body) = send_bytes("POST", "/invoke", vec![b'[', 0xff, b']']).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"], INVALID_UTF8_MESSAGE);
}

#[tokio::test]
async fn test_direct_invoke_invalid_utf8_is_contained() {
    let (status, _, body) = send_bytes("POST", "/events", vec![0xc3, 0x28]).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["statusCode"], 500);
    let inner: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(inner["error"], INVALID_UTF8_MESSAGE);
}

#[tokio::test]
async fn test_direct_invoke_returns_response_object() {
    let event = json!({"body": "{\"inputs\": [[1, 2, 3, 4]]}"}).to_string();
    let (status, _, body) = send("POST", "/events", &event).await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["statusCode"], 200);
    assert_eq!(response["headers"]["Content-Type"], "application/json");
    let inner: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert_eq!(inner, json!({"predictions": [0]}));
}

#[tokio::test]
async fn test_direct_invoke_failure_is_contained() {
    let (status, _, body) = send("POST", "/events", "{}").await;

    assert_eq!(status, StatusCode::OK);
    let response: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(response["statusCode"], 500);
    let inner: Value = serde_json::from_str(response["body"].as_str().unwrap()).unwrap();
    assert!(inner["error"].is_string());
}

#[tokio::test]
async fn test_health_reports_endpoint() {
    let (status, _, body) = send("GET", "/health", "").await;

    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(health["endpoint_name"], "iris-rf");
    assert_eq!(health["status"], "healthy");
}

#[tokio::test]
async fn test_metrics_absent_without_recorder() {
    let (status, _, _) = send("GET", "/metrics", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
