//! Hosting-container routes with an in-process stand-in model

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use model_server::{create_router, AppState, InferenceError, Model};
use ndarray::Array2;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Iris-like rule: petal length above 2.5 is class 1, otherwise class 0
struct PetalRule;

impl Model for PetalRule {
    fn predict(&self, input: &Array2<f64>) -> Result<Vec<Value>, InferenceError> {
        if input.ncols() != 4 {
            return Err(InferenceError::InferenceFailed(format!(
                "expected 4 features, got {}",
                input.ncols()
            )));
        }
        Ok(input
            .rows()
            .into_iter()
            .map(|row| json!(if row[2] > 2.5 { 1 } else { 0 }))
            .collect())
    }

    fn name(&self) -> &str {
        "petal-rule"
    }
}

async fn send(method: &str, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();

    let app = create_router(Arc::new(AppState {
        model: Arc::new(PetalRule),
    }));
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_ping() {
    let (status, _) = send("GET", "/ping", None, "").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_json_instances() {
    let body = r#"{"instances": [[5.1, 3.5, 1.4, 0.2], [6.2, 3.4, 5.4, 2.3]]}"#;
    let (status, body) = send("POST", "/invocations", Some("application/json"), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predictions": [0, 1]}));
}

#[tokio::test]
async fn test_csv_rows() {
    let body = "5.1,3.5,1.4,0.2\n6.2,3.4,5.4,2.3\n";
    let (status, body) = send("POST", "/invocations", Some("text/csv"), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predictions": [0, 1]}));
}

#[tokio::test]
async fn test_missing_content_type_defaults_to_json() {
    let (status, body) = send("POST", "/invocations", None, "[[5.1, 3.5, 1.4, 0.2]]").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"predictions": [0]}));
}

#[tokio::test]
async fn test_unsupported_content_type() {
    let (status, body) = send("POST", "/invocations", Some("text/xml"), "<row/>").await;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "Unsupported content type: text/xml");
}

#[tokio::test]
async fn test_non_numeric_input() {
    let (status, body) = send("POST", "/invocations", Some("text/csv"), "a,b,c,d\n").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("could not convert"));
}

#[tokio::test]
async fn test_model_failure_is_500() {
    let (status, body) = send("POST", "/invocations", Some("text/csv"), "1,2\n").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().starts_with("Inference failed"));
}
