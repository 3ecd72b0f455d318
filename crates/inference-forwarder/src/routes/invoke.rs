//! Invocation Routes

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::{AppState, HttpResponse};

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
}

/// Message returned when the raw body cannot become the event's `body` text
pub const INVALID_UTF8_MESSAGE: &str = "Request body is not valid UTF-8";

fn wrap_raw_body(body: &[u8]) -> Result<Value, HttpResponse> {
    match std::str::from_utf8(body) {
        Ok(text) => Ok(json!({ "body": text })),
        Err(e) => {
            warn!("Rejected request body: {}", e);
            Err(HttpResponse::failure(INVALID_UTF8_MESSAGE))
        }
    }
}

/// Proxy-style invocation: the raw request body becomes the event's `body`
pub async fn proxy_invoke(State(state): State<Arc<AppState>>, body: Bytes) -> HttpResponse {
    match wrap_raw_body(&body) {
        Ok(event) => state.forwarder.handle_event(event).await,
        Err(response) => response,
    }
}

/// Direct invocation: the request body is the event, the response object is returned as JSON
pub async fn direct_invoke(State(state): State<Arc<AppState>>, body: Bytes) -> Json<HttpResponse> {
    let event = match serde_json::from_slice::<Value>(&body) {
        Ok(event) => event,
        Err(_) => match wrap_raw_body(&body) {
            Ok(event) => event,
            Err(response) => return Json(response),
        },
    };
    Json(state.forwarder.handle_event(event).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_raw_body_keeps_text() {
        assert_eq!(wrap_raw_body(b"a,b").unwrap(), json!({"body": "a,b"}));
    }

    #[test]
    fn test_wrap_raw_body_rejects_invalid_utf8() {
        let response = wrap_raw_body(&[0x7b, 0xff, 0xfe]).unwrap_err();
        assert_eq!(response.status_code, 500);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["error"], INVALID_UTF8_MESSAGE);
    }
}
