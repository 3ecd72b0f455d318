//! Model Server
//!
//! Self-hosted inference handler for the hosting container: discovers the
//! model artifact, coerces request bodies into numeric input, predicts and
//! encodes `{"predictions": [...]}` responses.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use request_normalizer::{coerce_input, CoercionError};
use serde_json::json;
use service_core::{Settings, JSON_CONTENT_TYPE};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

mod artifact;
mod engine;

pub use artifact::{find_model_artifact, CANDIDATE_NAMES, MODEL_EXTENSION};
pub use engine::{encode_predictions, group_rows, Model, OnnxModel};

/// Errors during model discovery, loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("No model file found in {0}")]
    ModelNotFound(String),
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid output shape for {rows} rows: {shape}")]
    InvalidOutputShape { rows: usize, shape: String },
}

/// Application state shared across handlers
pub struct AppState {
    /// The loaded model
    pub model: Arc<dyn Model>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping_handler))
        .route("/invocations", post(invocations_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn ping_handler(State(state): State<Arc<AppState>>) -> StatusCode {
    debug!("Ping for model {}", state.model.name());
    StatusCode::OK
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn coercion_status(err: &CoercionError) -> StatusCode {
    match err {
        CoercionError::UnsupportedContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    }
}

async fn invocations_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(JSON_CONTENT_TYPE);

    let input = match coerce_input(&body, content_type) {
        Ok(input) => input,
        Err(e) => {
            warn!("Rejected {} request: {}", content_type, e);
            return error_response(coercion_status(&e), &e.to_string());
        }
    };

    let model = Arc::clone(&state.model);
    let rows = input.nrows();
    let predictions = match tokio::task::spawn_blocking(move || model.predict(&input)).await {
        Ok(Ok(predictions)) => predictions,
        Ok(Err(e)) => {
            error!("Prediction failed: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
        Err(e) => {
            error!("Prediction task aborted: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
        }
    };

    debug!("Predicted {} rows", rows);
    let (body, content_type) = encode_predictions(predictions);
    (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Run the server
pub async fn run_server(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let artifact = find_model_artifact(Path::new(&settings.model_dir))?;
    let model = OnnxModel::load(&artifact)?;

    let state = Arc::new(AppState {
        model: Arc::new(model),
    });
    let app = create_router(state);

    info!("Starting model server on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
