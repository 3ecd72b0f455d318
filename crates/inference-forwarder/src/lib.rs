//! Inference Forwarder
//!
//! Accepts loosely shaped inference requests, forwards the normalized instances
//! to a managed prediction endpoint and always answers with a single
//! `{statusCode, headers, body}` response.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use request_normalizer::InputError;
use serde::Serialize;
use service_core::{Settings, UpstreamError};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

mod client;
mod forwarder;
mod routes;

pub use client::{
    EndpointRequest, HttpPredictionClient, PredictionClient, CONNECT_TIMEOUT, MAX_RETRIES,
    READ_TIMEOUT,
};
pub use forwarder::{Forwarder, HttpResponse};
pub use routes::invoke::INVALID_UTF8_MESSAGE;

/// Everything that can go wrong between receiving an event and decoding the prediction
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("Failed to encode request payload: {0}")]
    Serialization(serde_json::Error),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("Failed to decode prediction response: {0}")]
    Response(serde_json::Error),
}

/// Application state shared across handlers
pub struct AppState {
    /// Forwarder bound to the configured endpoint
    pub forwarder: Forwarder,
    /// Prometheus handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(forwarder: Forwarder, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            forwarder,
            metrics,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub endpoint_name: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/invoke", post(routes::invoke::proxy_invoke))
        .route("/events", post(routes::invoke::direct_invoke))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        endpoint_name: state.forwarder.endpoint_name().to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Run the server
pub async fn run_server(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = HttpPredictionClient::new(&settings.runtime_url)?;
    let forwarder = Forwarder::new(Arc::new(client), settings.endpoint_name.clone());
    let metrics = PrometheusBuilder::new().install_recorder()?;

    let state = Arc::new(AppState::new(forwarder, Some(metrics)));
    let app = create_router(state);

    info!(
        "Forwarding to endpoint {} via {}",
        settings.endpoint_name, settings.runtime_url
    );
    info!("Starting forwarder on {}", settings.bind_addr);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
