//! Inference Forwarder
//!
//! Normalizes an inbound event, forwards the instances to the prediction
//! endpoint and maps every outcome onto exactly one [`HttpResponse`].

use crate::client::{EndpointRequest, PredictionClient};
use crate::ForwardError;
use request_normalizer::extract_instances;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use service_core::JSON_CONTENT_TYPE;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span, Instrument};
use uuid::Uuid;

/// Gateway-style response: status, headers and a JSON-encoded body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// JSON response with the given status
    pub fn json(status_code: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// Successful prediction payload
    pub fn ok(payload: &Value) -> Self {
        Self::json(200, payload)
    }

    /// Failure descriptor `{"error": message}`
    pub fn failure(message: &str) -> Self {
        Self::json(500, &json!({ "error": message }))
    }
}

/// Forwards normalized instances to a named prediction endpoint
pub struct Forwarder {
    client: Arc<dyn PredictionClient>,
    endpoint_name: String,
}

impl Forwarder {
    /// Create a forwarder for `endpoint_name` using an injected client
    pub fn new(client: Arc<dyn PredictionClient>, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }

    /// Name of the target endpoint
    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Handle an inbound event end to end. Never fails.
    pub async fn handle_event(&self, event: Value) -> HttpResponse {
        let span = info_span!("invocation", id = %Uuid::new_v4(), endpoint = %self.endpoint_name);
        async move {
            let outcome = match extract_instances(event) {
                Ok(instances) => self.forward(instances).await,
                Err(e) => Err(ForwardError::from(e)),
            };
            respond(outcome)
        }
        .instrument(span)
        .await
    }

    /// Forward already-extracted instances. Never fails.
    pub async fn invoke(&self, instances: Value) -> HttpResponse {
        let span = info_span!("invocation", id = %Uuid::new_v4(), endpoint = %self.endpoint_name);
        async move { respond(self.forward(instances).await) }
            .instrument(span)
            .await
    }

    async fn forward(&self, instances: Value) -> Result<Value, ForwardError> {
        let body = serde_json::to_vec(&json!({ "instances": instances }))
            .map_err(ForwardError::Serialization)?;

        let request = EndpointRequest {
            endpoint_name: self.endpoint_name.clone(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            accept: JSON_CONTENT_TYPE.to_string(),
            body,
        };

        let start = Instant::now();
        let result = self.client.invoke_endpoint(request).await;
        let elapsed = start.elapsed();
        metrics::histogram!("forwarder_upstream_latency_seconds").record(elapsed.as_secs_f64());
        debug!("Endpoint call finished in {}ms", elapsed.as_millis());

        let raw = result?;
        serde_json::from_slice(&raw).map_err(ForwardError::Response)
    }
}

fn respond(outcome: Result<Value, ForwardError>) -> HttpResponse {
    match outcome {
        Ok(payload) => {
            metrics::counter!("forwarder_requests_total", "status" => "200").increment(1);
            HttpResponse::ok(&payload)
        }
        Err(e) => {
            error!(error = ?e, "Inference failed: {}", e);
            metrics::counter!("forwarder_requests_total", "status" => "500").increment(1);
            HttpResponse::failure(&e.to_string())
        }
    }
}
