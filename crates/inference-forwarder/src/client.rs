//! Prediction Endpoint Client
//!
//! The prediction service is an injected collaborator. The HTTP implementation
//! applies a fixed timeout and retry policy that callers cannot tune.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use service_core::UpstreamError;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Time allowed to establish a connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// Time allowed for a whole request, including reading the response
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Automatic retries after the first attempt
pub const MAX_RETRIES: u32 = 2;
/// Delay before the first retry, doubled for each further retry
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// One call to a named prediction endpoint
#[derive(Debug, Clone)]
pub struct EndpointRequest {
    pub endpoint_name: String,
    pub content_type: String,
    pub accept: String,
    pub body: Vec<u8>,
}

/// Collaborator that runs predictions for a deployed model
#[async_trait]
pub trait PredictionClient: Send + Sync {
    /// Invoke the endpoint and return the raw response body
    async fn invoke_endpoint(&self, request: EndpointRequest) -> Result<Vec<u8>, UpstreamError>;
}

/// Prediction client speaking the runtime's HTTP invocation API
pub struct HttpPredictionClient {
    client: Client,
    runtime_url: String,
}

impl HttpPredictionClient {
    /// Create a client for the runtime at `runtime_url`
    pub fn new(runtime_url: &str) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        info!("Creating prediction client for runtime: {}", runtime_url);
        Ok(Self {
            client,
            runtime_url: runtime_url.trim_end_matches('/').to_string(),
        })
    }

    /// Invocation URL of a named endpoint
    pub fn invocation_url(&self, endpoint_name: &str) -> String {
        format!("{}/endpoints/{}/invocations", self.runtime_url, endpoint_name)
    }

    async fn send_once(&self, url: &str, request: &EndpointRequest) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, request.content_type.as_str())
            .header(ACCEPT, request.accept.as_str())
            .body(request.body.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Throttled(body));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        Ok(body.to_vec())
    }
}

fn transport_error(err: reqwest::Error) -> UpstreamError {
    if err.is_timeout() {
        UpstreamError::Timeout(err.to_string())
    } else {
        UpstreamError::Transport(err.to_string())
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn invoke_endpoint(&self, request: EndpointRequest) -> Result<Vec<u8>, UpstreamError> {
        let url = self.invocation_url(&request.endpoint_name);
        let mut retries = 0;

        loop {
            match self.send_once(&url, &request).await {
                Ok(body) => {
                    debug!("Endpoint {} answered with {} bytes", request.endpoint_name, body.len());
                    return Ok(body);
                }
                Err(e) if e.is_retryable() && retries < MAX_RETRIES => {
                    let delay = RETRY_BASE_DELAY * 2u32.pow(retries);
                    retries += 1;
                    warn!("Invocation of {} failed ({}), retry {} in {:?}", url, e, retries, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_url() {
        let client = HttpPredictionClient::new("https://runtime.example.com/").unwrap();
        assert_eq!(
            client.invocation_url("iris-rf-1234abcd"),
            "https://runtime.example.com/endpoints/iris-rf-1234abcd/invocations"
        );
    }

    #[test]
    fn test_fixed_policy() {
        assert!(CONNECT_TIMEOUT < READ_TIMEOUT);
        assert_eq!(MAX_RETRIES, 2);
    }
}
