//! Monitoring Service Client

use crate::query::{series_name, snake_case, Datapoint, MetricQuery};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use service_core::UpstreamError;
use std::time::Duration;
use tracing::{debug, info};

/// Time allowed for a single statistics query
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(30);

/// Collaborator serving time-bucketed statistics
#[async_trait]
pub trait MonitoringClient: Send + Sync {
    /// Data points for the query, in any order
    async fn get_metric_statistics(&self, query: &MetricQuery) -> Result<Vec<Datapoint>, UpstreamError>;
}

/// Client for a Prometheus-compatible range query API
pub struct PrometheusClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct RangeResponse {
    status: String,
    #[serde(default)]
    data: Option<RangeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RangeData {
    #[serde(rename = "resultType")]
    result_type: String,
    result: Vec<RangeSeries>,
}

#[derive(Debug, Deserialize)]
struct RangeSeries {
    #[serde(default)]
    values: Vec<(f64, String)>,
}

impl PrometheusClient {
    /// Create a client for the service at `base_url`
    pub fn new(base_url: &str) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(QUERY_TIMEOUT)
            .build()
            .map_err(|e| UpstreamError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        info!("Creating monitoring client for {}", base_url);
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// PromQL selector for a query
    pub fn promql(query: &MetricQuery) -> String {
        let labels: Vec<String> = query
            .dimensions
            .iter()
            .map(|(name, value)| {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                format!("{}=\"{}\"", snake_case(name), escaped)
            })
            .collect();
        format!("{}{{{}}}", series_name(query), labels.join(","))
    }
}

fn to_datapoint((seconds, value): (f64, String)) -> Result<Datapoint, UpstreamError> {
    let timestamp: DateTime<Utc> = DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
        .ok_or_else(|| UpstreamError::Malformed(format!("timestamp out of range: {}", seconds)))?;
    let value = value
        .parse::<f64>()
        .map_err(|_| UpstreamError::Malformed(format!("non-numeric sample value {:?}", value)))?;
    Ok(Datapoint { timestamp, value })
}

#[async_trait]
impl MonitoringClient for PrometheusClient {
    async fn get_metric_statistics(&self, query: &MetricQuery) -> Result<Vec<Datapoint>, UpstreamError> {
        let promql = Self::promql(query);
        debug!("Range query {} over {} - {}", promql, query.start, query.end);

        let response = self
            .client
            .get(format!("{}/api/v1/query_range", self.base_url))
            .query(&[
                ("query", promql),
                ("start", query.start.timestamp().to_string()),
                ("end", query.end.timestamp().to_string()),
                ("step", format!("{}s", query.period_seconds)),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    UpstreamError::Timeout(e.to_string())
                } else {
                    UpstreamError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: RangeResponse =
            serde_json::from_str(&text).map_err(|e| UpstreamError::Malformed(e.to_string()))?;
        if parsed.status != "success" {
            return Err(UpstreamError::Malformed(
                parsed.error.unwrap_or_else(|| format!("query status {}", parsed.status)),
            ));
        }

        let data = parsed
            .data
            .ok_or_else(|| UpstreamError::Malformed("response has no data".to_string()))?;
        if data.result_type != "matrix" {
            return Err(UpstreamError::Malformed(format!(
                "expected matrix result, got {}",
                data.result_type
            )));
        }

        data.result
            .into_iter()
            .flat_map(|series| series.values)
            .map(to_datapoint)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Statistic;

    #[test]
    fn test_promql_selector() {
        let end = Utc::now();
        let query = MetricQuery {
            namespace: "AWS/SageMaker".to_string(),
            metric_name: "Invocation5xxErrors".to_string(),
            dimensions: vec![("EndpointName".to_string(), "iris-\"rf\"".to_string())],
            statistic: Statistic::Average,
            start: end - chrono::Duration::hours(24),
            end,
            period_seconds: 300,
        };

        assert_eq!(
            PrometheusClient::promql(&query),
            r#"aws_sagemaker_invocation5xx_errors_average{endpoint_name="iris-\"rf\""}"#
        );
    }

    #[test]
    fn test_sample_conversion() {
        let point = to_datapoint((1_700_000_000.0, "12.5".to_string())).unwrap();
        assert_eq!(point.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(point.value, 12.5);

        assert!(matches!(
            to_datapoint((1_700_000_000.0, "high".to_string())),
            Err(UpstreamError::Malformed(_))
        ));
    }
}
