//! Endpoint Metrics Reporter
//!
//! Queries the last day of endpoint metrics at five-minute resolution and
//! prints one summary per metric.

use crate::client::MonitoringClient;
use crate::query::{Datapoint, MetricQuery, Statistic};
use crate::MonitorError;
use chrono::{DateTime, Duration, Utc};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// Metrics reported for every endpoint, in report order
pub const ENDPOINT_METRICS: [&str; 5] = [
    "Invocations",
    "ModelLatency",
    "OverheadLatency",
    "Invocation4xxErrors",
    "Invocation5xxErrors",
];

/// Namespace of the endpoint metrics
pub const NAMESPACE: &str = "AWS/SageMaker";

/// Length of the reporting window
pub const WINDOW_HOURS: i64 = 24;

/// Bucket size of each statistic
pub const PERIOD_SECONDS: u32 = 300;

/// Summary of one metric over the window
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    pub metric: String,
    pub statistic: Statistic,
    /// Number of data points returned
    pub points: usize,
    /// Data point with the greatest timestamp
    pub latest: Option<Datapoint>,
}

impl MetricReport {
    fn from_points(metric: &str, statistic: Statistic, points: &[Datapoint]) -> Self {
        Self {
            metric: metric.to_string(),
            statistic,
            points: points.len(),
            latest: points.iter().max_by_key(|p| p.timestamp).cloned(),
        }
    }
}

impl fmt::Display for MetricReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - points: {}",
            self.metric,
            self.statistic.as_str(),
            self.points
        )?;
        if let Some(latest) = &self.latest {
            write!(f, "\n  Latest: {} {}", latest.timestamp.to_rfc3339(), latest.value)?;
        }
        Ok(())
    }
}

/// Reports the standard metrics of one endpoint
pub struct Reporter {
    client: Arc<dyn MonitoringClient>,
    endpoint_name: String,
}

impl Reporter {
    pub fn new(client: Arc<dyn MonitoringClient>, endpoint_name: impl Into<String>) -> Self {
        Self {
            client,
            endpoint_name: endpoint_name.into(),
        }
    }

    pub fn endpoint_name(&self) -> &str {
        &self.endpoint_name
    }

    /// Query for `metric` over the window ending at `end`
    pub fn query(&self, metric: &str, statistic: Statistic, end: DateTime<Utc>) -> MetricQuery {
        MetricQuery {
            namespace: NAMESPACE.to_string(),
            metric_name: metric.to_string(),
            dimensions: vec![("EndpointName".to_string(), self.endpoint_name.clone())],
            statistic,
            start: end - Duration::hours(WINDOW_HOURS),
            end,
            period_seconds: PERIOD_SECONDS,
        }
    }

    /// Fetch and summarize one metric
    pub async fn fetch(
        &self,
        metric: &str,
        statistic: Statistic,
        end: DateTime<Utc>,
    ) -> Result<MetricReport, MonitorError> {
        let query = self.query(metric, statistic, end);
        let points = self
            .client
            .get_metric_statistics(&query)
            .await
            .map_err(|source| MonitorError::Query {
                metric: metric.to_string(),
                source,
            })?;

        debug!("{} returned {} points", metric, points.len());
        Ok(MetricReport::from_points(metric, statistic, &points))
    }

    /// Report every endpoint metric in order, writing each summary as it
    /// completes. The first failed query ends the run.
    pub async fn run<W: Write>(
        &self,
        end: DateTime<Utc>,
        out: &mut W,
    ) -> Result<Vec<MetricReport>, MonitorError> {
        info!(
            "Reporting {} metrics for endpoint {}",
            ENDPOINT_METRICS.len(),
            self.endpoint_name
        );

        let mut reports = Vec::with_capacity(ENDPOINT_METRICS.len());
        for metric in ENDPOINT_METRICS {
            let report = self.fetch(metric, Statistic::Average, end).await?;
            writeln!(out, "{}", report)?;
            reports.push(report);
        }
        Ok(reports)
    }
}
