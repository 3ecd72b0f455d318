//! Endpoint Monitor
//!
//! Queries a monitoring service for a fixed set of endpoint metrics over the
//! trailing day and reports the most recent data point of each.
//! Errors are not contained: the first failing query aborts the run.

mod client;
mod query;
mod reporter;

pub use client::{MonitoringClient, PrometheusClient, QUERY_TIMEOUT};
pub use query::{series_name, snake_case, Datapoint, MetricQuery, Statistic};
pub use reporter::{
    MetricReport, Reporter, ENDPOINT_METRICS, NAMESPACE, PERIOD_SECONDS, WINDOW_HOURS,
};

use service_core::UpstreamError;
use thiserror::Error;

/// Errors that abort a reporting run
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Query for {metric} failed: {source}")]
    Query {
        metric: String,
        source: UpstreamError,
    },
    #[error("Failed to write report: {0}")]
    Output(#[from] std::io::Error),
}
