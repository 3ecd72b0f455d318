//! Metric Queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistic computed per time bucket.
///
/// Covers every statistic the exporter publishes for a metric so that any
/// [`MetricQuery`] maps to a series; the endpoint report asks for `Average`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
    SampleCount,
}

impl Statistic {
    /// Display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::SampleCount => "SampleCount",
        }
    }

    /// Suffix of the exported series carrying this statistic
    pub fn series_suffix(&self) -> &'static str {
        match self {
            Statistic::Average => "average",
            Statistic::Sum => "sum",
            Statistic::Minimum => "minimum",
            Statistic::Maximum => "maximum",
            Statistic::SampleCount => "sample_count",
        }
    }
}

/// A statistics query over a time range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricQuery {
    /// Metric namespace, e.g. `AWS/SageMaker`
    pub namespace: String,
    /// Metric name, e.g. `ModelLatency`
    pub metric_name: String,
    /// Dimension name/value pairs
    pub dimensions: Vec<(String, String)>,
    pub statistic: Statistic,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Bucket size in seconds
    pub period_seconds: u32,
}

/// One bucket of a statistic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Datapoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// `ModelLatency` -> `model_latency`, `Invocation4xxErrors` -> `invocation4xx_errors`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;
    for c in name.chars() {
        if c.is_ascii_uppercase() && prev.map_or(false, |p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            out.push('_');
        }
        out.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    out
}

/// Exported series name for a query: `aws_sagemaker_model_latency_average`
pub fn series_name(query: &MetricQuery) -> String {
    let namespace: String = query
        .namespace
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!(
        "{}_{}_{}",
        namespace,
        snake_case(&query.metric_name),
        query.statistic.series_suffix()
    )
}
