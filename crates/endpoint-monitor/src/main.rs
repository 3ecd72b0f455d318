//! Endpoint Monitor - Main Entry Point

use anyhow::Context;
use chrono::Utc;
use endpoint_monitor::{PrometheusClient, Reporter};
use service_core::{init_logging, Settings};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env().context("Failed to load settings")?;
    init_logging(&settings.log_level, &settings.log_format)?;

    info!("=== Endpoint Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let client = PrometheusClient::new(&settings.monitoring_url)
        .context("Failed to create monitoring client")?;
    let reporter = Reporter::new(Arc::new(client), settings.endpoint_name.clone());

    let mut stdout = std::io::stdout();
    reporter
        .run(Utc::now(), &mut stdout)
        .await
        .with_context(|| format!("Metrics report for {} failed", settings.endpoint_name))?;

    Ok(())
}
