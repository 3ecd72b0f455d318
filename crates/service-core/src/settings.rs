//! Process Settings
//!
//! Every component is parameterized by environment variables with hardcoded
//! fallbacks. Validation happens once at startup; a failure is fatal.

use crate::ConfigurationError;
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Placeholder endpoint used when `ENDPOINT_NAME` is not set
pub const DEFAULT_ENDPOINT_NAME: &str = "your-sagemaker-endpoint-name";

const DEFAULT_RUNTIME_URL: &str = "https://runtime.sagemaker.us-east-1.amazonaws.com";
const DEFAULT_MONITORING_URL: &str = "http://localhost:9090";

/// Settings shared by the forwarder, model server and endpoint monitor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Name of the deployed prediction endpoint
    pub endpoint_name: String,
    /// Log verbosity (`INFO`, `DEBUG`, `WARNING`, ...)
    pub log_level: String,
    /// `text` or `json`
    pub log_format: String,
    /// Base URL of the prediction runtime
    pub runtime_url: String,
    /// Base URL of the Prometheus-compatible monitoring service
    pub monitoring_url: String,
    /// Listen address for HTTP entrypoints
    pub bind_addr: String,
    /// Directory holding the model artifact (model server only)
    pub model_dir: String,
}

impl Settings {
    /// Load settings from the process environment
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::load(Environment::default())
    }

    /// Load settings from an explicit variable map instead of the process environment
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigurationError> {
        let vars: config::Map<String, String> = vars.into_iter().collect();
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(env: Environment) -> Result<Self, ConfigurationError> {
        let settings: Settings = Config::builder()
            .set_default("endpoint_name", DEFAULT_ENDPOINT_NAME)?
            .set_default("log_level", "INFO")?
            .set_default("log_format", "text")?
            .set_default("runtime_url", DEFAULT_RUNTIME_URL)?
            .set_default("monitoring_url", DEFAULT_MONITORING_URL)?
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("model_dir", "/opt/ml/model")?
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check required identifiers and URL shapes
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.endpoint_name.trim().is_empty() {
            return Err(ConfigurationError::Missing("ENDPOINT_NAME"));
        }
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigurationError::Missing("BIND_ADDR"));
        }
        check_url("RUNTIME_URL", &self.runtime_url)?;
        check_url("MONITORING_URL", &self.monitoring_url)?;
        crate::parse_log_level(&self.log_level)?;
        Ok(())
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigurationError> {
    if value.trim().is_empty() {
        return Err(ConfigurationError::Missing(key));
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        return Err(ConfigurationError::Invalid {
            key,
            reason: format!("{} is not an http(s) URL", value),
        });
    }
    Ok(())
}
