//! Service Core
//!
//! Environment-driven settings, logging bootstrap and the error types shared
//! by every component that talks to a managed endpoint.

mod error;
mod logging;
mod settings;

pub use error::{ConfigurationError, UpstreamError};
pub use logging::{init_logging, parse_log_level};
pub use settings::Settings;

/// Media type used for every request and response body on the prediction path
pub const JSON_CONTENT_TYPE: &str = "application/json";
