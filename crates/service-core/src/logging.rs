//! Logging Bootstrap

use crate::ConfigurationError;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Parse a log verbosity name.
///
/// Accepts tracing names as well as the level names used by most
/// managed-function runtimes (`WARNING`, `CRITICAL`).
pub fn parse_log_level(value: &str) -> Result<Level, ConfigurationError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "TRACE" => Ok(Level::TRACE),
        "DEBUG" => Ok(Level::DEBUG),
        "INFO" => Ok(Level::INFO),
        "WARN" | "WARNING" => Ok(Level::WARN),
        "ERROR" | "CRITICAL" | "FATAL" => Ok(Level::ERROR),
        other => Err(ConfigurationError::Invalid {
            key: "LOG_LEVEL",
            reason: format!("unknown level {:?}", other),
        }),
    }
}

/// Initialize logging
///
/// `format` selects JSON lines when set to `json`, human-readable text otherwise.
pub fn init_logging(level: &str, format: &str) -> Result<(), ConfigurationError> {
    let level = parse_log_level(level)?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    let installed = if format.trim().eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    installed.map_err(|e| ConfigurationError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_standard_levels() {
        assert_eq!(parse_log_level("info").unwrap(), Level::INFO);
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" trace ").unwrap(), Level::TRACE);
    }

    #[test]
    fn test_parse_runtime_style_levels() {
        assert_eq!(parse_log_level("WARNING").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("CRITICAL").unwrap(), Level::ERROR);
    }

    #[test]
    fn test_unknown_level_rejected() {
        let err = parse_log_level("LOUD").unwrap_err();
        assert!(matches!(err, ConfigurationError::Invalid { key: "LOG_LEVEL", .. }));
    }
}
