//! Normalization Error Types

use thiserror::Error;

/// The request carries no usable instance data
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Provide \"instances\" (or \"input\"/\"inputs\") in the request body.")]
    MissingInstances,
}

/// Errors while coercing a request body into a numeric matrix
#[derive(Debug, Error)]
pub enum CoercionError {
    /// Content type is neither JSON nor CSV
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// JSON content type with an undecodable body
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A value that cannot be read as a float
    #[error("could not convert {0} to float")]
    NonNumeric(String),

    /// Ragged rows or nesting deeper than two levels
    #[error("Invalid input shape: {0}")]
    Shape(String),
}
