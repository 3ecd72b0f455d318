//! Request Normalization and Input Coercion
//!
//! Turns loosely shaped inference request bodies into canonical instance
//! data, and coerces instance data into numeric matrices for models that run
//! in-process.

mod body;
mod coerce;
mod error;
mod normalizer;

pub use body::RequestBody;
pub use coerce::{coerce_input, CSV_CONTENT_TYPE, JSON_CONTENT_TYPE};
pub use error::{CoercionError, InputError};
pub use normalizer::{extract_instances, select_instances, INSTANCE_KEYS};
