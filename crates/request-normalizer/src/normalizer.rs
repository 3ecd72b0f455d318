//! Instance Extraction
//!
//! Accepts gateway-proxy envelopes (`{"body": ...}`), bare payload mappings
//! and bare lists, and returns the instance value without validating it.

use crate::body::RequestBody;
use crate::error::InputError;
use serde_json::{Map, Value};
use tracing::debug;

/// Payload keys holding instance data, highest priority first
pub const INSTANCE_KEYS: [&str; 3] = ["instances", "inputs", "input"];

/// First present instance key of a mapping, in [`INSTANCE_KEYS`] order
pub fn select_instances(map: &Map<String, Value>) -> Option<&Value> {
    INSTANCE_KEYS.iter().find_map(|key| map.get(*key))
}

/// Extract the instance data from an inbound event
pub fn extract_instances(event: Value) -> Result<Value, InputError> {
    let body = match event {
        Value::Object(mut map) => match map.remove("body") {
            Some(body) => body,
            None => Value::Object(map),
        },
        other => other,
    };

    let body = RequestBody::parse(body);
    debug!("Request body classified as {}", body.kind());

    match body {
        RequestBody::Opaque(raw) => Ok(Value::String(raw)),
        RequestBody::Mapping(mut map) => INSTANCE_KEYS
            .iter()
            .find_map(|key| map.remove(*key))
            .ok_or(InputError::MissingInstances),
        RequestBody::Sequence(items) => Ok(Value::Array(items)),
        RequestBody::Scalar(_) => Err(InputError::MissingInstances),
    }
}
