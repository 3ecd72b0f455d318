//! Request Body Classification

use serde_json::{Map, Value};
use tracing::debug;

/// Shape of a request body, decided once after JSON decoding
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A string body that is not valid JSON, kept verbatim
    Opaque(String),
    /// A JSON object
    Mapping(Map<String, Value>),
    /// A JSON array
    Sequence(Vec<Value>),
    /// Any other JSON value (number, bool, null, or a decoded string)
    Scalar(Value),
}

impl RequestBody {
    /// Classify a body value.
    ///
    /// String bodies are decoded exactly once. A string that fails to decode
    /// is not an error: it becomes [`RequestBody::Opaque`] and is left for the
    /// consumer of the instances to reject.
    pub fn parse(body: Value) -> Self {
        let decoded = match body {
            Value::String(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(decoded) => decoded,
                Err(e) => {
                    debug!("Body is not JSON ({}), passing it through verbatim", e);
                    return RequestBody::Opaque(raw);
                }
            },
            other => other,
        };

        match decoded {
            Value::Object(map) => RequestBody::Mapping(map),
            Value::Array(items) => RequestBody::Sequence(items),
            other => RequestBody::Scalar(other),
        }
    }

    /// Short name of the variant, for logs
    pub fn kind(&self) -> &'static str {
        match self {
            RequestBody::Opaque(_) => "opaque",
            RequestBody::Mapping(_) => "mapping",
            RequestBody::Sequence(_) => "sequence",
            RequestBody::Scalar(_) => "scalar",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_body_is_decoded() {
        let body = RequestBody::parse(json!("{\"instances\": [1]}"));
        assert_eq!(body.kind(), "mapping");
    }

    #[test]
    fn test_malformed_string_is_opaque() {
        let body = RequestBody::parse(json!("not json"));
        assert_eq!(body, RequestBody::Opaque("not json".to_string()));
    }

    #[test]
    fn test_string_is_decoded_only_once() {
        // A JSON-encoded string decodes to a plain string, which is a scalar
        let body = RequestBody::parse(json!("\"[1, 2]\""));
        assert_eq!(body, RequestBody::Scalar(json!("[1, 2]")));
    }

    #[test]
    fn test_native_values_classified() {
        assert_eq!(RequestBody::parse(json!([1, 2])).kind(), "sequence");
        assert_eq!(RequestBody::parse(json!({"a": 1})).kind(), "mapping");
        assert_eq!(RequestBody::parse(json!(null)).kind(), "scalar");
        assert_eq!(RequestBody::parse(json!(42)).kind(), "scalar");
    }
}
