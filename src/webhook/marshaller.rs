//! Payload serialization.

use super::HttpError;

/// Turns a payload into a request body.
pub trait PayloadMarshaller: Send + Sync {
    /// Media type announced in the `Content-Type` header.
    fn content_type(&self) -> &str;

    /// Serializes the payload.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Payload`] if the payload cannot be serialized.
    fn marshal(&self, payload: &serde_json::Value) -> Result<Vec<u8>, HttpError>;
}

/// Default marshaller: JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMarshaller;

impl JsonMarshaller {
    /// Media type of JSON bodies.
    pub const CONTENT_TYPE: &'static str = "application/json";
}

impl PayloadMarshaller for JsonMarshaller {
    fn content_type(&self) -> &str {
        Self::CONTENT_TYPE
    }

    fn marshal(&self, payload: &serde_json::Value) -> Result<Vec<u8>, HttpError> {
        serde_json::to_vec(payload).map_err(HttpError::Payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_content_type() {
        assert_eq!(JsonMarshaller.content_type(), "application/json");
    }

    #[test]
    fn json_marshals_compactly() {
        let body = JsonMarshaller.marshal(&json!({"id": "abc"})).unwrap();
        assert_eq!(body, br#"{"id":"abc"}"#);
    }
}
