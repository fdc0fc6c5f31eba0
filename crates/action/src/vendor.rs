//! Explicit decoding of vendor response shapes.

use serde_json::{Map, Value};

use crate::error::ActionError;

/// A vendor body, decoded once at the normalisation boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum VendorResponse {
    /// Enveloped object (or any non-list, non-error body).
    Success(Value),
    /// Error-shaped body returned with a success status.
    VendorError {
        /// Vendor error code, kept as the vendor sent it.
        code: Option<Value>,
        /// Human-readable message.
        message: String,
        /// Envelope fields to surface on failure.
        fields: Map<String, Value>,
    },
    /// The body itself is the item list.
    BareList(Vec<Value>),
}

/// Vendor-specific error detector: inspects an object body and returns
/// the error variant when it is error-shaped.
pub type ErrorDetector = fn(&Map<String, Value>) -> Option<VendorResponse>;

impl VendorResponse {
    /// Decode without vendor error detection.
    pub fn decode(body: Value) -> Self {
        match body {
            Value::Array(items) => Self::BareList(items),
            other => Self::Success(other),
        }
    }

    /// Decode, asking `detect` whether an object body is an error.
    pub fn decode_with(body: Value, detect: ErrorDetector) -> Self {
        if let Value::Object(map) = &body
            && let Some(err) = detect(map)
        {
            return err;
        }
        Self::decode(body)
    }

    /// Item list under `key`: the whole body for a bare list, the named
    /// array for an enveloped object, empty otherwise.
    pub fn items(&self, key: &str) -> Vec<Value> {
        match self {
            Self::BareList(items) => items.clone(),
            Self::Success(body) => body
                .get(key)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            Self::VendorError { .. } => Vec::new(),
        }
    }

    /// Metadata field from an enveloped body.
    pub fn meta(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Success(body) => body.get(key).filter(|v| !v.is_null()),
            _ => None,
        }
    }

    /// Turn a vendor error into `Err`, keep anything else as the raw body.
    pub fn into_result(self) -> Result<Value, ActionError> {
        match self {
            Self::Success(body) => Ok(body),
            Self::BareList(items) => Ok(Value::Array(items)),
            Self::VendorError {
                message, fields, ..
            } => Err(ActionError::vendor(message, fields)),
        }
    }

    /// Returns `true` for the error variant.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::VendorError { .. })
    }

    /// Fail on the error variant, pass anything else through.
    pub fn check(self) -> Result<Self, ActionError> {
        match self {
            Self::VendorError {
                message, fields, ..
            } => Err(ActionError::vendor(message, fields)),
            other => Ok(other),
        }
    }
}
