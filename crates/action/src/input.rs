//! Typed access to the raw input mapping.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ActionError;

/// Input keys that carry the caller's retry counter.
const RETRY_ATTEMPT_KEYS: [&str; 2] = ["_retry_attempt", "retry_attempt"];

/// A mapping from string keys to JSON values.
///
/// `null` is treated the same as an absent key everywhere, so optional
/// inputs explicitly set to `null` are never forwarded to a vendor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionInput {
    fields: Map<String, Value>,
}

impl ActionInput {
    /// Wrap an already-parsed object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Accept any JSON value; `null` is an empty mapping, anything other
    /// than an object is a validation error.
    pub fn from_value(value: Value) -> Result<Self, ActionError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            Value::Null => Ok(Self::default()),
            other => Err(ActionError::validation(format!(
                "inputs must be an object, got {}",
                type_name(&other)
            ))),
        }
    }

    /// The underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Raw value, `None` when absent or `null`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key).filter(|v| !v.is_null())
    }

    /// Returns `true` if the key is present and not `null`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Value that is present and not empty (`""`, `[]`, `{}` count as absent).
    pub fn non_empty(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| match v {
            Value::String(s) => !s.is_empty(),
            Value::Array(a) => !a.is_empty(),
            Value::Object(o) => !o.is_empty(),
            _ => true,
        })
    }

    /// Required value of any type.
    pub fn require(&self, key: &str) -> Result<&Value, ActionError> {
        self.get(key).ok_or_else(|| ActionError::required(key))
    }

    /// Required non-blank string.
    pub fn require_str(&self, key: &str) -> Result<&str, ActionError> {
        match self.get(key) {
            None => Err(ActionError::required(key)),
            Some(Value::String(s)) if s.trim().is_empty() => Err(ActionError::required(key)),
            Some(Value::String(s)) => Ok(s),
            Some(_) => Err(ActionError::validation(format!("{key} must be a string"))),
        }
    }

    /// Optional non-blank string; blank strings count as absent.
    pub fn opt_str(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// Optional string with a default.
    pub fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.opt_str(key).unwrap_or(default)
    }

    /// Optional integer. Floats with no fractional part are accepted.
    pub fn opt_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(as_integer)
    }

    /// Required integer.
    pub fn require_i64(&self, key: &str) -> Result<i64, ActionError> {
        let value = self.require(key)?;
        as_integer(value)
            .ok_or_else(|| ActionError::validation(format!("{key} must be an integer")))
    }

    /// Optional non-negative integer.
    pub fn opt_u64(&self, key: &str) -> Option<u64> {
        self.opt_i64(key).and_then(|v| u64::try_from(v).ok())
    }

    /// Optional integer with a default.
    pub fn i64_or(&self, key: &str, default: i64) -> i64 {
        self.opt_i64(key).unwrap_or(default)
    }

    /// Optional number.
    pub fn opt_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Optional boolean.
    pub fn opt_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Optional boolean with a default.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.opt_bool(key).unwrap_or(default)
    }

    /// Optional array.
    pub fn opt_array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Required non-empty array.
    pub fn require_array(&self, key: &str) -> Result<&Vec<Value>, ActionError> {
        match self.get(key) {
            None => Err(ActionError::required(key)),
            Some(Value::Array(items)) if items.is_empty() => Err(ActionError::required(key)),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(ActionError::validation(format!("{key} must be an array"))),
        }
    }

    /// Optional array of strings; non-string items are skipped.
    pub fn opt_str_list(&self, key: &str) -> Option<Vec<String>> {
        self.opt_array(key).map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
    }

    /// Optional object.
    pub fn opt_object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    /// Deserialize one field into a typed value.
    pub fn parse<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ActionError> {
        self.get(key)
            .map(|v| {
                serde_json::from_value(v.clone())
                    .map_err(|e| ActionError::validation(format!("{key} is malformed: {e}")))
            })
            .transpose()
    }

    /// Caller-supplied retry counter (`_retry_attempt`), zero when absent.
    pub fn retry_attempt(&self) -> u32 {
        RETRY_ATTEMPT_KEYS
            .iter()
            .find_map(|k| self.opt_u64(k))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0)
    }
}

impl From<Map<String, Value>> for ActionInput {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// Integer view of a JSON value; rejects fractional floats and non-numbers.
pub fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
