//! Input rules shared by several integrations.
//!
//! Every function here is pure: it either returns the normalised value or
//! a validation error, and never touches the network.

use serde_json::Value;

use crate::error::ActionError;
use crate::input::ActionInput;

/// Substrings rejected in identifiers that end up in URL paths.
pub const UNSAFE_ID_FRAGMENTS: [&str; 7] = ["/", "\\", "..", "?", "&", "#", "%"];

/// Validate a latitude/longitude pair read from `lat_key`/`lng_key`.
///
/// `prefix` is prepended to every message (`"start_"`).
pub fn coordinates(
    input: &ActionInput,
    lat_key: &str,
    lng_key: &str,
    prefix: &str,
) -> Result<(f64, f64), ActionError> {
    let (Some(lat), Some(lng)) = (input.get(lat_key), input.get(lng_key)) else {
        return Err(ActionError::validation(format!(
            "{prefix}latitude and longitude are required"
        )));
    };
    let (Some(lat), Some(lng)) = (number(lat), number(lng)) else {
        return Err(ActionError::validation(format!(
            "{prefix}latitude and longitude must be numbers"
        )));
    };
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ActionError::validation(format!(
            "{prefix}latitude must be between -90 and 90"
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ActionError::validation(format!(
            "{prefix}longitude must be between -180 and 180"
        )));
    }
    Ok((lat, lng))
}

/// Validate an identifier that will be embedded in a URL path.
///
/// Returns the trimmed value.
pub fn identifier<'a>(input: &'a ActionInput, field: &str) -> Result<&'a str, ActionError> {
    let value = match input.get(field) {
        None => return Err(ActionError::required(field)),
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim(),
        Some(_) => {
            return Err(ActionError::validation(format!(
                "{field} must be a non-empty string"
            )));
        }
    };
    if UNSAFE_ID_FRAGMENTS.iter().any(|frag| value.contains(frag)) {
        return Err(ActionError::validation(format!(
            "{field} contains invalid characters"
        )));
    }
    Ok(value)
}

/// Clamp `value` into `[min, max]`, using `default` when absent or not an
/// integer.
pub fn clamp_or(value: Option<i64>, default: i64, min: i64, max: i64) -> i64 {
    value.map_or(default, |v| v.clamp(min, max))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
