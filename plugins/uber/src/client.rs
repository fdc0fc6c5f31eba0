use nebula_action::RequestMethod;
use nebula_action::input::as_integer;
use nebula_action::prelude::*;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// Riders API version.
pub(crate) const RIDERS_VERSION: &str = "v1.2";

/// Partner loyalty endpoints stay on v1.
pub(crate) const LOYALTY_VERSION: &str = "v1";

const MAX_HISTORY_LIMIT: i64 = 50;

pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    version: &str,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.bearer_token()?;
    let url = format!("{}/{version}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url)
        .bearer_auth(token)
        .header("Accept", "application/json")
        .header("Accept-Language", "en_US"))
}

pub(crate) async fn get(ctx: &ExecutionContext, path: &str) -> Result<Value, ActionError> {
    ctx.fetch(request(ctx, RequestMethod::Get, RIDERS_VERSION, path)?).await
}

/// Pickup/dropoff pair as `start_*`/`end_*` fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Trip {
    pub start: (f64, f64),
    pub end: (f64, f64),
}

impl Trip {
    pub(crate) fn from_input(input: &ActionInput) -> Result<Self, ActionError> {
        Ok(Self {
            start: validate::coordinates(input, "start_latitude", "start_longitude", "start_")?,
            end: validate::coordinates(input, "end_latitude", "end_longitude", "end_")?,
        })
    }

    pub(crate) fn fields(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("start_latitude".into(), json!(self.start.0));
        map.insert("start_longitude".into(), json!(self.start.1));
        map.insert("end_latitude".into(), json!(self.end.0));
        map.insert("end_longitude".into(), json!(self.end.1));
        map
    }
}

/// Seats for shared rides: 1 or 2, out-of-range values clamped.
/// `None` when the caller did not ask for a seat count.
pub(crate) fn seat_count(input: &ActionInput) -> Result<Option<i64>, ActionError> {
    let Some(raw) = input.get("seat_count") else {
        return Ok(None);
    };
    match raw {
        Value::Number(_) => as_integer(raw)
            .map(|n| Some(n.clamp(1, 2)))
            .ok_or_else(seat_count_error),
        _ => Err(seat_count_error()),
    }
}

fn seat_count_error() -> ActionError {
    ActionError::validation("seat_count must be an integer (1 or 2)")
}

/// History page size: 10 unless a valid integer is given, then 1..=50.
pub(crate) fn history_limit(input: &ActionInput) -> i64 {
    validate::clamp_or(input.opt_i64("limit"), 10, 1, MAX_HISTORY_LIMIT)
}

/// History offset, never negative.
pub(crate) fn history_offset(input: &ActionInput) -> i64 {
    input.opt_i64("offset").unwrap_or(0).max(0)
}

/// Copy trimmed, non-blank string inputs into `body`.
pub(crate) fn copy_strings(input: &ActionInput, body: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = input.opt_str(key) {
            body.insert((*key).to_owned(), json!(value.trim()));
        }
    }
}
