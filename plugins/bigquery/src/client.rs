use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// Authorised request to `path` (segments already encoded).
pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.bearer_token()?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url).bearer_auth(token))
}

/// `projects/<id>` with the id taken from `project_id`.
pub(crate) fn project_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!("projects/{}", encode_segment(input.require_str("project_id")?)))
}

pub(crate) fn dataset_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!(
        "{}/datasets/{}",
        project_path(input)?,
        encode_segment(input.require_str("dataset_id")?)
    ))
}

pub(crate) fn table_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!(
        "{}/tables/{}",
        dataset_path(input)?,
        encode_segment(input.require_str("table_id")?)
    ))
}

/// Positive `max_results`, if given.
pub(crate) fn max_results(input: &ActionInput) -> Option<i64> {
    input.opt_i64("max_results").filter(|n| *n > 0)
}

/// Integer from a field the API encodes as a decimal string.
pub(crate) fn int64(body: &Value, key: &str) -> Option<i64> {
    match body.get(key)? {
        Value::String(s) => s.parse().ok(),
        other => other.as_i64(),
    }
}

/// `body.<key>` or `null`.
pub(crate) fn field(body: &Value, key: &str) -> Value {
    body.get(key).cloned().unwrap_or(Value::Null)
}

/// Object-valued `body.<key>` or `{}`.
pub(crate) fn object(body: &Value, key: &str) -> Value {
    body.get(key)
        .filter(|v| v.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}))
}

/// Copy `nextPageToken` to `next_page_token` when present.
pub(crate) fn with_next_page(mut out: Value, response: &Value) -> Value {
    if let (Some(token), Some(map)) = (
        response.get("nextPageToken").and_then(Value::as_str).filter(|t| !t.is_empty()),
        out.as_object_mut(),
    ) {
        map.insert("next_page_token".into(), json!(token));
    }
    out
}
