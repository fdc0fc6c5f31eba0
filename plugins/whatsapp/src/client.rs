use std::sync::LazyLock;

use nebula_action::RequestMethod;
use nebula_action::prelude::*;
use regex::Regex;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// E.164: `+`, a non-zero country digit, at most 15 digits in total.
static E164: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").ok());

/// Token keys accepted in the auth document, in lookup order.
const TOKEN_KEYS: [&str; 3] = ["access_token", "accessToken", "token"];

/// Returns `true` for an E.164 number such as `+14155550123`.
pub fn is_e164(phone: &str) -> bool {
    E164.as_ref().is_some_and(|re| re.is_match(phone))
}

/// Recipient in E.164 form, returned without the leading `+`.
pub(crate) fn recipient(input: &ActionInput) -> Result<&str, ActionError> {
    let to = input.require_str("to")?;
    if !is_e164(to) {
        return Err(ActionError::validation(
            "Invalid phone number format. Use format: +1234567890",
        ));
    }
    Ok(to.trim_start_matches('+'))
}

pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.credential_any(&TOKEN_KEYS)?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url).bearer_auth(token))
}

/// Post a message payload and return the id Graph assigned to it.
///
/// A 2xx answer without a `messages` entry is still a failure; its
/// `error.message` (or "Unknown error") is reported.
pub(crate) async fn send_message(
    ctx: &ExecutionContext,
    input: &ActionInput,
    mut payload: Map<String, Value>,
) -> Result<Value, ActionError> {
    let phone_number_id = validate::identifier(input, "phone_number_id")?;
    payload.insert("messaging_product".into(), json!("whatsapp"));

    let request = request(ctx, RequestMethod::Post, &format!("{phone_number_id}/messages"))?
        .json(Value::Object(payload));
    let response = ctx.fetch(request).await?;

    match response.pointer("/messages/0/id").and_then(Value::as_str) {
        Some(id) => {
            tracing::debug!(message_id = id, "message accepted");
            Ok(json!({ "message_id": id }))
        }
        None => Err(ActionError::vendor(graph_error(&response), Map::new())),
    }
}

pub(crate) fn graph_error(response: &Value) -> String {
    response
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("Unknown error")
        .to_owned()
}
