use nebula_action::RequestMethod;
use nebula_action::prelude::*;
use nebula_action::status_error;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// POST a JSON body to `path` (relative to the API root, trailing slash
/// included) and return the unwrapped `data` object.
pub(crate) async fn post(ctx: &ExecutionContext, path: &str, body: Value) -> Result<Value, ActionError> {
    let request = request(ctx, RequestMethod::Post, path)?.json(body);
    call(ctx, request).await
}

pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.bearer_token()?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url).bearer_auth(token))
}

/// Send and unwrap. TikTok reports failures in the body, often with a 4xx
/// status as well, so the body is checked first.
pub(crate) async fn call(ctx: &ExecutionContext, request: HttpRequest) -> Result<Value, ActionError> {
    let response = ctx.send(request).await?;
    let decoded = VendorResponse::decode_with(response.body.clone(), detect_error).check()?;
    if !response.is_success() {
        return Err(status_error(&response));
    }
    Ok(match decoded.into_result()? {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Object(map)),
        other => other,
    })
}

fn vendor_error(message: String, code: &str) -> VendorResponse {
    let mut fields = Map::new();
    fields.insert("error_code".into(), json!(code));
    VendorResponse::VendorError {
        code: Some(json!(code)),
        message,
        fields,
    }
}

/// The three error shapes TikTok v2 uses:
/// `{error_code, error_message}`, `{error: {code, message, log_id}}` with a
/// code other than `ok`, and a bare `{message}` with no data.
pub(crate) fn detect_error(body: &Map<String, Value>) -> Option<VendorResponse> {
    fn text(v: Option<&Value>) -> Option<&str> {
        v.and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    if let Some(code) = body.get("error_code").filter(|c| truthy(c)) {
        let code = match code {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let message = text(body.get("error_message"))
            .or_else(|| text(body.get("message")))
            .unwrap_or("Unknown error");
        return Some(vendor_error(
            format!("TikTok API error: {message} (code: {code})"),
            &code,
        ));
    }

    match body.get("error") {
        Some(Value::Object(error)) => {
            let code = text(error.get("code")).unwrap_or("unknown_error");
            if code == "ok" {
                return None;
            }
            let log_id = text(error.get("log_id")).unwrap_or_default();
            let message = match code {
                "access_token_invalid" => "Access token is invalid or expired.".to_owned(),
                "rate_limit_exceeded" => "Rate limit exceeded.".to_owned(),
                "scope_not_authorized" => {
                    format!("Required scope not authorized. Code: {code}, Log ID: {log_id}")
                }
                _ => {
                    let detail = text(error.get("message"))
                        .or_else(|| text(error.get("description")))
                        .map_or_else(|| Value::Object(error.clone()).to_string(), str::to_owned);
                    format!("TikTok API error: {detail} (code: {code}, log_id: {log_id})")
                }
            };
            return Some(vendor_error(message, code));
        }
        Some(other) if truthy(other) => {
            let detail = other.as_str().map_or_else(|| other.to_string(), str::to_owned);
            return Some(vendor_error(format!("TikTok API error: {detail}"), ""));
        }
        _ => {}
    }

    let has_data = body.get("data").is_some_and(truthy);
    if let Some(message) = text(body.get("message"))
        && !has_data
        && !matches!(message.to_lowercase().as_str(), "success" | "ok")
    {
        return Some(vendor_error(format!("TikTok API error: {message}"), ""));
    }
    None
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64() != Some(0.0),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn message(body: Value) -> Option<String> {
        let Value::Object(map) = body else { unreachable!() };
        match detect_error(&map)? {
            VendorResponse::VendorError { message, .. } => Some(message),
            _ => None,
        }
    }

    #[rstest]
    #[case(json!({"data": {"user": {}}, "error": {"code": "ok", "message": "", "log_id": "L1"}}), None)]
    #[case(
        json!({"data": {}, "error": {"code": "access_token_invalid", "message": "x", "log_id": "L2"}}),
        Some("Access token is invalid or expired.")
    )]
    #[case(
        json!({"error": {"code": "scope_not_authorized", "log_id": "L3"}}),
        Some("Required scope not authorized. Code: scope_not_authorized, Log ID: L3")
    )]
    #[case(
        json!({"error": {"code": "spam_risk_too_many_posts", "message": "Daily post cap reached", "log_id": "L4"}}),
        Some("TikTok API error: Daily post cap reached (code: spam_risk_too_many_posts, log_id: L4)")
    )]
    #[case(
        json!({"error_code": 10002, "error_message": "bad publish id"}),
        Some("TikTok API error: bad publish id (code: 10002)")
    )]
    #[case(
        json!({"error_code": "rate_limit_exceeded", "error_message": "", "message": "slow down"}),
        Some("TikTok API error: slow down (code: rate_limit_exceeded)")
    )]
    #[case(json!({"message": "Success"}), None)]
    #[case(json!({"message": "Service unavailable"}), Some("TikTok API error: Service unavailable"))]
    #[case(json!({"error_code": 0, "data": {"videos": []}}), None)]
    fn recognises_error_shapes(#[case] body: Value, #[case] expected: Option<&str>) {
        assert_eq!(message(body).as_deref(), expected);
    }
}
