use nebula_action::prelude::*;
use nebula_action::status_error;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// Request against `path` (already encoded) with the API key attached.
pub(crate) fn request(
    ctx: &ExecutionContext,
    method: nebula_action::RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let key = ctx.credential("api_key")?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url)
        .auth(&RequestAuth::api_key_header("x-api-key", key))
        .header("Accept", "application/json"))
}

/// Send and decode. A `{statusCode, error, message}` body is a vendor
/// failure whatever the HTTP status.
pub(crate) async fn call(
    ctx: &ExecutionContext,
    request: HttpRequest,
) -> Result<VendorResponse, ActionError> {
    let response = ctx.send(request).await?;
    let decoded = VendorResponse::decode_with(response.body.clone(), detect_error).check()?;
    if !response.is_success() {
        return Err(status_error(&response));
    }
    Ok(decoded)
}

fn detect_error(body: &Map<String, Value>) -> Option<VendorResponse> {
    let status = body.get("statusCode")?;
    let text = |key: &str| body.get(key).and_then(Value::as_str).unwrap_or_default();

    let mut fields = Map::new();
    fields.insert("statusCode".into(), status.clone());
    fields.insert("message".into(), json!(text("message")));

    Some(VendorResponse::VendorError {
        code: Some(status.clone()),
        message: text("error").to_string(),
        fields,
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn status_code_body_is_an_error() {
        let body = json!({"statusCode": 404, "error": "Not Found", "message": "Event not found"});
        let Value::Object(map) = body else { unreachable!() };
        let Some(VendorResponse::VendorError { message, fields, .. }) = detect_error(&map) else {
            panic!("expected vendor error");
        };
        assert_eq!(message, "Not Found");
        assert_eq!(fields["statusCode"], json!(404));
        assert_eq!(fields["message"], json!("Event not found"));
    }

    #[test]
    fn ordinary_body_passes() {
        let Value::Object(map) = json!({"events": []}) else { unreachable!() };
        assert!(detect_error(&map).is_none());
    }
}
