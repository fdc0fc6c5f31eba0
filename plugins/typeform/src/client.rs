use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::{CATEGORY, DEFAULT_BASE_URL};

const MAX_PAGE_SIZE: i64 = 200;

pub(crate) fn request(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
) -> Result<HttpRequest, ActionError> {
    let token = ctx.bearer_token()?;
    let url = format!("{}/{path}", ctx.base_url(CATEGORY, DEFAULT_BASE_URL));
    Ok(HttpRequest::new(method, url).bearer_auth(token))
}

pub(crate) async fn get(ctx: &ExecutionContext, path: &str) -> Result<Value, ActionError> {
    ctx.fetch(request(ctx, RequestMethod::Get, path)?).await
}

pub(crate) async fn send(
    ctx: &ExecutionContext,
    method: RequestMethod,
    path: &str,
    body: Value,
) -> Result<Value, ActionError> {
    ctx.fetch(request(ctx, method, path)?.json(body)).await
}

pub(crate) async fn delete(ctx: &ExecutionContext, path: &str) -> Result<Value, ActionError> {
    ctx.fetch(request(ctx, RequestMethod::Delete, path)?).await?;
    Ok(json!({ "deleted": true }))
}

/// `page` and `page_size` (clamped to Typeform's limit) when given.
pub(crate) fn paged(request: HttpRequest, input: &ActionInput) -> HttpRequest {
    request
        .query_opt("page", input.opt_u64("page").filter(|p| *p > 0))
        .query_opt(
            "page_size",
            input.opt_i64("page_size").map(|n| n.clamp(1, MAX_PAGE_SIZE)),
        )
}

/// `{key: items, total_items, page_count}` from a Typeform list page.
pub(crate) fn listing(response: &Value, key: &str) -> Value {
    let mut out = Map::new();
    out.insert(
        key.to_owned(),
        response.get("items").cloned().unwrap_or_else(|| json!([])),
    );
    out.insert(
        "total_items".into(),
        response.get("total_items").cloned().unwrap_or_else(|| json!(0)),
    );
    out.insert(
        "page_count".into(),
        response.get("page_count").cloned().unwrap_or_else(|| json!(0)),
    );
    Value::Object(out)
}

/// Copy present inputs into `body` under the same keys.
pub(crate) fn copy_present(input: &ActionInput, body: &mut Map<String, Value>, keys: &[&str]) {
    for key in keys {
        if let Some(value) = input.non_empty(key) {
            body.insert((*key).to_owned(), value.clone());
        }
    }
}

/// Single JSON Patch `replace` operation.
pub(crate) fn replace(path: &str, value: &Value) -> Value {
    json!({ "op": "replace", "path": path, "value": value })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn listing_defaults_missing_counts() {
        assert_eq!(
            listing(&json!({"items": [{"id": "f1"}]}), "forms"),
            json!({"forms": [{"id": "f1"}], "total_items": 0, "page_count": 0})
        );
    }
}
