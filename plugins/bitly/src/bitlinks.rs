//! Bitlink creation, lookup and click analytics.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, bitlink_segment, copy_present, normalize_bitlink};

async fn post_bitlink(
    input: &ActionInput,
    ctx: &ExecutionContext,
    path: &str,
    optional: &[&str],
) -> Result<Value, ActionError> {
    let mut body = Map::new();
    body.insert("long_url".into(), json!(input.require_str("long_url")?));
    copy_present(input, &mut body, optional);

    let request = client::request(ctx, RequestMethod::Post, path)?.json(Value::Object(body));
    let bitlink = ctx.fetch(request).await?;
    Ok(json!({ "bitlink": bitlink }))
}

pub(crate) async fn shorten_url(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    post_bitlink(&input, &ctx, "shorten", &["domain", "group_guid"]).await
}

pub(crate) async fn create_bitlink(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    post_bitlink(
        &input,
        &ctx,
        "bitlinks",
        &["domain", "group_guid", "title", "tags", "custom_back_half"],
    )
    .await
}

pub(crate) async fn get_bitlink(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("bitlinks/{}", bitlink_segment(&input)?);
    let bitlink = ctx
        .fetch(client::request(&ctx, RequestMethod::Get, &path)?)
        .await?;
    Ok(json!({ "bitlink": bitlink }))
}

pub(crate) async fn update_bitlink(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("bitlinks/{}", bitlink_segment(&input)?);

    // Explicit empty values are meaningful here: `tags: []` clears the tags.
    let mut body = Map::new();
    for key in ["title", "tags", "archived"] {
        if let Some(value) = input.get(key) {
            body.insert(key.into(), value.clone());
        }
    }

    let request = client::request(&ctx, RequestMethod::Patch, &path)?.json(Value::Object(body));
    let bitlink = ctx.fetch(request).await?;
    Ok(json!({ "bitlink": bitlink }))
}

pub(crate) async fn expand_bitlink(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let bitlink = normalize_bitlink(input.require_str("bitlink")?);
    let request = client::request(&ctx, RequestMethod::Post, "expand")?
        .json(json!({ "bitlink_id": bitlink }));
    let response = ctx.fetch(request).await?;

    Ok(json!({
        "long_url": response.get("long_url").and_then(Value::as_str).unwrap_or_default(),
    }))
}

/// `unit` defaults to `day`, `units` to `-1` (all available).
fn clicks_request(input: &ActionInput, ctx: &ExecutionContext, suffix: &str) -> Result<HttpRequest, ActionError> {
    let path = format!("bitlinks/{}/{suffix}", bitlink_segment(input)?);
    Ok(client::request(ctx, RequestMethod::Get, &path)?
        .query_param("unit", input.str_or("unit", "day"))
        .query_param("units", input.i64_or("units", -1)))
}

pub(crate) async fn get_clicks(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let response = ctx.fetch(clicks_request(&input, &ctx, "clicks")?).await?;
    Ok(json!({
        "clicks": response.get("link_clicks").cloned().unwrap_or_else(|| json!([])),
    }))
}

pub(crate) async fn get_clicks_summary(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let response = ctx
        .fetch(clicks_request(&input, &ctx, "clicks/summary")?)
        .await?;
    Ok(json!({
        "total_clicks": response.get("total_clicks").cloned().unwrap_or_else(|| json!(0)),
        "unit": response.get("unit").cloned().unwrap_or_else(|| json!("")),
        "units": response.get("units").cloned().unwrap_or_else(|| json!(0)),
    }))
}

/// `archived` accepts Bitly's `on`/`off`/`both` or a boolean (`true` is `on`).
fn archived_filter(input: &ActionInput) -> Option<&str> {
    match input.get("archived")? {
        Value::Bool(true) => Some("on"),
        Value::String(s) if !s.is_empty() => Some(s),
        _ => None,
    }
}

/// Group from input, or the user's default group.
async fn group_guid(input: &ActionInput, ctx: &ExecutionContext) -> Result<String, ActionError> {
    if let Some(guid) = input.opt_str("group_guid") {
        return Ok(guid.to_owned());
    }
    let user = ctx
        .fetch(client::request(ctx, RequestMethod::Get, "user")?)
        .await?;
    let guid = user
        .get("default_group_guid")
        .and_then(Value::as_str)
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ActionError::from_message("No default_group_guid found for user"))?;
    tracing::debug!(group_guid = guid, "using the user's default group");
    Ok(guid.to_owned())
}

pub(crate) async fn list_bitlinks(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let guid = group_guid(&input, &ctx).await?;
    let path = format!("groups/{}/bitlinks", encode_segment(&guid));

    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("size", input.opt_i64("size"))
        .query_opt("page", input.opt_i64("page"))
        .query_opt("keyword", input.opt_str("keyword"))
        .query_opt("archived", archived_filter(&input));
    let response = ctx.fetch(request).await?;

    let page = |key: &str| {
        response
            .pointer(&format!("/pagination/{key}"))
            .cloned()
            .unwrap_or(Value::Null)
    };
    Ok(json!({
        "bitlinks": response.get("links").cloned().unwrap_or_else(|| json!([])),
        "total": page("total"),
        "page": page("page"),
        "size": page("size"),
        "next": page("next"),
        "prev": page("prev"),
    }))
}
