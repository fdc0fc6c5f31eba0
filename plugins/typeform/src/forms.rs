//! Forms and their responses.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, copy_present, listing, paged, replace};

fn form_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!("forms/{}", validate::identifier(input, "form_id")?))
}

pub(crate) async fn get_current_user(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let user = client::get(&ctx, "me").await?;
    Ok(json!({ "user": user }))
}

pub(crate) async fn list_forms(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let request = paged(client::request(&ctx, RequestMethod::Get, "forms")?, &input)
        .query_opt("search", input.opt_str("search"))
        .query_opt("workspace_id", input.opt_str("workspace_id"))
        .query_opt("sort_by", input.opt_str("sort_by"))
        .query_opt("order_by", input.opt_str("order_by"));
    let response = ctx.fetch(request).await?;
    Ok(listing(&response, "forms"))
}

pub(crate) async fn get_form(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let form = client::get(&ctx, &form_path(&input)?).await?;
    Ok(json!({ "form": form }))
}

pub(crate) async fn create_form(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let mut body = Map::new();
    body.insert("title".into(), json!(input.require_str("title")?));
    copy_present(
        &input,
        &mut body,
        &["type", "fields", "settings", "welcome_screens", "thankyou_screens", "logic", "hidden", "variables"],
    );
    if let Some(workspace) = input.opt_str("workspace_href") {
        body.insert("workspace".into(), json!({ "href": workspace }));
    }
    if let Some(theme) = input.opt_str("theme_href") {
        body.insert("theme".into(), json!({ "href": theme }));
    }

    let form = client::send(&ctx, RequestMethod::Post, "forms", Value::Object(body)).await?;
    Ok(json!({ "form": form }))
}

/// A full `form` definition replaces the form; otherwise `title` and
/// `settings` are patched in place. The updated form is read back.
pub(crate) async fn update_form(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = form_path(&input)?;

    if let Some(definition) = input.opt_object("form") {
        let form = client::send(&ctx, RequestMethod::Put, &path, Value::Object(definition.clone())).await?;
        return Ok(json!({ "form": form }));
    }

    let mut operations = Vec::new();
    if let Some(title) = input.get("title") {
        operations.push(replace("/title", title));
    }
    if let Some(settings) = input.opt_object("settings") {
        for (key, value) in settings {
            operations.push(replace(&format!("/settings/{key}"), value));
        }
    }
    if operations.is_empty() {
        return Err(ActionError::validation("Provide form, title or settings to update"));
    }

    client::send(&ctx, RequestMethod::Patch, &path, Value::Array(operations)).await?;
    let form = client::get(&ctx, &path).await?;
    Ok(json!({ "form": form }))
}

pub(crate) async fn delete_form(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    client::delete(&ctx, &form_path(&input)?).await
}

/// Comma-separated ids from either a list or a string.
fn id_list(input: &ActionInput, key: &str) -> Option<String> {
    match input.non_empty(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(","),
        ),
        _ => None,
    }
}

pub(crate) async fn list_responses(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/responses", form_path(&input)?);
    let mut request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("page_size", input.opt_i64("page_size").map(|n| n.clamp(1, 1000)));
    for key in ["since", "until", "after", "before", "sort", "query", "response_type"] {
        request = request.query_opt(key, input.opt_str(key));
    }
    request = request
        .query_opt("completed", input.opt_bool("completed"))
        .query_opt("included_response_ids", id_list(&input, "included_response_ids"))
        .query_opt("excluded_response_ids", id_list(&input, "excluded_response_ids"))
        .query_opt("fields", id_list(&input, "fields"));

    let response = ctx.fetch(request).await?;
    Ok(listing(&response, "responses"))
}

pub(crate) async fn delete_responses(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/responses", form_path(&input)?);
    let ids = id_list(&input, "included_response_ids")
        .ok_or_else(|| ActionError::required("included_response_ids"))?;

    let request = client::request(&ctx, RequestMethod::Delete, &path)?
        .query_param("included_response_ids", &ids);
    ctx.fetch(request).await?;
    Ok(json!({ "deleted": true, "deleted_response_ids": ids.split(',').collect::<Vec<_>>() }))
}
