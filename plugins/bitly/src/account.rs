//! User, group and organization lookups.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client;

pub(crate) async fn get_user(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let user = ctx
        .fetch(client::request(&ctx, RequestMethod::Get, "user")?)
        .await?;
    Ok(json!({ "user": user }))
}

/// GET `path` and lift the `key` array out of the response.
async fn list(ctx: &ExecutionContext, path: &str, key: &str) -> Result<Value, ActionError> {
    let response = ctx
        .fetch(client::request(ctx, RequestMethod::Get, path)?)
        .await?;
    let items = response.get(key).cloned().unwrap_or_else(|| json!([]));
    let mut out = Map::new();
    out.insert(key.to_owned(), items);
    Ok(Value::Object(out))
}

pub(crate) async fn list_groups(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    list(&ctx, "groups", "groups").await
}

pub(crate) async fn get_group(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("groups/{}", encode_segment(input.require_str("group_guid")?));
    let group = ctx
        .fetch(client::request(&ctx, RequestMethod::Get, &path)?)
        .await?;
    Ok(json!({ "group": group }))
}

pub(crate) async fn list_organizations(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    list(&ctx, "organizations", "organizations").await
}
