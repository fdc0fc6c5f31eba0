//! Workspaces.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, listing, paged, replace};

fn workspace_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!("workspaces/{}", validate::identifier(input, "workspace_id")?))
}

pub(crate) async fn list_workspaces(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let request = paged(client::request(&ctx, RequestMethod::Get, "workspaces")?, &input)
        .query_opt("search", input.opt_str("search"));
    let response = ctx.fetch(request).await?;
    Ok(listing(&response, "workspaces"))
}

pub(crate) async fn get_workspace(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workspace = client::get(&ctx, &workspace_path(&input)?).await?;
    Ok(json!({ "workspace": workspace }))
}

pub(crate) async fn create_workspace(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let name = input.require_str("name")?;
    let workspace = client::send(&ctx, RequestMethod::Post, "workspaces", json!({ "name": name })).await?;
    Ok(json!({ "workspace": workspace }))
}

/// Rename via JSON Patch, then read the workspace back.
pub(crate) async fn update_workspace(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = workspace_path(&input)?;
    let name = input.require("name")?;

    client::send(&ctx, RequestMethod::Patch, &path, json!([replace("/name", name)])).await?;
    let workspace = client::get(&ctx, &path).await?;
    Ok(json!({ "workspace": workspace }))
}

pub(crate) async fn delete_workspace(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    client::delete(&ctx, &workspace_path(&input)?).await
}
