//! Themes and images.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, copy_present, listing, paged};

pub(crate) async fn list_themes(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let request = paged(client::request(&ctx, RequestMethod::Get, "themes")?, &input);
    let response = ctx.fetch(request).await?;
    Ok(listing(&response, "themes"))
}

pub(crate) async fn get_theme(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let id = validate::identifier(&input, "theme_id")?;
    let theme = client::get(&ctx, &format!("themes/{id}")).await?;
    Ok(json!({ "theme": theme }))
}

pub(crate) async fn create_theme(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let mut body = Map::new();
    body.insert("name".into(), json!(input.require_str("name")?));
    copy_present(
        &input,
        &mut body,
        &["colors", "font", "background", "fields", "screens", "has_transparent_button", "rounded_corners"],
    );
    let theme = client::send(&ctx, RequestMethod::Post, "themes", Value::Object(body)).await?;
    Ok(json!({ "theme": theme }))
}

pub(crate) async fn delete_theme(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let id = validate::identifier(&input, "theme_id")?;
    client::delete(&ctx, &format!("themes/{id}")).await
}

/// The images endpoint answers with a bare array.
pub(crate) async fn list_images(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = client::get(&ctx, "images").await?;
    Ok(json!({ "images": VendorResponse::decode(body).items("images") }))
}

pub(crate) async fn get_image(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let id = validate::identifier(&input, "image_id")?;
    let image = client::get(&ctx, &format!("images/{id}")).await?;
    Ok(json!({ "image": image }))
}

pub(crate) async fn delete_image(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let id = validate::identifier(&input, "image_id")?;
    client::delete(&ctx, &format!("images/{id}")).await
}
