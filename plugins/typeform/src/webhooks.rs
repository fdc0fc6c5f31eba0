//! Form webhooks, addressed by tag.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, copy_present};

fn webhooks_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!("forms/{}/webhooks", validate::identifier(input, "form_id")?))
}

fn webhook_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(format!("{}/{}", webhooks_path(input)?, validate::identifier(input, "tag")?))
}

pub(crate) async fn list_webhooks(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let response = client::get(&ctx, &webhooks_path(&input)?).await?;
    Ok(json!({ "webhooks": response.get("items").cloned().unwrap_or_else(|| json!([])) }))
}

pub(crate) async fn get_webhook(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let webhook = client::get(&ctx, &webhook_path(&input)?).await?;
    Ok(json!({ "webhook": webhook }))
}

/// Create or replace the webhook at `tag`. Only HTTPS targets are accepted.
pub(crate) async fn create_webhook(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = webhook_path(&input)?;
    let url = input.require_str("url")?;
    if !url.starts_with("https://") {
        return Err(ActionError::validation("url must be an HTTPS URL"));
    }

    let mut body = Map::new();
    body.insert("url".into(), json!(url));
    body.insert("enabled".into(), json!(input.bool_or("enabled", true)));
    copy_present(&input, &mut body, &["secret", "verify_ssl", "event_types"]);

    let webhook = client::send(&ctx, RequestMethod::Put, &path, Value::Object(body)).await?;
    Ok(json!({ "webhook": webhook }))
}

pub(crate) async fn delete_webhook(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    client::delete(&ctx, &webhook_path(&input)?).await
}
