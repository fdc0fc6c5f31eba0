use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, RIDERS_VERSION, history_limit, history_offset};

pub(crate) async fn get_user_profile(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let user = client::get(&ctx, "me").await?;
    Ok(json!({ "user": user }))
}

/// Offset is only sent when positive.
pub(crate) async fn get_ride_history(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let offset = Some(history_offset(&input)).filter(|o| *o > 0);
    let request = client::request(&ctx, RequestMethod::Get, RIDERS_VERSION, "history")?
        .query_param("limit", history_limit(&input))
        .query_opt("offset", offset);

    let response = ctx.fetch(request).await?;
    Ok(json!({
        "history": response.get("history").cloned().unwrap_or_else(|| json!([])),
        "count": response.get("count").cloned().unwrap_or_else(|| json!(0)),
    }))
}

pub(crate) async fn get_payment_methods(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let response = client::get(&ctx, "payment-methods").await?;
    Ok(json!({
        "payment_methods": response.get("payment_methods").cloned().unwrap_or_else(|| json!([])),
        "last_used": response.get("last_used").cloned().unwrap_or(Value::Null),
    }))
}
