use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client;

pub(crate) async fn check_in(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    scan(&input, &ctx, "check-in").await
}

pub(crate) async fn check_out(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    scan(&input, &ctx, "check-out").await
}

async fn scan(input: &ActionInput, ctx: &ExecutionContext, verb: &str) -> Result<Value, ActionError> {
    let event_id = input.require_str("event_id")?;
    let ticket_id = input.require_str("ticket_id")?;

    let path = format!(
        "events/{}/tickets/{}/{verb}",
        encode_segment(event_id),
        encode_segment(ticket_id)
    );
    let request = client::request(ctx, RequestMethod::Post, &path)?
        .header("Content-Type", "application/json")
        .query_opt("overrideLocation", input.opt_str("override_location"));

    let body = client::call(ctx, request).await?.into_result()?;
    let messages = body
        .get("scanningMessages")
        .filter(|v| v.is_array())
        .cloned()
        .unwrap_or_else(|| json!([]));

    Ok(json!({ "scanningMessages": messages }))
}
