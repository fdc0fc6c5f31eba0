//! Partner loyalty endpoints (v1).

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, LOYALTY_VERSION, copy_strings};

const FLIGHT_FIELDS: [&str; 6] = [
    "flight_number",
    "departure_airport",
    "arrival_airport",
    "departure_time",
    "arrival_time",
    "passenger_name",
];

async fn post(ctx: &ExecutionContext, path: &str, body: Map<String, Value>) -> Result<Value, ActionError> {
    let request = client::request(ctx, RequestMethod::Post, LOYALTY_VERSION, path)?.json(Value::Object(body));
    ctx.fetch(request).await
}

fn partner(input: &ActionInput) -> Result<Map<String, Value>, ActionError> {
    let mut body = Map::new();
    body.insert("partner_id".into(), json!(validate::identifier(input, "partner_id")?));
    Ok(body)
}

/// Required string that may carry any characters, trimmed.
fn required_text<'a>(input: &'a ActionInput, key: &str) -> Result<&'a str, ActionError> {
    match input.get(key) {
        None => Err(ActionError::required(key)),
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim()),
        Some(_) => Err(ActionError::validation(format!("{key} must be a non-empty string"))),
    }
}

pub(crate) async fn link_loyalty_account(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let mut body = partner(&input)?;
    body.insert("member_id".into(), json!(required_text(&input, "member_id")?));
    copy_strings(&input, &mut body, &["first_name", "last_name", "email"]);

    let response = post(&ctx, "partner-loyalty/link-account", body).await?;
    Ok(json!({ "linked": true, "response": response }))
}

pub(crate) async fn unlink_loyalty_account(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = partner(&input)?;
    let response = post(&ctx, "partner-loyalty/unlink-account", body).await?;
    Ok(json!({ "unlinked": true, "response": response }))
}

pub(crate) async fn submit_flight_booking_data(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let mut body = partner(&input)?;
    body.insert("booking_id".into(), json!(required_text(&input, "booking_id")?));
    copy_strings(&input, &mut body, &FLIGHT_FIELDS);

    let response = post(&ctx, "partner-loyalty/flight-booking-data", body).await?;
    Ok(json!({ "submitted": true, "response": response }))
}
