//! Products, estimates and ride requests.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, RIDERS_VERSION, Trip, copy_strings, seat_count};

const RIDE_OPTIONAL_FIELDS: [&str; 7] = [
    "start_address",
    "start_nickname",
    "end_address",
    "end_nickname",
    "fare_id",
    "surge_confirmation_id",
    "payment_method_id",
];

fn field(response: &Value, key: &str) -> Value {
    response.get(key).cloned().unwrap_or(Value::Null)
}

fn list(response: &Value, key: &str) -> Value {
    response.get(key).cloned().unwrap_or_else(|| json!([]))
}

fn ride_path(input: &ActionInput, suffix: &str) -> Result<String, ActionError> {
    Ok(format!("requests/{}{suffix}", validate::identifier(input, "request_id")?))
}

/// Body for estimate and ride requests: product, trip and optional seats.
fn ride_body(input: &ActionInput) -> Result<Map<String, Value>, ActionError> {
    let product_id = validate::identifier(input, "product_id")?;
    let trip = Trip::from_input(input)?;

    let mut body = Map::new();
    body.insert("product_id".into(), json!(product_id));
    body.extend(trip.fields());
    if let Some(seats) = seat_count(input)? {
        body.insert("seat_count".into(), json!(seats));
    }
    Ok(body)
}

pub(crate) async fn get_products(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let (lat, lng) = validate::coordinates(&input, "latitude", "longitude", "")?;

    let request = client::request(&ctx, RequestMethod::Get, RIDERS_VERSION, "products")?
        .query_param("latitude", lat)
        .query_param("longitude", lng);
    let response = ctx.fetch(request).await?;
    Ok(json!({ "products": list(&response, "products") }))
}

pub(crate) async fn get_price_estimate(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let trip = Trip::from_input(&input)?;
    let seats = seat_count(&input)?;

    let mut request = client::request(&ctx, RequestMethod::Get, RIDERS_VERSION, "estimates/price")?;
    for (key, value) in trip.fields() {
        request = request.query_param(key, value);
    }
    request = request.query_opt("seat_count", seats);

    let response = ctx.fetch(request).await?;
    Ok(json!({ "prices": list(&response, "prices") }))
}

pub(crate) async fn get_time_estimate(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let (lat, lng) = validate::coordinates(&input, "start_latitude", "start_longitude", "start_")?;
    let product_id = match input.opt_str("product_id") {
        Some(_) => Some(validate::identifier(&input, "product_id")?),
        None => None,
    };

    let request = client::request(&ctx, RequestMethod::Get, RIDERS_VERSION, "estimates/time")?
        .query_param("start_latitude", lat)
        .query_param("start_longitude", lng)
        .query_opt("product_id", product_id);
    let response = ctx.fetch(request).await?;
    Ok(json!({ "times": list(&response, "times") }))
}

pub(crate) async fn get_ride_estimate(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = ride_body(&input)?;
    let request = client::request(&ctx, RequestMethod::Post, RIDERS_VERSION, "requests/estimate")?
        .json(Value::Object(body));
    let estimate = ctx.fetch(request).await?;
    Ok(json!({ "estimate": estimate }))
}

pub(crate) async fn request_ride(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let mut body = ride_body(&input)?;
    copy_strings(&input, &mut body, &RIDE_OPTIONAL_FIELDS);

    let request = client::request(&ctx, RequestMethod::Post, RIDERS_VERSION, "requests")?
        .json(Value::Object(body));
    let response = ctx.fetch(request).await?;

    tracing::info!(request_id = %field(&response, "request_id"), "ride requested");
    Ok(json!({
        "request_id": field(&response, "request_id"),
        "status": field(&response, "status"),
        "eta": field(&response, "eta"),
        "surge_multiplier": field(&response, "surge_multiplier"),
        "driver": field(&response, "driver"),
        "vehicle": field(&response, "vehicle"),
    }))
}

pub(crate) async fn get_ride_status(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let ride = client::get(&ctx, &ride_path(&input, "")?).await?;
    Ok(json!({ "ride": ride }))
}

pub(crate) async fn get_ride_map(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let response = client::get(&ctx, &ride_path(&input, "/map")?).await?;
    Ok(json!({ "href": field(&response, "href") }))
}

pub(crate) async fn cancel_ride(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = ride_path(&input, "")?;
    ctx.fetch(client::request(&ctx, RequestMethod::Delete, RIDERS_VERSION, &path)?)
        .await?;
    Ok(json!({}))
}

pub(crate) async fn get_ride_receipt(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let receipt = client::get(&ctx, &ride_path(&input, "/receipt")?).await?;
    Ok(json!({ "receipt": receipt }))
}
