//! Read-only lookups. Each action fetches a single record when its id is
//! given and a page of records otherwise.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client;

/// Single-record fetch, wrapped as `{<key>: body}`.
async fn fetch_one(
    ctx: &ExecutionContext,
    path: &str,
    query: &[(&str, Option<&str>)],
    key: &str,
) -> Result<Value, ActionError> {
    let mut request = client::request(ctx, RequestMethod::Get, path)?;
    for (name, value) in query {
        request = request.query_opt(*name, *value);
    }
    let body = client::call(ctx, request).await?.into_result()?;
    let mut out = Map::new();
    out.insert(key.to_string(), body);
    Ok(Value::Object(out))
}

/// Paged listing under `key`.
async fn fetch_page(
    ctx: &ExecutionContext,
    input: &ActionInput,
    path: &str,
    query: &[(&str, Option<&str>)],
    key: &str,
) -> Result<Value, ActionError> {
    let page = PageRequest::new(input.opt_u64("page"), input.opt_u64("page_size"));

    let mut request = client::request(ctx, RequestMethod::Get, path)?;
    for (name, value) in query {
        request = request.query_opt(*name, *value);
    }
    let request = request
        .query_param("page", page.page)
        .query_opt("pageSize", page.page_size);

    let decoded = client::call(ctx, request).await?;
    Ok(paginate(&decoded, key, page))
}

pub(crate) async fn get_events(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let location = input.opt_str("override_location");

    match input.opt_str("event_id") {
        Some(event_id) => {
            let path = format!("events/{}", encode_segment(event_id));
            fetch_one(&ctx, &path, &[("overrideLocation", location)], "event").await
        }
        None => {
            let query = [("overrideLocation", location), ("since", input.opt_str("since"))];
            fetch_page(&ctx, &input, "events", &query, "events").await
        }
    }
}

pub(crate) async fn get_orders(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let event_id = input.require_str("event_id")?;
    let base = format!("events/{}/orders", encode_segment(event_id));
    let location = input.opt_str("override_location");
    let date = input.opt_str("event_date_id");

    match input.opt_str("order_id") {
        Some(order_id) => {
            let path = format!("{base}/{}", encode_segment(order_id));
            let query = [("overrideLocation", location), ("eventDateId", date)];
            fetch_one(&ctx, &path, &query, "order").await
        }
        None => {
            let query = [
                ("overrideLocation", location),
                ("eventDateId", date),
                ("since", input.opt_str("since")),
            ];
            fetch_page(&ctx, &input, &base, &query, "orders").await
        }
    }
}

pub(crate) async fn get_tickets(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let event_id = input.require_str("event_id")?;
    let base = format!("events/{}/tickets", encode_segment(event_id));
    let location = input.opt_str("override_location");

    match input.opt_str("ticket_id") {
        Some(ticket_id) => {
            let path = format!("{base}/{}", encode_segment(ticket_id));
            fetch_one(&ctx, &path, &[("overrideLocation", location)], "ticket").await
        }
        None => {
            let query = [
                ("overrideLocation", location),
                ("eventDateId", input.opt_str("event_date_id")),
                ("since", input.opt_str("since")),
                ("status", input.opt_str("status")),
            ];
            fetch_page(&ctx, &input, &base, &query, "tickets").await
        }
    }
}

pub(crate) async fn get_tags(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    match input.opt_str("tag_id") {
        Some(tag_id) => {
            let path = format!("tags/{}", encode_segment(tag_id));
            fetch_one(&ctx, &path, &[], "tag").await
        }
        None => fetch_page(&ctx, &input, "tags", &[], "tags").await,
    }
}
