//! Table management and streaming inserts.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, field, max_results, object, with_next_page};
use crate::schema::TableSchema;

fn reference(body: &Value, key: &str) -> Value {
    body.pointer(&format!("/tableReference/{key}"))
        .cloned()
        .unwrap_or(Value::Null)
}

pub(crate) async fn list_tables(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/tables", client::dataset_path(&input)?);
    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("maxResults", max_results(&input))
        .query_opt("pageToken", input.opt_str("page_token"));
    let response = ctx.fetch(request).await?;

    let tables: Vec<Value> = response
        .get("tables")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|t| {
            json!({
                "id": field(t, "id"),
                "table_id": reference(t, "tableId"),
                "dataset_id": reference(t, "datasetId"),
                "project_id": reference(t, "projectId"),
                "type": field(t, "type"),
                "friendly_name": field(t, "friendlyName"),
                "creation_time": field(t, "creationTime"),
                "expiration_time": field(t, "expirationTime"),
                "labels": object(t, "labels"),
            })
        })
        .collect();

    Ok(with_next_page(
        json!({ "tables": tables, "total_items": field(&response, "totalItems") }),
        &response,
    ))
}

pub(crate) async fn get_table(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = client::table_path(&input)?;
    let r = ctx
        .fetch(client::request(&ctx, RequestMethod::Get, &path)?)
        .await?;

    Ok(json!({
        "table": {
            "id": field(&r, "id"),
            "table_id": reference(&r, "tableId"),
            "dataset_id": reference(&r, "datasetId"),
            "project_id": reference(&r, "projectId"),
            "type": field(&r, "type"),
            "friendly_name": field(&r, "friendlyName"),
            "description": field(&r, "description"),
            "schema": TableSchema::of(&r).to_output(),
            "num_rows": field(&r, "numRows"),
            "num_bytes": field(&r, "numBytes"),
            "creation_time": field(&r, "creationTime"),
            "last_modified_time": field(&r, "lastModifiedTime"),
            "expiration_time": field(&r, "expirationTime"),
            "location": field(&r, "location"),
            "streaming_buffer": field(&r, "streamingBuffer"),
            "time_partitioning": field(&r, "timePartitioning"),
            "clustering": field(&r, "clustering"),
            "labels": object(&r, "labels"),
        }
    }))
}

pub(crate) async fn create_table(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let project_id = input.require_str("project_id")?;
    let dataset_id = input.require_str("dataset_id")?;
    let table_id = input.require_str("table_id")?;
    let schema = input.require("schema")?.clone();
    let path = format!("{}/tables", client::dataset_path(&input)?);

    let mut body = Map::new();
    body.insert(
        "tableReference".into(),
        json!({"projectId": project_id, "datasetId": dataset_id, "tableId": table_id}),
    );
    body.insert("schema".into(), schema);
    if let Some(description) = input.opt_str("description") {
        body.insert("description".into(), json!(description));
    }
    if let Some(expiration) = input.opt_i64("expiration_time").filter(|t| *t > 0) {
        body.insert("expirationTime".into(), json!(expiration.to_string()));
    }
    for (input_key, api_key) in [
        ("time_partitioning", "timePartitioning"),
        ("clustering", "clustering"),
        ("labels", "labels"),
    ] {
        if let Some(value) = input.non_empty(input_key) {
            body.insert(api_key.into(), value.clone());
        }
    }

    let r = ctx
        .fetch(client::request(&ctx, RequestMethod::Post, &path)?.json(Value::Object(body)))
        .await?;

    Ok(json!({
        "table": {
            "id": field(&r, "id"),
            "table_id": reference(&r, "tableId"),
            "dataset_id": reference(&r, "datasetId"),
            "project_id": reference(&r, "projectId"),
            "schema": TableSchema::of(&r).to_output(),
            "creation_time": field(&r, "creationTime"),
        }
    }))
}

pub(crate) async fn delete_table(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = client::table_path(&input)?;
    ctx.fetch(client::request(&ctx, RequestMethod::Delete, &path)?)
        .await?;
    Ok(json!({ "deleted": true }))
}

/// Streaming insert. Rows the API rejects make the whole action a failure
/// that still reports what was inserted.
pub(crate) async fn insert_rows(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/insertAll", client::table_path(&input)?);
    let rows = input.require_array("rows")?;

    let request = client::request(&ctx, RequestMethod::Post, &path)?.json(json!({
        "rows": rows.iter().map(|row| json!({ "json": row })).collect::<Vec<_>>(),
        "skipInvalidRows": input.bool_or("skip_invalid_rows", false),
        "ignoreUnknownValues": input.bool_or("ignore_unknown_values", false),
    }));
    let response = ctx.fetch(request).await?;

    let errors: Vec<Value> = response
        .get("insertErrors")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|e| {
            json!({
                "index": field(e, "index"),
                "errors": e.get("errors").cloned().unwrap_or_else(|| json!([])),
            })
        })
        .collect();
    let inserted = rows.len().saturating_sub(errors.len());

    if errors.is_empty() {
        return Ok(json!({ "inserted_count": inserted, "insert_errors": [] }));
    }

    tracing::warn!(rejected = errors.len(), inserted, "streaming insert partially failed");
    let message = format!("{} of {} rows were rejected", errors.len(), rows.len());
    let mut fields = Map::new();
    fields.insert("inserted_count".into(), json!(inserted));
    fields.insert("insert_errors".into(), Value::Array(errors));
    Err(ActionError::vendor(message, fields))
}
