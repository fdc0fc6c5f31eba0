//! Dataset management.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, field, max_results, object, with_next_page};

fn reference(body: &Value) -> (Value, Value) {
    (
        body.pointer("/datasetReference/datasetId").cloned().unwrap_or(Value::Null),
        body.pointer("/datasetReference/projectId").cloned().unwrap_or(Value::Null),
    )
}

pub(crate) async fn list_datasets(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/datasets", client::project_path(&input)?);
    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("maxResults", max_results(&input))
        .query_opt("pageToken", input.opt_str("page_token"))
        .query_opt("filter", input.opt_str("filter"))
        .query_opt("all", input.bool_or("all", false).then_some("true"));
    let response = ctx.fetch(request).await?;

    let datasets: Vec<Value> = response
        .get("datasets")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|ds| {
            let (dataset_id, project_id) = reference(ds);
            json!({
                "id": field(ds, "id"),
                "dataset_id": dataset_id,
                "project_id": project_id,
                "friendly_name": field(ds, "friendlyName"),
                "location": field(ds, "location"),
                "labels": object(ds, "labels"),
            })
        })
        .collect();

    Ok(with_next_page(json!({ "datasets": datasets }), &response))
}

pub(crate) async fn get_dataset(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = client::dataset_path(&input)?;
    let response = ctx
        .fetch(client::request(&ctx, RequestMethod::Get, &path)?)
        .await?;

    let (dataset_id, project_id) = reference(&response);
    Ok(json!({
        "dataset": {
            "id": field(&response, "id"),
            "dataset_id": dataset_id,
            "project_id": project_id,
            "friendly_name": field(&response, "friendlyName"),
            "description": field(&response, "description"),
            "location": field(&response, "location"),
            "creation_time": field(&response, "creationTime"),
            "last_modified_time": field(&response, "lastModifiedTime"),
            "default_table_expiration_ms": field(&response, "defaultTableExpirationMs"),
            "default_partition_expiration_ms": field(&response, "defaultPartitionExpirationMs"),
            "labels": object(&response, "labels"),
            "access": response.get("access").filter(|a| a.is_array()).cloned().unwrap_or_else(|| json!([])),
        }
    }))
}

pub(crate) async fn create_dataset(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let project_id = input.require_str("project_id")?;
    let dataset_id = input.require_str("dataset_id")?;
    let path = format!("{}/datasets", client::project_path(&input)?);

    let mut body = json!({
        "datasetReference": {"projectId": project_id, "datasetId": dataset_id},
        "location": input.str_or("location", "US"),
    });
    if let Some(map) = body.as_object_mut() {
        if let Some(description) = input.opt_str("description") {
            map.insert("description".into(), json!(description));
        }
        if let Some(ms) = input.opt_i64("default_table_expiration_ms").filter(|ms| *ms > 0) {
            map.insert("defaultTableExpirationMs".into(), json!(ms.to_string()));
        }
        if let Some(labels) = input.non_empty("labels") {
            map.insert("labels".into(), labels.clone());
        }
    }

    let response = ctx
        .fetch(client::request(&ctx, RequestMethod::Post, &path)?.json(body))
        .await?;

    let (dataset_id, project_id) = reference(&response);
    Ok(json!({
        "dataset": {
            "id": field(&response, "id"),
            "dataset_id": dataset_id,
            "project_id": project_id,
            "location": field(&response, "location"),
            "creation_time": field(&response, "creationTime"),
        }
    }))
}

pub(crate) async fn delete_dataset(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = client::dataset_path(&input)?;
    let request = client::request(&ctx, RequestMethod::Delete, &path)?.query_opt(
        "deleteContents",
        input.bool_or("delete_contents", false).then_some("true"),
    );
    ctx.fetch(request).await?;
    Ok(json!({ "deleted": true }))
}
