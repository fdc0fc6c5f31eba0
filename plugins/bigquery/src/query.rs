//! Query execution and result paging.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, field, int64, max_results};
use crate::schema::TableSchema;

/// Rows, counts and schema shared by both query actions.
fn result_page(response: &Value) -> Map<String, Value> {
    let schema = TableSchema::of(response);
    let rows = schema.parse_rows(response.get("rows"));
    let total_rows = int64(response, "totalRows")
        .filter(|n| *n != 0)
        .unwrap_or(rows.len() as i64);

    let mut out = Map::new();
    out.insert("rows".into(), Value::Array(rows));
    out.insert("total_rows".into(), json!(total_rows));
    out.insert("schema".into(), schema.to_output());
    out.insert(
        "job_complete".into(),
        json!(response.get("jobComplete").and_then(Value::as_bool).unwrap_or(false)),
    );
    if let Some(token) = response.get("pageToken").and_then(Value::as_str) {
        out.insert("page_token".into(), json!(token));
    }
    out
}

pub(crate) async fn run_query(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/queries", client::project_path(&input)?);
    let query = input.require_str("query")?;
    let dry_run = input.bool_or("dry_run", false);

    let request = client::request(&ctx, RequestMethod::Post, &path)?.json(json!({
        "query": query,
        "useLegacySql": input.bool_or("use_legacy_sql", false),
        "maxResults": input.i64_or("max_results", 1000),
        "timeoutMs": input.i64_or("timeout_ms", 30_000),
        "dryRun": dry_run,
    }));
    let response = ctx.fetch(request).await?;

    if dry_run {
        return Ok(json!({
            "rows": [],
            "total_rows": 0,
            "total_bytes_processed": int64(&response, "totalBytesProcessed").unwrap_or(0),
            "job_complete": true,
            "dry_run": true,
        }));
    }

    let mut out = result_page(&response);
    out.insert(
        "job_id".into(),
        response
            .pointer("/jobReference/jobId")
            .cloned()
            .unwrap_or(Value::Null),
    );
    out.insert(
        "total_bytes_processed".into(),
        int64(&response, "totalBytesProcessed").map_or(Value::Null, Value::from),
    );
    out.insert("cache_hit".into(), field(&response, "cacheHit"));
    Ok(Value::Object(out))
}

pub(crate) async fn get_query_results(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!(
        "{}/queries/{}",
        client::project_path(&input)?,
        encode_segment(input.require_str("job_id")?)
    );

    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("maxResults", max_results(&input))
        .query_opt("pageToken", input.opt_str("page_token"))
        .query_opt("startIndex", input.opt_u64("start_index"));
    let response = ctx.fetch(request).await?;

    Ok(Value::Object(result_page(&response)))
}
