//! Jobs and projects.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, field, max_results, with_next_page};

pub(crate) async fn list_jobs(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!("{}/jobs", client::project_path(&input)?);
    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("maxResults", max_results(&input))
        .query_opt("pageToken", input.opt_str("page_token"))
        .query_opt("allUsers", input.bool_or("all_users", false).then_some("true"))
        .query_opt("stateFilter", input.opt_str("state_filter"))
        .query_opt("minCreationTime", input.opt_i64("min_creation_time").filter(|t| *t > 0))
        .query_opt("maxCreationTime", input.opt_i64("max_creation_time").filter(|t| *t > 0));
    let response = ctx.fetch(request).await?;

    let jobs: Vec<Value> = response
        .get("jobs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|job| {
            let at = |ptr: &str| job.pointer(ptr).cloned().unwrap_or(Value::Null);
            json!({
                "id": field(job, "id"),
                "job_id": at("/jobReference/jobId"),
                "project_id": at("/jobReference/projectId"),
                "location": at("/jobReference/location"),
                "state": at("/status/state"),
                "error_result": at("/status/errorResult"),
                "creation_time": at("/statistics/creationTime"),
                "start_time": at("/statistics/startTime"),
                "end_time": at("/statistics/endTime"),
                "total_bytes_processed": at("/statistics/totalBytesProcessed"),
                "user_email": field(job, "user_email"),
            })
        })
        .collect();

    Ok(with_next_page(json!({ "jobs": jobs }), &response))
}

pub(crate) async fn get_job(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = format!(
        "{}/jobs/{}",
        client::project_path(&input)?,
        encode_segment(input.require_str("job_id")?)
    );
    let request = client::request(&ctx, RequestMethod::Get, &path)?
        .query_opt("location", input.opt_str("location"));
    let job = ctx.fetch(request).await?;

    let at = |ptr: &str| job.pointer(ptr).cloned().unwrap_or(Value::Null);
    Ok(json!({
        "job": {
            "id": field(&job, "id"),
            "job_id": at("/jobReference/jobId"),
            "project_id": at("/jobReference/projectId"),
            "location": at("/jobReference/location"),
            "state": at("/status/state"),
            "error_result": at("/status/errorResult"),
            "errors": job.pointer("/status/errors").cloned().unwrap_or_else(|| json!([])),
            "creation_time": at("/statistics/creationTime"),
            "start_time": at("/statistics/startTime"),
            "end_time": at("/statistics/endTime"),
            "total_bytes_processed": at("/statistics/totalBytesProcessed"),
            "total_bytes_billed": at("/statistics/query/totalBytesBilled"),
            "cache_hit": at("/statistics/query/cacheHit"),
            "configuration": job.get("configuration").cloned().unwrap_or_else(|| json!({})),
            "user_email": field(&job, "user_email"),
        }
    }))
}

pub(crate) async fn list_projects(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let request = client::request(&ctx, RequestMethod::Get, "projects")?
        .query_opt("maxResults", max_results(&input))
        .query_opt("pageToken", input.opt_str("page_token"));
    let response = ctx.fetch(request).await?;

    let projects: Vec<Value> = response
        .get("projects")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|p| {
            json!({
                "id": field(p, "id"),
                "project_id": p.pointer("/projectReference/projectId").cloned().unwrap_or(Value::Null),
                "numeric_id": field(p, "numericId"),
                "friendly_name": field(p, "friendlyName"),
            })
        })
        .collect();

    Ok(with_next_page(json!({ "projects": projects }), &response))
}
