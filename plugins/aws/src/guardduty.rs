//! GuardDuty detectors and findings.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{AwsClient, Body, GUARDDUTY, field, list};

fn finding_ids(input: &ActionInput) -> Result<Value, ActionError> {
    input.require_array("finding_ids").cloned().map(Value::Array)
}

fn detector_path(input: &ActionInput, suffix: &str) -> Result<String, ActionError> {
    let detector = input.require_str("detector_id")?;
    Ok(format!("/detector/{}{suffix}", encode_segment(detector)))
}

pub(crate) async fn list_detectors(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &GUARDDUTY)?;
    let mut query = vec![("maxResults", input.i64_or("max_results", 50).to_string())];
    if let Some(token) = input.opt_str("next_token") {
        query.push(("nextToken", token.to_string()));
    }

    let response = client.rest(RequestMethod::Get, "/detector", &query, None).await?;
    Ok(json!({
        "detector_ids": list(&response, "detectorIds"),
        "next_token": field(&response, "nextToken"),
    }))
}

pub(crate) async fn list_guardduty_findings(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let path = detector_path(&input, "/findings")?;
    let client = AwsClient::new(&ctx, &GUARDDUTY)?;
    let body = Body::new()
        .set("maxResults", input.i64_or("max_results", 50))
        .opt("findingCriteria", input.non_empty("finding_criteria").cloned())
        .opt("sortCriteria", input.non_empty("sort_criteria").cloned())
        .opt("nextToken", input.opt_str("next_token"))
        .build();

    let response = client.rest(RequestMethod::Post, &path, &[], Some(body)).await?;
    Ok(json!({
        "finding_ids": list(&response, "findingIds"),
        "next_token": field(&response, "nextToken"),
    }))
}

pub(crate) async fn get_guardduty_finding_details(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let path = detector_path(&input, "/findings/get")?;
    let ids = finding_ids(&input)?;
    let client = AwsClient::new(&ctx, &GUARDDUTY)?;

    let response = client
        .rest(RequestMethod::Post, &path, &[], Some(json!({ "findingIds": ids })))
        .await?;
    Ok(json!({ "findings": list(&response, "findings") }))
}

pub(crate) async fn archive_findings(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let path = detector_path(&input, "/findings/archive")?;
    let ids = finding_ids(&input)?;
    let client = AwsClient::new(&ctx, &GUARDDUTY)?;

    client
        .rest(RequestMethod::Post, &path, &[], Some(json!({ "findingIds": ids })))
        .await?;
    Ok(json!({ "success": true }))
}
