//! Security Hub findings and insights.

use std::collections::HashSet;

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{AwsClient, Body, SECURITY_HUB, field, list};

/// `UpdatedBy` stamped on workflow notes.
const NOTE_AUTHOR: &str = "nebula-integration";

async fn get_findings_page(client: &AwsClient<'_>, body: Value) -> Result<Value, ActionError> {
    client
        .rest(RequestMethod::Post, "/findings", &[], Some(body))
        .await
}

fn id_filter<'a>(arns: impl IntoIterator<Item = &'a str>) -> Value {
    let ids: Vec<Value> = arns
        .into_iter()
        .map(|arn| json!({"Value": arn, "Comparison": "EQUALS"}))
        .collect();
    json!({ "Id": ids })
}

pub(crate) async fn get_findings(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &SECURITY_HUB)?;
    let body = Body::new()
        .set("MaxResults", input.i64_or("max_results", 20))
        .opt("Filters", input.non_empty("filters").cloned())
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let response = get_findings_page(&client, body).await?;
    Ok(json!({
        "findings": list(&response, "Findings"),
        "next_token": field(&response, "NextToken"),
    }))
}

pub(crate) async fn get_finding_details(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let arn = input.require_str("finding_arn")?;
    let client = AwsClient::new(&ctx, &SECURITY_HUB)?;
    let body = json!({ "Filters": id_filter([arn]), "MaxResults": 1 });

    let response = get_findings_page(&client, body).await?;
    let finding = response
        .get("Findings")
        .and_then(Value::as_array)
        .and_then(|f| f.first())
        .cloned()
        .unwrap_or(Value::Null);
    Ok(json!({ "finding": finding }))
}

fn not_found(arn: &str) -> Value {
    json!({
        "FindingIdentifier": {"Id": arn},
        "ErrorCode": "FindingNotFound",
        "ErrorMessage": "Finding not found",
    })
}

/// Look up each ARN's product, then batch-update the workflow status.
///
/// ARNs the lookup does not return are reported as `FindingNotFound` in
/// `unprocessed_findings`; when none match, no update is sent.
pub(crate) async fn update_finding_workflow(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let arns: Vec<String> = input
        .require_array("finding_arns")?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect();
    if arns.is_empty() {
        return Err(ActionError::validation("finding_arns must contain strings"));
    }
    let status = input.require_str("workflow_status")?;
    let client = AwsClient::new(&ctx, &SECURITY_HUB)?;

    let lookup = json!({
        "Filters": id_filter(arns.iter().map(String::as_str)),
        "MaxResults": arns.len(),
    });
    let found = get_findings_page(&client, lookup).await?;
    let identifiers: Vec<Value> = found
        .get("Findings")
        .and_then(Value::as_array)
        .map(|findings| {
            findings
                .iter()
                .filter_map(|f| Some(json!({"Id": f.get("Id")?, "ProductArn": f.get("ProductArn")?})))
                .collect()
        })
        .unwrap_or_default();

    let matched: HashSet<&str> = identifiers
        .iter()
        .filter_map(|i| i.get("Id").and_then(Value::as_str))
        .collect();
    let missing: Vec<Value> = arns
        .iter()
        .filter(|arn| !matched.contains(arn.as_str()))
        .map(|arn| not_found(arn))
        .collect();

    if identifiers.is_empty() {
        tracing::warn!(count = arns.len(), "no findings matched the supplied ARNs");
        return Ok(json!({
            "processed_findings": [],
            "unprocessed_findings": missing,
        }));
    }

    let body = Body::new()
        .set("FindingIdentifiers", identifiers)
        .set("Workflow", json!({ "Status": status }))
        .opt(
            "Note",
            input
                .opt_str("note")
                .map(|text| json!({"Text": text, "UpdatedBy": NOTE_AUTHOR})),
        )
        .build();
    let response = client
        .rest(RequestMethod::Patch, "/findings/batchupdate", &[], Some(body))
        .await?;

    let mut unprocessed = missing;
    if let Some(Value::Array(rejected)) = response.get("UnprocessedFindings") {
        unprocessed.extend(rejected.iter().cloned());
    }
    Ok(json!({
        "processed_findings": list(&response, "ProcessedFindings"),
        "unprocessed_findings": unprocessed,
    }))
}

/// List insights and attach each one's results. A failed result fetch
/// leaves that insight's `results` as `null`.
pub(crate) async fn get_insights(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &SECURITY_HUB)?;
    let body = Body::new()
        .set("MaxResults", input.i64_or("max_results", 20))
        .opt("InsightArns", input.non_empty("insight_arns").cloned())
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let response = client
        .rest(RequestMethod::Post, "/insights/get", &[], Some(body))
        .await?;

    let mut insights = Vec::new();
    for insight in response
        .get("Insights")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
    {
        let arn = insight.get("InsightArn").and_then(Value::as_str);
        let results = match arn {
            Some(arn) => {
                let path = format!("/insights/results/{}", encode_segment_keep(arn, ":/"));
                match client.rest(RequestMethod::Get, &path, &[], None).await {
                    Ok(body) => body.get("InsightResults").cloned().unwrap_or_else(|| json!({})),
                    Err(err) => {
                        tracing::warn!(insight = arn, error = %err, "insight results unavailable");
                        Value::Null
                    }
                }
            }
            None => Value::Null,
        };

        insights.push(json!({
            "insight_arn": field(insight, "InsightArn"),
            "name": field(insight, "Name"),
            "filters": field(insight, "Filters"),
            "group_by_attribute": field(insight, "GroupByAttribute"),
            "results": results,
        }));
    }

    Ok(json!({
        "insights": insights,
        "next_token": field(&response, "NextToken"),
    }))
}
