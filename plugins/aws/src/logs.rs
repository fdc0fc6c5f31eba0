//! CloudWatch Logs queries.

use nebula_action::prelude::*;

use crate::client::{AwsClient, Body, LOGS, epoch_millis, field, list};

pub(crate) async fn describe_log_groups(
    input: ActionInput,
    ctx: ExecutionContext,
) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &LOGS)?;
    let body = Body::new()
        .set("limit", input.i64_or("limit", 50))
        .opt("logGroupNamePrefix", input.opt_str("log_group_name_prefix"))
        .opt("nextToken", input.opt_str("next_token"))
        .build();

    let response = client.call("DescribeLogGroups", body).await?;
    Ok(json!({
        "log_groups": list(&response, "logGroups"),
        "next_token": field(&response, "nextToken"),
    }))
}

pub(crate) async fn filter_log_events(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = Body::new()
        .set("logGroupName", input.require_str("log_group_name")?)
        .set("limit", input.i64_or("limit", 50))
        .opt("logStreamNames", input.non_empty("log_stream_names").cloned())
        .opt("filterPattern", input.opt_str("filter_pattern"))
        .opt("startTime", epoch_millis(&input, "start_time")?)
        .opt("endTime", epoch_millis(&input, "end_time")?)
        .opt("nextToken", input.opt_str("next_token"))
        .build();

    let client = AwsClient::new(&ctx, &LOGS)?;
    let response = client.call("FilterLogEvents", body).await?;
    Ok(json!({
        "events": list(&response, "events"),
        "searched_log_streams": list(&response, "searchedLogStreams"),
        "next_token": field(&response, "nextToken"),
    }))
}

pub(crate) async fn get_log_events(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = Body::new()
        .set("logGroupName", input.require_str("log_group_name")?)
        .set("logStreamName", input.require_str("log_stream_name")?)
        .set("limit", input.i64_or("limit", 50))
        .set("startFromHead", input.bool_or("start_from_head", true))
        .opt("startTime", epoch_millis(&input, "start_time")?)
        .opt("endTime", epoch_millis(&input, "end_time")?)
        .opt("nextToken", input.opt_str("next_token"))
        .build();

    let client = AwsClient::new(&ctx, &LOGS)?;
    let response = client.call("GetLogEvents", body).await?;
    Ok(json!({
        "events": list(&response, "events"),
        "next_forward_token": field(&response, "nextForwardToken"),
        "next_backward_token": field(&response, "nextBackwardToken"),
    }))
}
