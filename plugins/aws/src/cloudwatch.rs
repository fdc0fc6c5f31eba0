//! CloudWatch metrics and alarms.

use nebula_action::prelude::*;

use crate::client::{AwsClient, Body, CLOUDWATCH, epoch_seconds, field, list};

pub(crate) async fn list_metrics(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &CLOUDWATCH)?;
    let body = Body::new()
        .opt("Namespace", input.opt_str("namespace"))
        .opt("MetricName", input.opt_str("metric_name"))
        .opt("Dimensions", input.non_empty("dimensions").cloned())
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let response = client.call("ListMetrics", body).await?;
    Ok(json!({
        "metrics": list(&response, "Metrics"),
        "next_token": field(&response, "NextToken"),
    }))
}

pub(crate) async fn get_metric_data(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let queries = input.require_array("metric_data_queries")?.clone();
    input.require_str("start_time")?;
    input.require_str("end_time")?;
    let body = Body::new()
        .set("MetricDataQueries", queries)
        .opt("StartTime", epoch_seconds(&input, "start_time")?)
        .opt("EndTime", epoch_seconds(&input, "end_time")?)
        .build();

    let client = AwsClient::new(&ctx, &CLOUDWATCH)?;
    let response = client.call("GetMetricData", body).await?;
    Ok(json!({ "metric_data_results": list(&response, "MetricDataResults") }))
}

pub(crate) async fn describe_alarms(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let client = AwsClient::new(&ctx, &CLOUDWATCH)?;
    let body = Body::new()
        .set("MaxRecords", input.i64_or("max_records", 50))
        .opt("AlarmNames", input.non_empty("alarm_names").cloned())
        .opt("AlarmNamePrefix", input.opt_str("alarm_name_prefix"))
        .opt("StateValue", input.opt_str("state_value"))
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let response = client.call("DescribeAlarms", body).await?;
    Ok(json!({
        "metric_alarms": list(&response, "MetricAlarms"),
        "composite_alarms": list(&response, "CompositeAlarms"),
        "next_token": field(&response, "NextToken"),
    }))
}

pub(crate) async fn get_alarm_history(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = Body::new()
        .set("MaxRecords", input.i64_or("max_records", 50))
        .opt("AlarmName", input.opt_str("alarm_name"))
        .opt("AlarmTypes", input.non_empty("alarm_types").cloned())
        .opt("HistoryItemType", input.opt_str("history_item_type"))
        .opt("StartDate", epoch_seconds(&input, "start_date")?)
        .opt("EndDate", epoch_seconds(&input, "end_date")?)
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let client = AwsClient::new(&ctx, &CLOUDWATCH)?;
    let response = client.call("DescribeAlarmHistory", body).await?;
    Ok(json!({
        "alarm_history_items": list(&response, "AlarmHistoryItems"),
        "next_token": field(&response, "NextToken"),
    }))
}

pub(crate) async fn set_alarm_state(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = json!({
        "AlarmName": input.require_str("alarm_name")?,
        "StateValue": input.require_str("state_value")?,
        "StateReason": input.require_str("state_reason")?,
    });

    let client = AwsClient::new(&ctx, &CLOUDWATCH)?;
    client.call("SetAlarmState", body).await?;
    Ok(json!({ "success": true }))
}
