//! CloudTrail event history and trail configuration.

use nebula_action::prelude::*;

use crate::client::{AwsClient, Body, CLOUDTRAIL, epoch_seconds, field, list};

fn lookup_attributes(input: &ActionInput) -> Result<Option<Value>, ActionError> {
    let Some(attrs) = input.non_empty("lookup_attributes").and_then(Value::as_array) else {
        return Ok(None);
    };
    attrs
        .iter()
        .map(|attr| {
            let key = attr.get("attribute_key").and_then(Value::as_str);
            let value = attr.get("attribute_value").and_then(Value::as_str);
            match (key, value) {
                (Some(k), Some(v)) => Ok(json!({"AttributeKey": k, "AttributeValue": v})),
                _ => Err(ActionError::validation(
                    "lookup_attributes entries need attribute_key and attribute_value",
                )),
            }
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|attrs| Some(Value::Array(attrs)))
}

pub(crate) async fn lookup_events(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = Body::new()
        .set("MaxResults", input.i64_or("max_results", 50))
        .opt("LookupAttributes", lookup_attributes(&input)?)
        .opt("StartTime", epoch_seconds(&input, "start_time")?)
        .opt("EndTime", epoch_seconds(&input, "end_time")?)
        .opt("NextToken", input.opt_str("next_token"))
        .build();

    let client = AwsClient::new(&ctx, &CLOUDTRAIL)?;
    let response = client.call("LookupEvents", body).await?;
    Ok(json!({
        "events": list(&response, "Events"),
        "next_token": field(&response, "NextToken"),
    }))
}

pub(crate) async fn describe_trails(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = Body::new()
        .opt("trailNameList", input.non_empty("trail_name_list").cloned())
        .set("includeShadowTrails", input.bool_or("include_shadow_trails", true))
        .build();

    let client = AwsClient::new(&ctx, &CLOUDTRAIL)?;
    let response = client.call("DescribeTrails", body).await?;
    Ok(json!({ "trails": list(&response, "trailList") }))
}

pub(crate) async fn get_trail_status(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = json!({ "Name": input.require_str("trail_name")? });

    let client = AwsClient::new(&ctx, &CLOUDTRAIL)?;
    let mut status = client.call("GetTrailStatus", body).await?;
    if let Some(map) = status.as_object_mut() {
        map.remove("ResponseMetadata");
    }
    Ok(json!({ "trail_status": status }))
}

pub(crate) async fn get_event_selectors(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let body = json!({ "TrailName": input.require_str("trail_name")? });

    let client = AwsClient::new(&ctx, &CLOUDTRAIL)?;
    let response = client.call("GetEventSelectors", body).await?;
    Ok(json!({
        "trail_arn": field(&response, "TrailARN"),
        "event_selectors": list(&response, "EventSelectors"),
        "advanced_event_selectors": list(&response, "AdvancedEventSelectors"),
    }))
}
