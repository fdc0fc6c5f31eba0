//! # Nebula AWS
//!
//! Security and observability actions against AWS: Security Hub,
//! GuardDuty, CloudWatch, CloudWatch Logs and CloudTrail.
//!
//! Requests are signed with SigV4 from the `aws_access_key_id`,
//! `aws_secret_access_key` and optional `aws_session_token` credentials.
//! The region comes from `aws_region` (default `us-east-1`). Failures carry
//! the AWS error code:
//!
//! ```json
//! {"result": false, "error": "The security token included in the request is invalid.", "error_code": "UnrecognizedClientException"}
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod cloudtrail;
mod cloudwatch;
mod guardduty;
mod logs;
mod security_hub;

use nebula_action::{ActionMetadata, ActionRegistry, EnvelopeStyle};

/// Registry category for every AWS action.
pub const CATEGORY: &str = "aws";

fn meta(name: &str, description: &str) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(EnvelopeStyle::result().with_error_code())
        .with_required_credential("aws_access_key_id")
        .with_required_credential("aws_secret_access_key")
}

/// Register every AWS action.
pub fn register(registry: &mut ActionRegistry) {
    // Security Hub
    registry.register_async(
        meta("get_findings", "List and filter Security Hub findings"),
        security_hub::get_findings,
    );
    registry.register_async(
        meta("get_finding_details", "Fetch one Security Hub finding by ARN"),
        security_hub::get_finding_details,
    );
    registry.register_async(
        meta("update_finding_workflow", "Set the workflow status of Security Hub findings"),
        security_hub::update_finding_workflow,
    );
    registry.register_async(
        meta("get_insights", "List Security Hub insights with their results"),
        security_hub::get_insights,
    );

    // GuardDuty
    registry.register_async(
        meta("list_detectors", "List GuardDuty detector ids"),
        guardduty::list_detectors,
    );
    registry.register_async(
        meta("list_guardduty_findings", "List GuardDuty finding ids for a detector"),
        guardduty::list_guardduty_findings,
    );
    registry.register_async(
        meta("get_guardduty_finding_details", "Fetch GuardDuty findings by id"),
        guardduty::get_guardduty_finding_details,
    );
    registry.register_async(
        meta("archive_findings", "Archive GuardDuty findings"),
        guardduty::archive_findings,
    );

    // CloudWatch
    registry.register_async(
        meta("list_metrics", "List CloudWatch metrics"),
        cloudwatch::list_metrics,
    );
    registry.register_async(
        meta("get_metric_data", "Fetch CloudWatch metric data over a time range"),
        cloudwatch::get_metric_data,
    );
    registry.register_async(
        meta("describe_alarms", "List CloudWatch alarms"),
        cloudwatch::describe_alarms,
    );
    registry.register_async(
        meta("get_alarm_history", "Fetch CloudWatch alarm history"),
        cloudwatch::get_alarm_history,
    );
    registry.register_async(
        meta("set_alarm_state", "Temporarily set a CloudWatch alarm state"),
        cloudwatch::set_alarm_state,
    );

    // CloudWatch Logs
    registry.register_async(
        meta("describe_log_groups", "List CloudWatch Logs log groups"),
        logs::describe_log_groups,
    );
    registry.register_async(
        meta("filter_log_events", "Search log events across streams of a log group"),
        logs::filter_log_events,
    );
    registry.register_async(
        meta("get_log_events", "Read events from one log stream"),
        logs::get_log_events,
    );

    // CloudTrail
    registry.register_async(
        meta("lookup_events", "Search CloudTrail management events"),
        cloudtrail::lookup_events,
    );
    registry.register_async(
        meta("describe_trails", "List CloudTrail trails"),
        cloudtrail::describe_trails,
    );
    registry.register_async(
        meta("get_trail_status", "Fetch the logging status of a trail"),
        cloudtrail::get_trail_status,
    );
    registry.register_async(
        meta("get_event_selectors", "Fetch the event selectors of a trail"),
        cloudtrail::get_event_selectors,
    );
}
