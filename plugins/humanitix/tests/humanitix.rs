use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{ActionRegistry, Credentials, ExecutionContext, HttpResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_humanitix::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(Credentials::new().with("api_key", "hx-test-key"));
    (mock, registry, ctx)
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry
        .execute(&format!("humanitix.{action}"), input, ctx.clone())
        .await
}

#[tokio::test]
async fn check_in_returns_scanning_messages() {
    let (mock, registry, ctx) = harness();
    mock.respond_json(
        "POST",
        "/events/evt_001/tickets/tkt_001/check-in",
        json!({"scanningMessages": [{"header": "Welcome"}]}),
    );

    let out = run(&registry, &ctx, "check_in", json!({"event_id": "evt_001", "ticket_id": "tkt_001"})).await;

    assert_eq!(out, json!({"result": true, "scanningMessages": [{"header": "Welcome"}]}));
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.get_header("x-api-key"), Some("hx-test-key"));
    assert_eq!(sent.get_query("overrideLocation"), None);
}

#[tokio::test]
async fn check_out_defaults_missing_messages() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/check-out", json!({}));

    let out = run(
        &registry,
        &ctx,
        "check_out",
        json!({"event_id": "evt_001", "ticket_id": "tkt_001", "override_location": "AU"}),
    )
    .await;

    assert_eq!(out, json!({"result": true, "scanningMessages": []}));
    assert_eq!(mock.last_request().unwrap().get_query("overrideLocation"), Some("AU"));
}

#[rstest]
#[case("get_orders", json!({}), "event_id is required")]
#[case("get_tickets", json!({"event_id": "  "}), "event_id is required")]
#[case("check_in", json!({"event_id": "evt_001"}), "ticket_id is required")]
#[tokio::test]
async fn missing_required_field_never_dispatches(
    #[case] action: &str,
    #[case] input: Value,
    #[case] message: &str,
) {
    let (mock, registry, ctx) = harness();

    let out = run(&registry, &ctx, action, input).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["error"], json!(message));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn bare_list_is_paginated() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/events", json!([{"_id": "e1"}, {"_id": "e2"}]));

    let out = run(&registry, &ctx, "get_events", json!({"page": 3})).await;

    assert_eq!(
        out,
        json!({
            "result": true,
            "events": [{"_id": "e1"}, {"_id": "e2"}],
            "total": 2,
            "page": 3,
            "pageSize": 100
        })
    );
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.get_query("page"), Some("3"));
    assert_eq!(sent.get_query("pageSize"), None);
}

#[tokio::test]
async fn enveloped_page_keeps_vendor_metadata() {
    let (mock, registry, ctx) = harness();
    mock.respond_json(
        "GET",
        "/events/evt_001/tickets",
        json!({"tickets": [{"_id": "t1"}], "total": 40, "page": 2, "pageSize": 1}),
    );

    let out = run(
        &registry,
        &ctx,
        "get_tickets",
        json!({"event_id": "evt_001", "page": 2, "page_size": 1, "status": "complete"}),
    )
    .await;

    insta::assert_json_snapshot!(out, @r#"
    {
      "page": 2,
      "pageSize": 1,
      "result": true,
      "tickets": [
        {
          "_id": "t1"
        }
      ],
      "total": 40
    }
    "#);
    assert_eq!(mock.last_request().unwrap().get_query("status"), Some("complete"));
}

#[tokio::test]
async fn single_record_lookup() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/events/evt_001/orders/ord_9", json!({"_id": "ord_9", "total": 55}));

    let out = run(&registry, &ctx, "get_orders", json!({"event_id": "evt_001", "order_id": "ord_9"})).await;

    assert_eq!(out, json!({"result": true, "order": {"_id": "ord_9", "total": 55}}));
}

#[tokio::test]
async fn vendor_error_body_is_surfaced() {
    let (mock, registry, ctx) = harness();
    mock.respond(
        "GET",
        "/tags/missing",
        HttpResponse::new(
            404,
            json!({"statusCode": 404, "error": "Not Found", "message": "Tag not found"}),
        ),
    );

    let out = run(&registry, &ctx, "get_tags", json!({"tag_id": "missing"})).await;

    assert_eq!(
        out,
        json!({
            "result": false,
            "statusCode": 404,
            "error": "Not Found",
            "message": "Tag not found"
        })
    );
}

#[tokio::test]
async fn identical_reads_are_identical() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/tags", json!({"tags": [{"_id": "a"}], "total": 1}));

    let first = run(&registry, &ctx, "get_tags", json!({})).await;
    let second = run(&registry, &ctx, "get_tags", json!({})).await;

    assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
}
