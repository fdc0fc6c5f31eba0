use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{ActionRegistry, ClientConfig, Credentials, ExecutionContext, HttpResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_bitly::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(Credentials::new().with("access_token", "bitly-token"))
        .with_config(ClientConfig::default().with_base_url("bitly", "http://bitly.test/v4"));
    (mock, registry, ctx)
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry.execute(&format!("bitly.{action}"), input, ctx.clone()).await
}

#[rstest]
#[case("https://bit.ly/3xYz")]
#[case("bit.ly/3xYz")]
#[case("3xYz")]
#[tokio::test]
async fn every_bitlink_form_hits_the_same_path(#[case] bitlink: &str) {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/bitlinks/bit.ly%2F3xYz", json!({"id": "bit.ly/3xYz", "link": "https://bit.ly/3xYz"}));

    let out = run(&registry, &ctx, "get_bitlink", json!({"bitlink": bitlink})).await;

    assert_eq!(out, json!({
        "result": true,
        "bitlink": {"id": "bit.ly/3xYz", "link": "https://bit.ly/3xYz"},
    }));
    assert_eq!(mock.last_request().unwrap().url, "http://bitly.test/v4/bitlinks/bit.ly%2F3xYz");
}

#[tokio::test]
async fn list_bitlinks_falls_back_to_default_group() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/groups/Ba1bc23dE4F/bitlinks", json!({
        "links": [{"id": "bit.ly/a"}],
        "pagination": {"total": 1, "page": 1, "size": 50, "next": "", "prev": ""}
    }));
    mock.respond_json("GET", "/user", json!({"login": "ana", "default_group_guid": "Ba1bc23dE4F"}));

    let out = run(&registry, &ctx, "list_bitlinks", json!({"size": 50, "archived": true})).await;

    assert_eq!(out, json!({
        "result": true,
        "bitlinks": [{"id": "bit.ly/a"}],
        "total": 1,
        "page": 1,
        "size": 50,
        "next": "",
        "prev": "",
    }));
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].get_query("size"), Some("50"));
    assert_eq!(requests[1].get_query("archived"), Some("on"));
    assert_eq!(requests[1].get_query("page"), None);
}

#[tokio::test]
async fn list_bitlinks_without_any_group_fails() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/user", json!({"login": "ana"}));

    let out = run(&registry, &ctx, "list_bitlinks", json!({})).await;

    assert_eq!(out, json!({
        "result": false,
        "error": "No default_group_guid found for user",
        "bitlinks": [],
    }));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn clicks_default_to_all_days() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/clicks/summary", json!({"total_clicks": 42, "unit": "day", "units": -1}));

    let out = run(&registry, &ctx, "get_clicks_summary", json!({"bitlink": "bit.ly/x"})).await;

    assert_eq!(out, json!({"result": true, "total_clicks": 42, "unit": "day", "units": -1}));
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.get_query("unit"), Some("day"));
    assert_eq!(sent.get_query("units"), Some("-1"));
}

#[tokio::test]
async fn create_bitlink_forwards_only_present_options() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/bitlinks", json!({"id": "bit.ly/launch"}));

    run(&registry, &ctx, "create_bitlink", json!({
        "long_url": "https://example.com/launch",
        "title": "Launch",
        "tags": [],
        "domain": "",
    }))
    .await;

    assert_eq!(
        mock.last_request().unwrap().json_body().unwrap(),
        &json!({"long_url": "https://example.com/launch", "title": "Launch"})
    );
}

#[tokio::test]
async fn update_bitlink_sends_explicit_empty_tags() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("PATCH", "/bitlinks/", json!({"id": "bit.ly/x", "tags": []}));

    run(&registry, &ctx, "update_bitlink", json!({"bitlink": "x", "tags": [], "archived": false})).await;

    assert_eq!(
        mock.last_request().unwrap().json_body().unwrap(),
        &json!({"tags": [], "archived": false})
    );
}

#[rstest]
#[case("shorten_url", json!({}), json!({"result": false, "error": "long_url is required", "bitlink": {}}))]
#[case("expand_bitlink", json!({}), json!({"result": false, "error": "bitlink is required", "long_url": ""}))]
#[case("get_clicks", json!({"bitlink": " "}), json!({"result": false, "error": "bitlink is required", "clicks": []}))]
#[case("get_group", json!({}), json!({"result": false, "error": "group_guid is required", "group": {}}))]
#[tokio::test]
async fn failures_carry_empty_payload_keys(
    #[case] action: &str,
    #[case] input: Value,
    #[case] expected: Value,
) {
    let (mock, registry, ctx) = harness();
    assert_eq!(run(&registry, &ctx, action, input).await, expected);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn vendor_errors_keep_payload_defaults() {
    let (mock, registry, ctx) = harness();
    mock.respond(
        "POST",
        "/expand",
        HttpResponse::new(404, json!({"message": "NOT_FOUND", "description": "The requested bitlink was not found"})),
    );

    let out = run(&registry, &ctx, "expand_bitlink", json!({"bitlink": "bit.ly/gone"})).await;

    assert_eq!(out, json!({"result": false, "error": "HTTP 404: NOT_FOUND", "long_url": ""}));
}
