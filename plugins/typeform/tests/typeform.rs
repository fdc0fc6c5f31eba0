use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{ActionRegistry, ClientConfig, Credentials, ExecutionContext, HttpResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_typeform::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(Credentials::new().with("access_token", "tf-token"))
        .with_config(ClientConfig::default().with_base_url("typeform", "http://typeform.test"));
    (mock, registry, ctx)
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry.execute(&format!("typeform.{action}"), input, ctx.clone()).await
}

fn too_many_requests(retry_after: &str) -> HttpResponse {
    HttpResponse::new(429, json!({"description": "Too many requests"})).with_header("Retry-After", retry_after)
}

#[test]
fn registers_every_action() {
    let mut registry = ActionRegistry::new();
    nebula_typeform::register(&mut registry);
    assert_eq!(registry.keys_in("typeform").len(), 24);
}

#[tokio::test]
async fn rate_limit_returns_advisory_with_vendor_wait() {
    let (mock, registry, ctx) = harness();
    mock.respond("GET", "/forms", too_many_requests("37"));

    let out = run(&registry, &ctx, "list_forms", json!({})).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["error_type"], json!("rate_limit"));
    assert_eq!(out["retry_after_seconds"], json!(37));
    assert_eq!(out["retry_attempt"], json!(0));
    assert_eq!(out["max_retries"], json!(3));
    assert_eq!(out["can_retry"], json!(true));
    assert_eq!(out["action"], json!("list_forms"));
    assert_eq!(out["forms"], json!([]));
    assert_eq!(out["total_items"], json!(0));
    assert_eq!(mock.request_count(), 1);
}

#[tokio::test]
async fn exhausted_retries_tell_the_caller_to_stop() {
    let (mock, registry, ctx) = harness();
    mock.respond("GET", "/forms/abc123", too_many_requests("60"));

    let out = run(&registry, &ctx, "get_form", json!({"form_id": "abc123", "_retry_attempt": 3})).await;

    assert_eq!(out["can_retry"], json!(false));
    assert_eq!(out["form"], json!({}));
    let instructions = out["retry_instructions"].as_str().unwrap();
    assert!(instructions.contains("Do not retry automatically."));
    assert!(out["error"].as_str().unwrap().contains("Typeform API"));
}

#[tokio::test]
async fn missing_retry_after_uses_default_wait() {
    let (mock, registry, ctx) = harness();
    mock.respond("GET", "/workspaces", HttpResponse::new(429, json!({})));

    let out = run(&registry, &ctx, "list_workspaces", json!({"_retry_attempt": 1})).await;

    assert_eq!(out["retry_after_seconds"], json!(60));
    assert_eq!(out["retry_attempt"], json!(1));
    assert_eq!(out["workspaces"], json!([]));
}

#[tokio::test]
async fn list_forms_clamps_page_size_and_forwards_filters() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/forms", json!({
        "items": [{"id": "f1", "title": "Survey"}],
        "total_items": 1,
        "page_count": 1
    }));

    let out = run(
        &registry,
        &ctx,
        "list_forms",
        json!({"page": 2, "page_size": 500, "search": "survey", "workspace_id": "ws1"}),
    )
    .await;

    assert_eq!(out, json!({
        "result": true,
        "forms": [{"id": "f1", "title": "Survey"}],
        "total_items": 1,
        "page_count": 1,
    }));
    let request = mock.last_request().unwrap();
    assert_eq!(request.get_header("Authorization"), Some("Bearer tf-token"));
    assert_eq!(request.get_query("page"), Some("2"));
    assert_eq!(request.get_query("page_size"), Some("200"));
    assert_eq!(request.get_query("search"), Some("survey"));
    assert_eq!(request.get_query("workspace_id"), Some("ws1"));
}

#[tokio::test]
async fn update_form_patches_then_reads_back() {
    let (mock, registry, ctx) = harness();
    mock.respond("PATCH", "/forms/abc123", HttpResponse::new(204, Value::Null));
    mock.respond_json("GET", "/forms/abc123", json!({"id": "abc123", "title": "Renamed"}));

    let out = run(
        &registry,
        &ctx,
        "update_form",
        json!({"form_id": "abc123", "title": "Renamed", "settings": {"is_public": false}}),
    )
    .await;

    assert_eq!(out, json!({"result": true, "form": {"id": "abc123", "title": "Renamed"}}));
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].json_body(),
        Some(&json!([
            {"op": "replace", "path": "/title", "value": "Renamed"},
            {"op": "replace", "path": "/settings/is_public", "value": false},
        ]))
    );
}

#[tokio::test]
async fn update_form_without_changes_is_rejected() {
    let (mock, registry, ctx) = harness();

    let out = run(&registry, &ctx, "update_form", json!({"form_id": "abc123"})).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["form"], json!({}));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn list_responses_joins_id_lists() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/forms/abc123/responses", json!({
        "items": [{"response_id": "r1"}],
        "total_items": 1,
        "page_count": 1
    }));

    let out = run(
        &registry,
        &ctx,
        "list_responses",
        json!({"form_id": "abc123", "included_response_ids": ["r1", "r2"], "completed": true}),
    )
    .await;

    assert_eq!(out["responses"], json!([{"response_id": "r1"}]));
    let request = mock.last_request().unwrap();
    assert_eq!(request.get_query("included_response_ids"), Some("r1,r2"));
    assert_eq!(request.get_query("completed"), Some("true"));
}

#[tokio::test]
async fn delete_responses_accepts_a_comma_string() {
    let (mock, registry, ctx) = harness();
    mock.respond("DELETE", "/forms/abc123/responses", HttpResponse::new(200, Value::Null));

    let out = run(
        &registry,
        &ctx,
        "delete_responses",
        json!({"form_id": "abc123", "included_response_ids": "r1,r2"}),
    )
    .await;

    assert_eq!(out, json!({"result": true, "deleted": true, "deleted_response_ids": ["r1", "r2"]}));
}

#[tokio::test]
async fn bare_image_list_is_wrapped() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/images", json!([{"id": "img1"}, {"id": "img2"}]));

    let out = run(&registry, &ctx, "list_images", json!({})).await;

    assert_eq!(out, json!({"result": true, "images": [{"id": "img1"}, {"id": "img2"}]}));
}

#[tokio::test]
async fn create_webhook_puts_to_the_tag() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("PUT", "/forms/abc123/webhooks/crm", json!({"tag": "crm", "enabled": true}));

    let out = run(
        &registry,
        &ctx,
        "create_webhook",
        json!({"form_id": "abc123", "tag": "crm", "url": "https://hooks.example.com/tf", "secret": "s3"}),
    )
    .await;

    assert_eq!(out, json!({"result": true, "webhook": {"tag": "crm", "enabled": true}}));
    assert_eq!(
        mock.last_request().unwrap().json_body(),
        Some(&json!({"url": "https://hooks.example.com/tf", "enabled": true, "secret": "s3"}))
    );
}

#[rstest]
#[case("get_form", json!({"form_id": "../admin"}), "form_id contains invalid characters")]
#[case("delete_workspace", json!({}), "workspace_id is required")]
#[case("create_webhook", json!({"form_id": "f", "tag": "t", "url": "http://insecure"}), "url must be an HTTPS URL")]
#[case("create_workspace", json!({}), "name is required")]
#[tokio::test]
async fn invalid_input_never_reaches_the_api(
    #[case] action: &str,
    #[case] input: Value,
    #[case] error: &str,
) {
    let (mock, registry, ctx) = harness();

    let out = run(&registry, &ctx, action, input).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["error"], json!(error));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn delete_form_reports_deleted() {
    let (mock, registry, ctx) = harness();
    mock.respond("DELETE", "/forms/abc123", HttpResponse::new(204, Value::Null));

    let out = run(&registry, &ctx, "delete_form", json!({"form_id": "abc123"})).await;

    assert_eq!(out, json!({"result": true, "deleted": true}));
}
