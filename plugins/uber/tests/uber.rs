use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{ActionRegistry, ClientConfig, Credentials, ExecutionContext, HttpResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_uber::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(Credentials::new().with("access_token", "uber-token"))
        .with_config(ClientConfig::default().with_base_url("uber", "http://uber.test"));
    (mock, registry, ctx)
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry.execute(&format!("uber.{action}"), input, ctx.clone()).await
}

fn trip() -> Value {
    json!({
        "product_id": "a1111c8c-c720-46c3-8534-2fcdd730040d",
        "start_latitude": 37.7752,
        "start_longitude": -122.418,
        "end_latitude": 37.7899,
        "end_longitude": -122.4016,
    })
}

#[tokio::test]
async fn out_of_range_latitude_never_calls_the_api() {
    let (mock, registry, ctx) = harness();

    let out = run(&registry, &ctx, "get_products", json!({"latitude": 95, "longitude": 10})).await;

    assert_eq!(out, json!({
        "result": false,
        "error": "latitude must be between -90 and 90",
        "error_type": "validation_error",
    }));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn products_are_listed_for_a_location() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/v1.2/products", json!({"products": [{"display_name": "UberX"}]}));

    let out = run(&registry, &ctx, "get_products", json!({"latitude": 37.7752, "longitude": -122.418})).await;

    assert_eq!(out, json!({"result": true, "products": [{"display_name": "UberX"}]}));
    let request = mock.last_request().unwrap();
    assert_eq!(request.url, "http://uber.test/v1.2/products");
    assert_eq!(request.get_query("latitude"), Some("37.7752"));
    assert_eq!(request.get_header("Accept-Language"), Some("en_US"));
    assert_eq!(request.get_header("Authorization"), Some("Bearer uber-token"));
}

#[rstest]
#[case(5, 2)]
#[case(0, 1)]
#[tokio::test]
async fn seat_count_is_clamped_in_the_body(#[case] requested: i64, #[case] sent: i64) {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/v1.2/requests/estimate", json!({"fare": {"value": 5.73}}));
    let mut input = trip();
    input["seat_count"] = json!(requested);

    let out = run(&registry, &ctx, "get_ride_estimate", input).await;

    assert_eq!(out["result"], json!(true));
    assert_eq!(out["estimate"], json!({"fare": {"value": 5.73}}));
    let body = mock.last_request().unwrap().json_body().cloned().unwrap();
    assert_eq!(body["seat_count"], json!(sent));
}

#[tokio::test]
async fn request_ride_trims_optional_fields() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/v1.2/requests", json!({
        "request_id": "852b8fdd",
        "status": "processing",
        "eta": 5,
        "surge_multiplier": 1.0
    }));
    let mut input = trip();
    input["start_address"] = json!("  1 Market St  ");
    input["end_nickname"] = json!("   ");

    let out = run(&registry, &ctx, "request_ride", input).await;

    assert_eq!(out, json!({
        "result": true,
        "request_id": "852b8fdd",
        "status": "processing",
        "eta": 5,
        "surge_multiplier": 1.0,
        "driver": null,
        "vehicle": null,
    }));
    let body = mock.last_request().unwrap().json_body().cloned().unwrap();
    assert_eq!(body["start_address"], json!("1 Market St"));
    assert!(body.get("end_nickname").is_none());
    assert!(body.get("seat_count").is_none());
}

#[rstest]
#[case("get_ride_status", json!({"request_id": "../me"}), "request_id contains invalid characters")]
#[case("cancel_ride", json!({}), "request_id is required")]
#[case("get_price_estimate", json!({"start_latitude": 1, "start_longitude": 1}), "end_latitude and longitude are required")]
#[case("get_ride_estimate", json!({"product_id": "p", "start_latitude": 1, "start_longitude": 1, "end_latitude": 1, "end_longitude": 1, "seat_count": "two"}), "seat_count must be an integer (1 or 2)")]
#[case("link_loyalty_account", json!({"partner_id": "acme"}), "member_id is required")]
#[tokio::test]
async fn invalid_input_is_a_validation_error(#[case] action: &str, #[case] input: Value, #[case] error: &str) {
    let (mock, registry, ctx) = harness();

    let out = run(&registry, &ctx, action, input).await;

    assert_eq!(out["error"], json!(error));
    assert_eq!(out["error_type"], json!("validation_error"));
    assert_eq!(mock.request_count(), 0);
}

#[rstest]
#[case(401, "auth_error")]
#[case(404, "not_found")]
#[case(503, "server_error")]
#[tokio::test]
async fn api_failures_are_classified_and_prefixed(#[case] status: u16, #[case] error_type: &str) {
    let (mock, registry, ctx) = harness();
    mock.respond("GET", "/v1.2/me", HttpResponse::new(status, json!({"message": "nope"})));

    let out = run(&registry, &ctx, "get_user_profile", json!({})).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["error_type"], json!(error_type));
    assert_eq!(
        out["error"],
        json!(format!("Uber API error in get_user_profile: HTTP {status}: nope"))
    );
}

#[tokio::test]
async fn rate_limit_yields_an_advisory() {
    let (mock, registry, ctx) = harness();
    mock.respond(
        "GET",
        "/v1.2/history",
        HttpResponse::new(429, json!({"message": "slow down"})).with_header("Retry-After", "12"),
    );

    let out = run(&registry, &ctx, "get_ride_history", json!({"_retry_attempt": 2})).await;

    assert_eq!(out["error_type"], json!("rate_limit"));
    assert_eq!(out["retry_after_seconds"], json!(12));
    assert_eq!(out["retry_attempt"], json!(2));
    assert_eq!(out["can_retry"], json!(true));
    assert_eq!(out["action"], json!("get_ride_history"));
}

#[tokio::test]
async fn history_clamps_limit_and_skips_zero_offset() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/v1.2/history", json!({"history": [{"uuid": "h1"}], "count": 31}));

    let out = run(&registry, &ctx, "get_ride_history", json!({"limit": 120, "offset": 0})).await;

    assert_eq!(out, json!({"result": true, "history": [{"uuid": "h1"}], "count": 31}));
    let request = mock.last_request().unwrap();
    assert_eq!(request.get_query("limit"), Some("50"));
    assert_eq!(request.get_query("offset"), None);
}

#[rstest]
#[case(json!({"offset": 20}), Some("20"))]
#[case(json!({"offset": -4}), None)]
#[case(json!({"offset": "20"}), None)]
#[tokio::test]
async fn history_offset_is_sent_only_when_positive(#[case] input: Value, #[case] expected: Option<&str>) {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/v1.2/history", json!({"history": [], "count": 0}));

    let out = run(&registry, &ctx, "get_ride_history", input).await;

    assert_eq!(out["result"], json!(true));
    let request = mock.last_request().unwrap();
    assert_eq!(request.get_query("limit"), Some("10"));
    assert_eq!(request.get_query("offset"), expected);
}

#[tokio::test]
async fn cancel_ride_is_a_bare_success() {
    let (mock, registry, ctx) = harness();
    mock.respond("DELETE", "/v1.2/requests/852b8fdd", HttpResponse::new(204, Value::Null));

    let out = run(&registry, &ctx, "cancel_ride", json!({"request_id": "852b8fdd"})).await;

    assert_eq!(out, json!({"result": true}));
}

#[tokio::test]
async fn loyalty_uses_the_v1_prefix() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/v1/partner-loyalty/flight-booking-data", json!({"status": "ok"}));

    let out = run(
        &registry,
        &ctx,
        "submit_flight_booking_data",
        json!({"partner_id": "air-nz", "booking_id": " BK12 ", "flight_number": "NZ101"}),
    )
    .await;

    assert_eq!(out, json!({"result": true, "submitted": true, "response": {"status": "ok"}}));
    assert_eq!(
        mock.last_request().unwrap().json_body(),
        Some(&json!({"partner_id": "air-nz", "booking_id": "BK12", "flight_number": "NZ101"}))
    );
}
