use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{ActionRegistry, ClientConfig, Credentials, ExecutionContext, HttpResponse};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness_with(credentials: Credentials) -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_whatsapp::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(credentials)
        .with_config(ClientConfig::default().with_base_url("whatsapp", "http://graph.test/v18.0"));
    (mock, registry, ctx)
}

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    harness_with(Credentials::new().with("access_token", "wa-token"))
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry.execute(&format!("whatsapp.{action}"), input, ctx.clone()).await
}

fn accepted() -> Value {
    json!({"messaging_product": "whatsapp", "messages": [{"id": "wamid.HBgL"}]})
}

#[tokio::test]
async fn text_message_strips_plus_from_recipient() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/1065/messages", accepted());

    let out = run(
        &registry,
        &ctx,
        "send_message",
        json!({"to": "+14155552671", "message": "Hi", "phone_number_id": "1065"}),
    )
    .await;

    assert_eq!(out, json!({"success": true, "message_id": "wamid.HBgL"}));
    let request = mock.last_request().unwrap();
    assert_eq!(request.url, "http://graph.test/v18.0/1065/messages");
    assert_eq!(request.get_header("Authorization"), Some("Bearer wa-token"));
    assert_eq!(
        request.json_body(),
        Some(&json!({
            "messaging_product": "whatsapp",
            "to": "14155552671",
            "type": "text",
            "text": {"body": "Hi"},
        }))
    );
}

#[tokio::test]
async fn invalid_phone_is_rejected_before_sending() {
    let (mock, registry, ctx) = harness();

    let out = run(
        &registry,
        &ctx,
        "send_message",
        json!({"to": "4155552671", "message": "Hi", "phone_number_id": "1065"}),
    )
    .await;

    assert_eq!(out, json!({
        "success": false,
        "message_id": "",
        "error": "Invalid phone number format. Use format: +1234567890",
    }));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn template_parameters_become_body_components() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/messages", accepted());

    run(
        &registry,
        &ctx,
        "send_template_message",
        json!({
            "to": "+64211234567",
            "template_name": "order_update",
            "phone_number_id": "1065",
            "parameters": ["Ana", "#4471"],
        }),
    )
    .await;

    let body = mock.last_request().unwrap().json_body().cloned().unwrap();
    assert_eq!(
        body["template"],
        json!({
            "name": "order_update",
            "language": {"code": "en"},
            "components": [{
                "type": "body",
                "parameters": [{"type": "text", "text": "Ana"}, {"type": "text", "text": "#4471"}],
            }],
        })
    );
}

#[rstest]
#[case("document", json!({"link": "https://cdn.example.com/a.pdf", "filename": "a.pdf", "caption": "Invoice"}))]
#[case("image", json!({"link": "https://cdn.example.com/a.pdf", "caption": "Invoice"}))]
#[case("audio", json!({"link": "https://cdn.example.com/a.pdf"}))]
#[tokio::test]
async fn media_object_depends_on_type(#[case] media_type: &str, #[case] expected: Value) {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/messages", accepted());

    let out = run(
        &registry,
        &ctx,
        "send_media_message",
        json!({
            "to": "+14155552671",
            "phone_number_id": "1065",
            "media_type": media_type,
            "media_url": "https://cdn.example.com/a.pdf",
            "caption": "Invoice",
            "filename": "a.pdf",
        }),
    )
    .await;

    assert_eq!(out["success"], json!(true));
    let body = mock.last_request().unwrap().json_body().cloned().unwrap();
    assert_eq!(body[media_type], expected);
}

#[tokio::test]
async fn plain_http_media_is_rejected() {
    let (mock, registry, ctx) = harness();

    let out = run(
        &registry,
        &ctx,
        "send_media_message",
        json!({
            "to": "+14155552671",
            "phone_number_id": "1065",
            "media_type": "image",
            "media_url": "http://cdn.example.com/a.png",
        }),
    )
    .await;

    assert_eq!(out["error"], json!("Invalid media URL. Must be a publicly accessible HTTPS URL."));
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn transport_failures_are_prefixed() {
    let (mock, registry, ctx) = harness();
    mock.respond(
        "POST",
        "/messages",
        HttpResponse::new(401, json!({"error": {"message": "Invalid OAuth access token"}})),
    );

    let out = run(
        &registry,
        &ctx,
        "send_message",
        json!({"to": "+14155552671", "message": "Hi", "phone_number_id": "1065"}),
    )
    .await;

    assert_eq!(out, json!({
        "success": false,
        "message_id": "",
        "error": "Failed to send message: HTTP 401: Invalid OAuth access token",
    }));
}

#[tokio::test]
async fn missing_message_id_reports_graph_error() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/messages", json!({"error": {"message": "Recipient not on WhatsApp"}}));

    let out = run(
        &registry,
        &ctx,
        "send_message",
        json!({"to": "+14155552671", "message": "Hi", "phone_number_id": "1065"}),
    )
    .await;

    assert_eq!(out["success"], json!(false));
    assert_eq!(out["error"], json!("Recipient not on WhatsApp"));
    assert_eq!(out["message_id"], json!(""));
}

#[tokio::test]
async fn camel_case_token_is_accepted() {
    let (mock, registry, ctx) = harness_with(Credentials::new().with("accessToken", "camel"));
    mock.respond_json("POST", "/messages", accepted());

    run(
        &registry,
        &ctx,
        "send_message",
        json!({"to": "+14155552671", "message": "Hi", "phone_number_id": "1065"}),
    )
    .await;

    assert_eq!(mock.last_request().unwrap().get_header("Authorization"), Some("Bearer camel"));
}

#[tokio::test]
async fn health_defaults_quality_rating() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/1065", json!({"status": "CONNECTED", "id": "1065"}));

    let out = run(&registry, &ctx, "get_phone_number_health", json!({"phone_number_id": "1065"})).await;

    assert_eq!(out, json!({"success": true, "status": "CONNECTED", "quality_rating": "UNKNOWN"}));
    assert_eq!(mock.last_request().unwrap().get_query("fields"), Some("status,quality_rating"));
}

#[tokio::test]
async fn health_without_status_fails_with_unknowns() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/1065", json!({"id": "1065"}));

    let out = run(&registry, &ctx, "get_phone_number_health", json!({"phone_number_id": "1065"})).await;

    assert_eq!(out, json!({
        "success": false,
        "status": "UNKNOWN",
        "quality_rating": "UNKNOWN",
        "error": "Unknown error",
    }));
}

#[rstest]
#[case("+14155550123", true)]
#[case("+442071838750", true)]
#[case("14155550123", false)]
#[case("+0123456", false)]
#[case("+1415555012345678", false)]
fn e164_check_is_public(#[case] phone: &str, #[case] valid: bool) {
    assert_eq!(nebula_whatsapp::is_e164(phone), valid);
}
