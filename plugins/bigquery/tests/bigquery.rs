use std::sync::Arc;

use nebula_action::testing::MockTransport;
use nebula_action::{
    ActionRegistry, ClientConfig, Credentials, ExecutionContext, HttpResponse,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};

fn harness() -> (Arc<MockTransport>, ActionRegistry, ExecutionContext) {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_bigquery::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone())
        .with_credentials(Credentials::new().with("access_token", "ya29.token"))
        .with_config(ClientConfig::default().with_base_url("bigquery", "http://bq.test/v2"));
    (mock, registry, ctx)
}

async fn run(registry: &ActionRegistry, ctx: &ExecutionContext, action: &str, input: Value) -> Value {
    registry
        .execute(&format!("bigquery.{action}"), input, ctx.clone())
        .await
}

#[tokio::test]
async fn query_rows_are_unpacked_against_the_schema() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/projects/acme/queries", json!({
        "jobReference": {"projectId": "acme", "jobId": "job_1"},
        "jobComplete": true,
        "totalRows": "2",
        "totalBytesProcessed": "2048",
        "cacheHit": false,
        "schema": {"fields": [
            {"name": "name", "type": "STRING", "mode": "NULLABLE"},
            {"name": "tags", "type": "STRING", "mode": "REPEATED"},
            {"name": "owner", "type": "RECORD", "fields": [
                {"name": "email", "type": "STRING"}
            ]}
        ]},
        "rows": [
            {"f": [{"v": "alpha"}, {"v": [{"v": "x"}, {"v": "y"}]}, {"v": {"f": [{"v": "a@acme.io"}]}}]},
            {"f": [{"v": "beta"}, {"v": []}, {"v": null}]}
        ]
    }));

    let out = run(&registry, &ctx, "run_query", json!({
        "project_id": "acme",
        "query": "SELECT name, tags, owner FROM t",
    }))
    .await;

    insta::assert_json_snapshot!(out, @r#"
    {
      "cache_hit": false,
      "job_complete": true,
      "job_id": "job_1",
      "result": true,
      "rows": [
        {
          "name": "alpha",
          "owner": {
            "email": "a@acme.io"
          },
          "tags": [
            "x",
            "y"
          ]
        },
        {
          "name": "beta",
          "owner": null,
          "tags": []
        }
      ],
      "schema": {
        "fields": [
          {
            "mode": "NULLABLE",
            "name": "name",
            "type": "STRING"
          },
          {
            "mode": "REPEATED",
            "name": "tags",
            "type": "STRING"
          },
          {
            "fields": [
              {
                "mode": "NULLABLE",
                "name": "email",
                "type": "STRING"
              }
            ],
            "mode": "NULLABLE",
            "name": "owner",
            "type": "RECORD"
          }
        ]
      },
      "total_bytes_processed": 2048,
      "total_rows": 2
    }
    "#);

    let sent = mock.last_request().unwrap();
    assert_eq!(sent.get_header("authorization"), Some("Bearer ya29.token"));
    assert_eq!(sent.json_body().unwrap(), &json!({
        "query": "SELECT name, tags, owner FROM t",
        "useLegacySql": false,
        "maxResults": 1000,
        "timeoutMs": 30000,
        "dryRun": false,
    }));
}

#[tokio::test]
async fn dry_run_reports_bytes_only() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/queries", json!({"totalBytesProcessed": "65536", "jobComplete": true}));

    let out = run(&registry, &ctx, "run_query", json!({
        "project_id": "acme",
        "query": "SELECT 1",
        "dry_run": true,
    }))
    .await;

    assert_eq!(out, json!({
        "result": true,
        "rows": [],
        "total_rows": 0,
        "total_bytes_processed": 65536,
        "job_complete": true,
        "dry_run": true,
    }));
}

#[tokio::test]
async fn cached_query_reports_zero_bytes() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/queries", json!({
        "jobReference": {"projectId": "acme", "jobId": "job_cached"},
        "jobComplete": true,
        "cacheHit": true,
        "totalRows": "0",
        "totalBytesProcessed": "0",
    }));

    let out = run(&registry, &ctx, "run_query", json!({"project_id": "acme", "query": "SELECT 1"})).await;

    assert_eq!(out["result"], json!(true));
    assert_eq!(out["total_bytes_processed"], json!(0));
    assert_eq!(out["total_rows"], json!(0));
    assert_eq!(out["cache_hit"], json!(true));
    assert_eq!(out["job_id"], json!("job_cached"));
}

#[tokio::test]
async fn missing_byte_count_is_null() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/queries", json!({"jobComplete": false}));

    let out = run(&registry, &ctx, "run_query", json!({"project_id": "acme", "query": "SELECT 1"})).await;

    assert_eq!(out["total_bytes_processed"], Value::Null);
    assert_eq!(out["job_complete"], json!(false));
}

#[tokio::test]
async fn rejected_rows_fail_with_counts() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/tables/events/insertAll", json!({
        "insertErrors": [{"index": 1, "errors": [{"reason": "invalid", "message": "no such field: colour"}]}]
    }));

    let out = run(&registry, &ctx, "insert_rows", json!({
        "project_id": "acme",
        "dataset_id": "web",
        "table_id": "events",
        "rows": [{"kind": "view"}, {"colour": "red"}, {"kind": "click"}],
    }))
    .await;

    assert_eq!(out, json!({
        "result": false,
        "error": "1 of 3 rows were rejected",
        "inserted_count": 2,
        "insert_errors": [{"index": 1, "errors": [{"reason": "invalid", "message": "no such field: colour"}]}],
    }));
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.json_body().unwrap()["rows"][0], json!({"json": {"kind": "view"}}));
}

#[tokio::test]
async fn clean_insert_counts_every_row() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("POST", "/insertAll", json!({"kind": "bigquery#tableDataInsertAllResponse"}));

    let out = run(&registry, &ctx, "insert_rows", json!({
        "project_id": "acme",
        "dataset_id": "web",
        "table_id": "events",
        "rows": [{"kind": "view"}],
    }))
    .await;

    assert_eq!(out, json!({"result": true, "inserted_count": 1, "insert_errors": []}));
}

#[rstest]
#[case("run_query", json!({"query": "SELECT 1"}), json!({"result": false, "error": "project_id is required", "rows": []}))]
#[case("get_dataset", json!({"project_id": "acme"}), json!({"result": false, "error": "dataset_id is required", "dataset": {}}))]
#[case("create_table", json!({"project_id": "acme", "dataset_id": "web", "table_id": "t"}), json!({"result": false, "error": "schema is required", "table": {}}))]
#[case("insert_rows", json!({"project_id": "acme", "dataset_id": "web", "table_id": "t", "rows": []}), json!({"result": false, "error": "rows is required", "inserted_count": 0, "insert_errors": []}))]
#[case("get_job", json!({"project_id": "acme"}), json!({"result": false, "error": "job_id is required", "job": {}}))]
#[tokio::test]
async fn missing_required_fields_never_dispatch(
    #[case] action: &str,
    #[case] input: Value,
    #[case] expected: Value,
) {
    let (mock, registry, ctx) = harness();
    let out = run(&registry, &ctx, action, input).await;
    assert_eq!(out, expected);
    assert_eq!(mock.request_count(), 0);
}

#[tokio::test]
async fn list_datasets_forwards_truthy_params_and_next_page() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/projects/acme/datasets", json!({
        "datasets": [{
            "id": "acme:web",
            "datasetReference": {"datasetId": "web", "projectId": "acme"},
            "location": "EU"
        }],
        "nextPageToken": "tok-2"
    }));

    let out = run(&registry, &ctx, "list_datasets", json!({
        "project_id": "acme",
        "max_results": 0,
        "all": true,
    }))
    .await;

    assert_eq!(out, json!({
        "result": true,
        "datasets": [{
            "id": "acme:web",
            "dataset_id": "web",
            "project_id": "acme",
            "friendly_name": null,
            "location": "EU",
            "labels": {},
        }],
        "next_page_token": "tok-2",
    }));
    let sent = mock.last_request().unwrap();
    assert_eq!(sent.get_query("maxResults"), None);
    assert_eq!(sent.get_query("all"), Some("true"));
}

#[tokio::test]
async fn list_tables_without_next_page_omits_token() {
    let (mock, registry, ctx) = harness();
    mock.respond_json("GET", "/datasets/web/tables", json!({"tables": [], "totalItems": 0}));

    let out = run(&registry, &ctx, "list_tables", json!({"project_id": "acme", "dataset_id": "web"})).await;

    assert_eq!(out, json!({"result": true, "tables": [], "total_items": 0}));
}

#[tokio::test]
async fn delete_failure_keeps_deleted_false() {
    let (mock, registry, ctx) = harness();
    mock.respond(
        "DELETE",
        "/datasets/web",
        HttpResponse::new(404, json!({"error": {"code": 404, "message": "Not found: Dataset acme:web"}})),
    );

    let out = run(&registry, &ctx, "delete_dataset", json!({"project_id": "acme", "dataset_id": "web"})).await;

    assert_eq!(out, json!({
        "result": false,
        "error": "HTTP 404: Not found: Dataset acme:web",
        "deleted": false,
    }));
}

#[tokio::test]
async fn missing_token_is_a_credential_error() {
    let mock = Arc::new(MockTransport::new());
    let mut registry = ActionRegistry::new();
    nebula_bigquery::register(&mut registry);
    let ctx = ExecutionContext::new(mock.clone());

    let out = run(&registry, &ctx, "list_projects", json!({})).await;

    assert_eq!(out["result"], json!(false));
    assert_eq!(out["projects"], json!([]));
    assert_eq!(mock.request_count(), 0);
}
