//! # Nebula BigQuery
//!
//! Google BigQuery actions over the v2 REST API: synchronous queries,
//! datasets, tables, streaming inserts, jobs and projects.
//!
//! Every request is authorised with the `access_token` credential. Query
//! rows come back in BigQuery's positional `{f: [{v: ..}]}` encoding and
//! are unpacked against the response schema into plain JSON objects,
//! nested records and repeated columns included.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod datasets;
mod jobs;
mod query;
mod schema;
mod tables;

use nebula_action::prelude::*;

/// Registry category for every BigQuery action.
pub const CATEGORY: &str = "bigquery";

/// Production API root; override with `ClientConfig::with_base_url`.
pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2";

fn meta(name: &str, description: &str, defaults: Value) -> ActionMetadata {
    ActionMetadata::new(CATEGORY, name, description)
        .with_envelope(EnvelopeStyle::result().with_failure_defaults(defaults))
        .with_required_credential("access_token")
}

/// Register every BigQuery action.
pub fn register(registry: &mut ActionRegistry) {
    registry.register_async(
        meta("run_query", "Run a SQL query and wait for its rows", json!({"rows": []})),
        query::run_query,
    );
    registry.register_async(
        meta(
            "get_query_results",
            "Fetch a page of results for a query job",
            json!({"rows": []}),
        ),
        query::get_query_results,
    );

    registry.register_async(
        meta("list_datasets", "List datasets in a project", json!({"datasets": []})),
        datasets::list_datasets,
    );
    registry.register_async(
        meta("get_dataset", "Fetch dataset metadata", json!({"dataset": {}})),
        datasets::get_dataset,
    );
    registry.register_async(
        meta("create_dataset", "Create a dataset", json!({"dataset": {}})),
        datasets::create_dataset,
    );
    registry.register_async(
        meta("delete_dataset", "Delete a dataset", json!({"deleted": false})),
        datasets::delete_dataset,
    );

    registry.register_async(
        meta("list_tables", "List tables in a dataset", json!({"tables": []})),
        tables::list_tables,
    );
    registry.register_async(
        meta("get_table", "Fetch table metadata and schema", json!({"table": {}})),
        tables::get_table,
    );
    registry.register_async(
        meta("create_table", "Create a table from a schema", json!({"table": {}})),
        tables::create_table,
    );
    registry.register_async(
        meta("delete_table", "Delete a table", json!({"deleted": false})),
        tables::delete_table,
    );
    registry.register_async(
        meta(
            "insert_rows",
            "Stream rows into a table",
            json!({"inserted_count": 0, "insert_errors": []}),
        ),
        tables::insert_rows,
    );

    registry.register_async(
        meta("list_jobs", "List jobs in a project", json!({"jobs": []})),
        jobs::list_jobs,
    );
    registry.register_async(
        meta("get_job", "Fetch one job", json!({"job": {}})),
        jobs::get_job,
    );
    registry.register_async(
        meta("list_projects", "List projects visible to the token", json!({"projects": []})),
        jobs::list_projects,
    );
}
