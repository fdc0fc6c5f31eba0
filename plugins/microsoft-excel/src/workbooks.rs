//! Workbook discovery and worksheet management.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, WORKSHEET_FIELDS, TABLE_FIELDS, Workbook, collection, pick};
use crate::{CATEGORY, DEFAULT_BASE_URL};

const EXCEL_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

pub(crate) async fn list_workbooks(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let base = ctx.base_url(CATEGORY, DEFAULT_BASE_URL);
    let token = ctx.bearer_token()?;

    let request = if let Some(next) = input.opt_str("page_token") {
        // A page token is the `@odata.nextLink` of the previous page.
        if !next.starts_with(&base) {
            return Err(ActionError::validation("page_token must be a Graph nextLink"));
        }
        HttpRequest::get(next)
    } else {
        let url = match input.opt_str("folder_path") {
            Some(folder) => {
                let encoded: Vec<String> = folder
                    .trim_matches('/')
                    .split('/')
                    .map(encode_segment)
                    .collect();
                format!("{base}/me/drive/root:/{}:/children", encoded.join("/"))
            }
            None => format!("{base}/me/drive/root/children"),
        };
        HttpRequest::get(url)
            .query_param("$top", input.i64_or("page_size", 25).clamp(1, 100))
            .query_param("$select", "id,name,webUrl,lastModifiedDateTime,file,size")
            .query_param("$orderby", "lastModifiedDateTime desc")
    };
    let response = ctx.fetch(request.bearer_auth(token)).await?;

    let needle = input.opt_str("name_contains").map(str::to_lowercase);
    let workbooks: Vec<Value> = collection(&response)
        .iter()
        .filter(|item| item.pointer("/file/mimeType").and_then(Value::as_str) == Some(EXCEL_MIME_TYPE))
        .filter(|item| {
            needle.as_ref().is_none_or(|needle| {
                item.get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_lowercase()
                    .contains(needle)
            })
        })
        .map(|item| pick(item, &["id", "name", "webUrl", "lastModifiedDateTime", "size"]))
        .collect();

    let mut out = json!({ "workbooks": workbooks });
    if let Some(next) = response.get("@odata.nextLink").and_then(Value::as_str)
        && let Some(map) = out.as_object_mut()
    {
        map.insert("next_page_token".into(), json!(next));
    }
    Ok(out)
}

/// Fetch a workbook listing; failures are logged and recorded in `warnings`.
async fn optional_listing(
    workbook: &Workbook<'_>,
    path: &str,
    fields: &[&str],
    warnings: &mut Vec<Value>,
) -> Vec<Value> {
    match workbook.get(workbook.url(path)).await {
        Ok(body) => collection(&body).iter().map(|item| pick(item, fields)).collect(),
        Err(err) => {
            tracing::warn!(listing = path, error = %err, "workbook sub-fetch failed");
            warnings.push(json!(format!("{path}: {err}")));
            Vec::new()
        }
    }
}

pub(crate) async fn get_workbook(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let file = workbook.get(workbook.item_url()).await?;

    let mut warnings = Vec::new();
    let worksheets = optional_listing(&workbook, "worksheets", &WORKSHEET_FIELDS, &mut warnings).await;
    let tables = optional_listing(&workbook, "tables", &TABLE_FIELDS, &mut warnings).await;
    let named_ranges = optional_listing(&workbook, "names", &["name", "value", "type"], &mut warnings).await;

    Ok(json!({
        "workbook": pick(&file, &["id", "name", "webUrl", "lastModifiedDateTime"]),
        "worksheets": worksheets,
        "tables": tables,
        "named_ranges": named_ranges,
        "warnings": warnings,
    }))
}

pub(crate) async fn list_worksheets(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let response = workbook.get(workbook.url("worksheets")).await?;
    let worksheets: Vec<Value> = collection(&response)
        .iter()
        .map(|ws| pick(ws, &WORKSHEET_FIELDS))
        .collect();
    Ok(json!({ "worksheets": worksheets }))
}

pub(crate) async fn create_worksheet(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let name = input.require_str("name")?;
    let response = workbook
        .send_json(RequestMethod::Post, workbook.url("worksheets/add"), json!({ "name": name }))
        .await?;
    Ok(json!({ "worksheet": pick(&response, &WORKSHEET_FIELDS) }))
}

pub(crate) async fn delete_worksheet(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let sheet = client::worksheet(input.require_str("worksheet_name")?);
    ctx.fetch(workbook.request(RequestMethod::Delete, workbook.url(&sheet)))
        .await?;
    Ok(json!({ "deleted": true }))
}

pub(crate) async fn get_used_range(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let sheet = client::worksheet(input.require_str("worksheet_name")?);
    let path = if input.bool_or("values_only", false) {
        format!("{sheet}/usedRange(valuesOnly=true)")
    } else {
        format!("{sheet}/usedRange")
    };
    let response = workbook.get(workbook.url(&path)).await?;

    let values = response.get("values").and_then(Value::as_array).cloned().unwrap_or_default();
    let (rows, columns) = client::dimensions(&values);
    Ok(json!({
        "range": response.get("address").and_then(Value::as_str).unwrap_or_default(),
        "row_count": response.get("rowCount").cloned().unwrap_or_else(|| json!(rows)),
        "column_count": response.get("columnCount").cloned().unwrap_or_else(|| json!(columns)),
        "values": values,
    }))
}
