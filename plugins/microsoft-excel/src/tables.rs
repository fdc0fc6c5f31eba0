//! Table listing, rows and filters.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, TABLE_FIELDS, Workbook, collection, pick};

const DEFAULT_MAX_ROWS: i64 = 5000;

fn table_path(input: &ActionInput) -> Result<String, ActionError> {
    Ok(client::table(input.require_str("table_name")?))
}

pub(crate) async fn list_tables(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let path = match input.opt_str("worksheet_name") {
        Some(sheet) => format!("{}/tables", client::worksheet(sheet)),
        None => "tables".to_owned(),
    };
    let response = workbook.get(workbook.url(&path)).await?;
    let tables: Vec<Value> = collection(&response)
        .iter()
        .map(|t| pick(t, &TABLE_FIELDS))
        .collect();
    Ok(json!({ "tables": tables }))
}

fn first_row(body: &Value) -> Vec<Value> {
    body.pointer("/values/0")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Header and body rows, turned into objects keyed by header.
///
/// `select_columns` narrows and reorders the columns; `skip` then `top`
/// page through the rows. Tables larger than `max_rows` (default 5000, `0`
/// for no limit) are refused rather than truncated.
pub(crate) async fn get_table_data(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let table = table_path(&input)?;

    let header_body = workbook.get(workbook.url(&format!("{table}/headerRowRange"))).await?;
    let headers: Vec<String> = first_row(&header_body)
        .iter()
        .map(|h| match h {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    let indices: Vec<usize> = match input.opt_str_list("select_columns").filter(|c| !c.is_empty()) {
        Some(selected) => {
            let missing: Vec<&str> = selected
                .iter()
                .filter(|c| !headers.contains(c))
                .map(String::as_str)
                .collect();
            if !missing.is_empty() {
                return Err(ActionError::validation(format!(
                    "Columns not found: {}. Available columns: {}",
                    missing.join(", "),
                    headers.join(", ")
                )));
            }
            selected
                .iter()
                .filter_map(|c| headers.iter().position(|h| h == c))
                .collect()
        }
        None => (0..headers.len()).collect(),
    };

    let body = workbook.get(workbook.url(&format!("{table}/dataBodyRange"))).await?;
    let all_rows = body.get("values").and_then(Value::as_array).cloned().unwrap_or_default();

    let max_rows = input.i64_or("max_rows", DEFAULT_MAX_ROWS);
    if max_rows > 0 && all_rows.len() as i64 > max_rows {
        return Err(ActionError::validation(format!(
            "Table has {} rows, exceeding max_rows limit of {max_rows}. Use pagination (top/skip) or increase max_rows.",
            all_rows.len()
        )));
    }

    let skip = input.opt_u64("skip").map_or(0, |n| n as usize);
    let top = input.opt_u64("top").map_or(usize::MAX, |n| n as usize);
    let rows: Vec<Value> = all_rows
        .iter()
        .skip(skip)
        .take(top)
        .map(|row| {
            let cells = row.as_array().map(Vec::as_slice).unwrap_or_default();
            let object: Map<String, Value> = indices
                .iter()
                .map(|&i| (headers[i].clone(), cells.get(i).cloned().unwrap_or(Value::Null)))
                .collect();
            Value::Object(object)
        })
        .collect();

    let selected_headers: Vec<&str> = indices.iter().map(|&i| headers[i].as_str()).collect();
    Ok(json!({
        "headers": selected_headers,
        "rows": rows,
        "total_rows": all_rows.len(),
    }))
}

pub(crate) async fn add_table_row(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let table = table_path(&input)?;
    let rows = input.require_array("rows")?;

    let mut body = json!({ "values": rows });
    if let (Some(index), Some(map)) = (input.opt_i64("index"), body.as_object_mut()) {
        map.insert("index".into(), json!(index));
    }
    workbook
        .send_json(RequestMethod::Post, workbook.url(&format!("{table}/rows/add")), body)
        .await?;

    // The rows are in; the new table address is informational only.
    let mut warnings = Vec::new();
    let table_range = match workbook.get(workbook.url(&format!("{table}/range"))).await {
        Ok(range) => range
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned(),
        Err(err) => {
            tracing::warn!(error = %err, "could not read table range after adding rows");
            warnings.push(json!(format!("range: {err}")));
            String::new()
        }
    };

    Ok(json!({
        "added_rows": rows.len(),
        "table_range": table_range,
        "warnings": warnings,
    }))
}

pub(crate) async fn create_table(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let sheet = client::worksheet(input.require_str("worksheet_name")?);
    let address = input.require_str("range")?;

    let response = workbook
        .send_json(
            RequestMethod::Post,
            workbook.url(&format!("{sheet}/tables/add")),
            json!({ "address": address, "hasHeaders": input.bool_or("has_headers", true) }),
        )
        .await?;
    Ok(json!({ "table": pick(&response, &["id", "name", "showHeaders"]) }))
}

fn row_path(input: &ActionInput) -> Result<String, ActionError> {
    let table = table_path(input)?;
    let index = input.require_i64("row_index")?;
    if index < 0 {
        return Err(ActionError::validation("row_index must be zero or greater"));
    }
    Ok(format!("{table}/rows/itemAt(index={index})"))
}

pub(crate) async fn update_table_row(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let path = row_path(&input)?;
    let values = input.require_array("values")?;

    let updated = workbook
        .send_json(RequestMethod::Patch, workbook.url(&path), json!({ "values": [values] }))
        .await?;
    Ok(json!({ "updated_row": updated }))
}

pub(crate) async fn delete_table_row(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let path = row_path(&input)?;
    ctx.fetch(workbook.request(RequestMethod::Delete, workbook.url(&path)))
        .await?;
    Ok(json!({ "deleted": true }))
}

/// Filter the column at `column_index`, resolved to its id first.
pub(crate) async fn apply_filter(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let table = table_path(&input)?;
    let column_index = input.require_i64("column_index")?;
    let criteria = input.require("filter_criteria")?.clone();

    let columns_body = workbook.get(workbook.url(&format!("{table}/columns"))).await?;
    let columns = collection(&columns_body);
    let column = usize::try_from(column_index)
        .ok()
        .and_then(|i| columns.get(i))
        .ok_or_else(|| {
            ActionError::validation(format!(
                "Column index {column_index} out of range (must be 0-{})",
                columns.len() as i64 - 1
            ))
        })?;
    let column_id = match column.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => return Err(ActionError::from_message("column has no id")),
    };

    workbook
        .send_json(
            RequestMethod::Post,
            workbook.url(&format!("{table}/columns/{}/filter/apply", encode_segment(&column_id))),
            json!({ "criteria": criteria }),
        )
        .await?;
    Ok(json!({ "filtered": true }))
}

pub(crate) async fn clear_filter(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let table = table_path(&input)?;
    ctx.fetch(workbook.request(RequestMethod::Post, workbook.url(&format!("{table}/clearFilters"))))
        .await?;
    Ok(json!({ "cleared": true }))
}
