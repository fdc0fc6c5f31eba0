//! Range reads, writes, sorting and formatting.

use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::client::{self, Workbook};

/// Range path from the required `worksheet_name` and `range` inputs.
fn range_path(input: &ActionInput) -> Result<(String, &str), ActionError> {
    let sheet = input.require_str("worksheet_name")?;
    let address = input.require_str("range")?;
    Ok((client::range(sheet, address), address))
}

pub(crate) async fn read_range(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let (path, address) = range_path(&input)?;
    let with_formulas = input.str_or("value_render_option", "FORMATTED_VALUE") == "FORMULA";

    let response = workbook.get(workbook.url(&path)).await?;
    let list = |key: &str| response.get(key).and_then(Value::as_array).cloned().unwrap_or_default();

    let values = list("values");
    let formulas = if with_formulas { list("formulas") } else { Vec::new() };
    let (rows, columns) = client::dimensions(&values);
    Ok(json!({
        "range": response.get("address").and_then(Value::as_str).unwrap_or(address),
        "formulas": formulas,
        "number_format": list("numberFormat"),
        "values": values,
        "row_count": rows,
        "column_count": columns,
    }))
}

pub(crate) async fn write_range(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let (path, address) = range_path(&input)?;
    let values = input.require_array("values")?;

    let response = workbook
        .send_json(RequestMethod::Patch, workbook.url(&path), json!({ "values": values }))
        .await?;

    let (rows, columns) = client::dimensions(values);
    Ok(json!({
        "updated_range": response.get("address").and_then(Value::as_str).unwrap_or(address),
        "updated_rows": rows,
        "updated_columns": columns,
        "updated_cells": rows * columns,
    }))
}

pub(crate) async fn sort_range(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let (path, _) = range_path(&input)?;
    let fields: Vec<Value> = input
        .require_array("sort_fields")?
        .iter()
        .map(|field| {
            json!({
                "key": field.get("column_index").and_then(Value::as_i64).unwrap_or(0),
                "ascending": field.get("ascending").and_then(Value::as_bool).unwrap_or(true),
            })
        })
        .collect();

    workbook
        .send_json(
            RequestMethod::Post,
            workbook.url(&format!("{path}/sort/apply")),
            json!({
                "fields": fields,
                "hasHeaders": input.bool_or("has_headers", true),
                "matchCase": false,
            }),
        )
        .await?;
    Ok(json!({ "sorted": true }))
}

/// Apply each part of `format` with its own request. Parts that fail are
/// collected; the action fails if any did.
pub(crate) async fn format_range(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
    let workbook = Workbook::open(&input, &ctx)?;
    let (path, _) = range_path(&input)?;
    let spec = input
        .opt_object("format")
        .ok_or_else(|| ActionError::required("format"))?;

    let range_url = workbook.url(&path);
    let format_url = format!("{range_url}/format");

    let mut steps: Vec<(&str, String, Value)> = Vec::new();
    if let Some(font) = spec.get("font") {
        steps.push(("Font", format!("{format_url}/font"), font.clone()));
    }
    if let Some(fill) = spec.get("fill") {
        steps.push(("Fill", format!("{format_url}/fill"), fill.clone()));
    }
    let alignment: Map<String, Value> = ["horizontalAlignment", "verticalAlignment"]
        .into_iter()
        .filter_map(|k| spec.get(k).map(|v| (k.to_owned(), v.clone())))
        .collect();
    if !alignment.is_empty() {
        steps.push(("Alignment", format_url.clone(), Value::Object(alignment)));
    }
    if let Some(number_format) = spec.get("numberFormat") {
        steps.push((
            "NumberFormat",
            range_url.clone(),
            json!({ "numberFormat": number_format }),
        ));
    }

    let mut errors = Vec::new();
    for (part, url, body) in steps {
        if let Err(err) = workbook.send_json(RequestMethod::Patch, url, body).await {
            tracing::warn!(part, error = %err, "range format step failed");
            errors.push(format!("{part}: {err}"));
        }
    }

    if errors.is_empty() {
        Ok(json!({ "formatted": true }))
    } else {
        Err(ActionError::from_message(errors.join("; ")))
    }
}
