//! Table schemas and the `{f: [{v: ..}]}` row encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn nullable() -> String {
    "NULLABLE".to_string()
}

/// One column of a table schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct FieldSchema {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default = "nullable")]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Self>,
}

impl FieldSchema {
    fn is_record(&self) -> bool {
        matches!(self.kind.as_deref(), Some("RECORD" | "STRUCT"))
    }

    fn is_repeated(&self) -> bool {
        self.mode == "REPEATED"
    }
}

/// A table schema as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TableSchema {
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
}

impl TableSchema {
    /// Read `body.schema`; anything unparseable is an empty schema.
    pub fn of(body: &Value) -> Self {
        body.get("schema")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .unwrap_or_default()
    }

    /// Cleaned-up schema for output: modes defaulted, `{}` when empty.
    pub fn to_output(&self) -> Value {
        if self.fields.is_empty() {
            return Value::Object(Map::new());
        }
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Unpack raw rows into plain objects keyed by column name.
    pub fn parse_rows(&self, rows: Option<&Value>) -> Vec<Value> {
        let Some(rows) = rows.and_then(Value::as_array) else {
            return Vec::new();
        };
        if self.fields.is_empty() {
            return Vec::new();
        }
        rows.iter().map(|row| parse_record(&self.fields, row)).collect()
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(_) => true,
    }
}

fn parse_record(fields: &[FieldSchema], record: &Value) -> Value {
    let cells = record
        .get("f")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut out = Map::new();
    for (i, field) in fields.iter().enumerate() {
        let name = field.name.clone().unwrap_or_else(|| format!("field_{i}"));
        let value = cells
            .get(i)
            .and_then(|cell| cell.get("v"))
            .cloned()
            .unwrap_or(Value::Null);
        out.insert(name, unpack(field, value));
    }
    Value::Object(out)
}

fn unpack(field: &FieldSchema, value: Value) -> Value {
    if !truthy(&value) {
        return value;
    }
    let items = || value.as_array().map(Vec::as_slice).unwrap_or_default();

    match (field.is_record(), field.is_repeated()) {
        (true, true) => Value::Array(
            items()
                .iter()
                .map(|item| match item.get("v") {
                    Some(inner) if truthy(inner) => parse_record(&field.fields, inner),
                    _ => Value::Null,
                })
                .collect(),
        ),
        (true, false) => parse_record(&field.fields, &value),
        (false, true) => Value::Array(
            items()
                .iter()
                .map(|item| item.get("v").cloned().unwrap_or(Value::Null))
                .collect(),
        ),
        (false, false) => value,
    }
}
