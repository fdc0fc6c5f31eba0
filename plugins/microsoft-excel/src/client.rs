use nebula_action::RequestMethod;
use nebula_action::prelude::*;

use crate::{CATEGORY, DEFAULT_BASE_URL};

/// Addressing for one workbook's Graph resources.
pub(crate) struct Workbook<'a> {
    ctx: &'a ExecutionContext,
    token: &'a str,
    item: String,
}

impl<'a> Workbook<'a> {
    /// Resolve `workbook_id` and the bearer token.
    pub fn open(input: &ActionInput, ctx: &'a ExecutionContext) -> Result<Self, ActionError> {
        let id = input.require_str("workbook_id")?;
        let token = ctx.bearer_token()?;
        Ok(Self {
            ctx,
            token,
            item: format!(
                "{}/me/drive/items/{}",
                ctx.base_url(CATEGORY, DEFAULT_BASE_URL),
                encode_segment(id)
            ),
        })
    }

    /// The drive item itself (file metadata).
    pub fn item_url(&self) -> &str {
        &self.item
    }

    /// `{item}/workbook/{path}`.
    pub fn url(&self, path: &str) -> String {
        format!("{}/workbook/{path}", self.item)
    }

    pub fn request(&self, method: RequestMethod, url: impl Into<String>) -> HttpRequest {
        HttpRequest::new(method, url).bearer_auth(self.token)
    }

    pub async fn get(&self, url: impl Into<String>) -> Result<Value, ActionError> {
        self.ctx.fetch(self.request(RequestMethod::Get, url)).await
    }

    pub async fn send_json(
        &self,
        method: RequestMethod,
        url: impl Into<String>,
        body: Value,
    ) -> Result<Value, ActionError> {
        self.ctx.fetch(self.request(method, url).json(body)).await
    }
}

/// `worksheets/{name}` with the name encoded.
pub(crate) fn worksheet(name: &str) -> String {
    format!("worksheets/{}", encode_segment(name))
}

/// `worksheets/{name}/range(address='{address}')`.
pub(crate) fn range(sheet: &str, address: &str) -> String {
    format!(
        "{}/range(address='{}')",
        worksheet(sheet),
        encode_segment_keep(address, ":")
    )
}

/// `tables/{name}` with the name encoded.
pub(crate) fn table(name: &str) -> String {
    format!("tables/{}", encode_segment(name))
}

/// The `value` array of a Graph collection.
pub(crate) fn collection(body: &Value) -> &[Value] {
    body.get("value")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Copy `keys` from `item` into a new object, `null` when absent.
pub(crate) fn pick(item: &Value, keys: &[&str]) -> Value {
    let map: Map<String, Value> = keys
        .iter()
        .map(|k| ((*k).to_owned(), item.get(*k).cloned().unwrap_or(Value::Null)))
        .collect();
    Value::Object(map)
}

pub(crate) const WORKSHEET_FIELDS: [&str; 4] = ["id", "name", "position", "visibility"];
pub(crate) const TABLE_FIELDS: [&str; 5] = ["id", "name", "showHeaders", "showTotals", "style"];

/// Row and column count of a 2-D `values` array.
pub(crate) fn dimensions(values: &[Value]) -> (usize, usize) {
    let columns = values
        .first()
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    (values.len(), columns)
}
