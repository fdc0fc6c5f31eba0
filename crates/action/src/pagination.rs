//! Uniform paginated-list envelope.

use serde_json::{Map, Value, json};

use crate::vendor::VendorResponse;

/// Page size reported when neither the caller nor the vendor gave one.
pub const DEFAULT_PAGE_SIZE: u64 = 100;

/// Requested page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// One-based page number
    pub page: u64,
    /// Requested page size, if the caller set one
    pub page_size: Option<u64>,
}

impl PageRequest {
    /// Page coordinates with the default first page.
    pub fn new(page: Option<u64>, page_size: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1),
            page_size,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Emit `{result:true, <key>: items, total, page, pageSize}`.
///
/// Fields the vendor omitted default to the item count, the requested page
/// and the requested size (or [`DEFAULT_PAGE_SIZE`]).
pub fn paginate(response: &VendorResponse, key: &str, request: PageRequest) -> Value {
    let items = response.items(key);
    let total = response
        .meta("total")
        .cloned()
        .unwrap_or_else(|| json!(items.len()));
    let page = response
        .meta("page")
        .cloned()
        .unwrap_or_else(|| json!(request.page));
    let page_size = response
        .meta("pageSize")
        .cloned()
        .unwrap_or_else(|| json!(request.page_size.unwrap_or(DEFAULT_PAGE_SIZE)));

    let mut out = Map::new();
    out.insert("result".into(), Value::Bool(true));
    out.insert(key.to_string(), Value::Array(items));
    out.insert("total".into(), total);
    out.insert("page".into(), page);
    out.insert("pageSize".into(), page_size);
    Value::Object(out)
}
