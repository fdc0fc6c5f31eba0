use std::time::Duration;

use serde_json::Value;

/// HTTP response as seen by an integration.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Parsed body: JSON when it parses, the raw text as a string when it
    /// does not, `null` when empty.
    pub body: Value,
}

impl HttpResponse {
    /// Creates a response with a JSON body and no headers
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }

    /// Builds a response from wire bytes.
    pub fn from_bytes(status: u16, headers: Vec<(String, String)>, bytes: &[u8]) -> Self {
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
        };
        Self {
            status,
            headers,
            body,
        }
    }

    /// Adds a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Checks if the response status is a success (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Gets a header by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Retry-After` in whole seconds, when the vendor sent the delta form.
    pub fn retry_after(&self) -> Option<Duration> {
        self.get_header("retry-after")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
    }

    /// Best-effort human message from an error body.
    ///
    /// Looks at the shapes vendors actually return: `{"error": {"message"}}`,
    /// `{"message"}`, `{"error_description"}`, `{"error": "..."}`,
    /// `{"description"}` and finally a bare string body.
    pub fn error_message(&self) -> Option<String> {
        let body = &self.body;
        let candidates = [
            body.pointer("/error/message"),
            body.get("message"),
            body.get("error_description"),
            body.get("error").filter(|v| v.is_string()),
            body.get("description"),
            body.get("Message"),
        ];
        candidates
            .into_iter()
            .flatten()
            .find_map(|v| v.as_str().map(str::to_owned))
            .or_else(|| body.as_str().map(str::to_owned))
            .filter(|s| !s.is_empty())
    }
}
