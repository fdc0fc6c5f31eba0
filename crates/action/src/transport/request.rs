use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;

use super::{RequestAuth, RequestMethod, TransportError};

/// Outbound request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document, sent with `Content-Type: application/json`.
    Json(Value),
    /// Raw bytes with an explicit content type.
    Raw {
        /// Body bytes, sent as-is.
        bytes: Bytes,
        /// `Content-Type` header value.
        content_type: String,
    },
}

/// A fully described outbound HTTP call.
///
/// Query pairs and headers keep insertion order so signed requests and
/// recorded test traffic are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: RequestMethod,
    /// Absolute URL without the query string
    pub url: String,
    /// Query parameters appended to `url`
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: Vec<(String, String)>,
    /// Optional body
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Creates a request for the given method and URL
    pub fn new(method: RequestMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Creates a GET request
    pub fn get(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Get, url)
    }

    /// Creates a POST request
    pub fn post(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Post, url)
    }

    /// Creates a PUT request
    pub fn put(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Put, url)
    }

    /// Creates a PATCH request
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Patch, url)
    }

    /// Creates a DELETE request
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(RequestMethod::Delete, url)
    }

    /// Adds a header, replacing an existing one with the same name
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
        self.headers.push((key, value.into()));
        self
    }

    /// Adds a query parameter
    pub fn query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query parameter only when `value` is present
    pub fn query_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query_param(key, value),
            None => self,
        }
    }

    /// Sets a JSON body
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Serializes `body` into a JSON body
    pub fn json_from<T: Serialize + ?Sized>(self, body: &T) -> Result<Self, TransportError> {
        let value = serde_json::to_value(body)
            .map_err(|e| TransportError::BuildError(format!("body serialization failed: {e}")))?;
        Ok(self.json(value))
    }

    /// Sets a raw body with an explicit content type
    pub fn raw(mut self, bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Raw {
            bytes: bytes.into(),
            content_type: content_type.into(),
        });
        self
    }

    /// Applies an authentication scheme
    pub fn auth(self, auth: &RequestAuth) -> Self {
        auth.apply(self)
    }

    /// Sets bearer token authentication
    pub fn bearer_auth(self, token: impl AsRef<str>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.as_ref()))
    }

    /// Looks up a header (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Looks up the first query value for `name`
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// The JSON body, if one was set
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Some(RequestBody::Json(value)) => Some(value),
            _ => None,
        }
    }

    /// Full URL with the query string form-encoded
    pub fn full_url(&self) -> Result<url::Url, TransportError> {
        let mut url = url::Url::parse(&self.url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {e}", self.url)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}
