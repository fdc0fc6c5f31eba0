//! Test doubles for integration suites.
//!
//! Enabled with the `testing` feature.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

#[derive(Debug)]
struct Route {
    method: String,
    fragment: String,
    replies: VecDeque<Result<HttpResponse, TransportError>>,
    sticky: bool,
}

/// Recording transport with canned, routed responses.
///
/// Routes match on HTTP method plus a substring of the URL (query string
/// excluded) and are tried in registration order, so register the more
/// specific fragment first. Unmatched requests get a 404.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `method` requests whose URL contains `fragment`.
    pub fn respond(&self, method: &str, fragment: &str, response: HttpResponse) -> &Self {
        self.push(method, fragment, Ok(response), true);
        self
    }

    /// Always answer with `200` and `body`.
    pub fn respond_json(&self, method: &str, fragment: &str, body: Value) -> &Self {
        self.respond(method, fragment, HttpResponse::new(200, body))
    }

    /// Answer the next matching request once; later ones fall through.
    pub fn respond_once(&self, method: &str, fragment: &str, response: HttpResponse) -> &Self {
        self.push(method, fragment, Ok(response), false);
        self
    }

    /// Fail matching requests at the transport level.
    pub fn fail(&self, method: &str, fragment: &str, error: TransportError) -> &Self {
        self.push(method, fragment, Err(error), true);
        self
    }

    fn push(
        &self,
        method: &str,
        fragment: &str,
        reply: Result<HttpResponse, TransportError>,
        sticky: bool,
    ) {
        self.routes.lock().push(Route {
            method: method.to_ascii_uppercase(),
            fragment: fragment.to_string(),
            replies: VecDeque::from([reply]),
            sticky,
        });
    }

    /// Every request sent so far, in order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Number of requests sent so far.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn reply_for(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut routes = self.routes.lock();
        let method = request.method.as_str();
        let route = routes.iter_mut().find(|r| {
            r.method == method && request.url.contains(&r.fragment) && !r.replies.is_empty()
        });

        match route {
            Some(route) if route.sticky => route
                .replies
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, Value::Null))),
            Some(route) => route
                .replies
                .pop_front()
                .unwrap_or_else(|| Ok(HttpResponse::new(200, Value::Null))),
            None => Ok(HttpResponse::new(
                404,
                json!({"message": format!("no mock route for {method} {}", request.url)}),
            )),
        }
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let reply = self.reply_for(&request);
        self.requests.lock().push(request);
        reply
    }
}
