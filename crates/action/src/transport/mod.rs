//! HTTP seam between integrations and the network.
//!
//! Integrations describe calls as [`HttpRequest`] values and hand them to
//! an [`HttpTransport`]. Production uses [`ReqwestTransport`]; tests swap
//! in a recording transport.

mod auth;
mod client;
mod encode;
mod error;
mod method;
mod request;
mod response;

use async_trait::async_trait;

pub use auth::RequestAuth;
pub use client::ReqwestTransport;
pub use encode::{encode_segment, encode_segment_keep};
pub use error::TransportError;
pub use method::RequestMethod;
pub use request::{HttpRequest, RequestBody};
pub use response::HttpResponse;

/// Sends a request and returns whatever status the server answered with.
///
/// Non-2xx statuses are not errors at this layer; classification happens
/// in [`ExecutionContext::fetch`](crate::ExecutionContext::fetch).
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Dispatches one request
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
