//! # Nebula Action
//!
//! The contract every Nebula integration speaks.
//!
//! An integration is a set of named actions. Each action validates a JSON
//! input mapping, talks to one vendor API through the [`ExecutionContext`]
//! fetch primitive, and returns a normalised payload. The [`ActionRegistry`]
//! turns every outcome into a uniform JSON envelope, so callers (often an
//! LLM agent) can branch on `result`/`error_type`/`can_retry` without
//! parsing prose.
//!
//! ## Core Types
//!
//! - [`Action`]: one named operation; [`FnAction`] adapts a plain async fn
//! - [`ActionRegistry`]: explicit key → action map and invocation boundary
//! - [`ExecutionContext`]: credentials, transport, config, cancellation
//! - [`ActionError`] / [`ErrorKind`]: failure taxonomy
//! - [`EnvelopeStyle`]: per-action envelope shaping
//! - [`RateLimitAdvisory`]: retry-as-data for 429s
//! - [`paginate`]: uniform paginated-list envelope
//! - [`VendorResponse`]: explicit decoding of vendor body shapes
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::FutureExt;
//! use nebula_action::prelude::*;
//!
//! async fn get_thing(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
//!     let id = input.require_str("thing_id")?;
//!     let thing = ctx
//!         .fetch(HttpRequest::get(format!("https://api.example.com/things/{}", encode_segment(id))))
//!         .await?;
//!     Ok(json!({ "thing": thing }))
//! }
//!
//! let mut registry = ActionRegistry::new();
//! registry.register_fn(ActionMetadata::new("example", "get_thing", "Fetch a thing"), |i, c| {
//!     get_thing(i, c).boxed()
//! });
//! let envelope = registry.execute("example.get_thing", json!({"thing_id": "t1"}), ctx).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Action trait and the function adapter.
pub mod action;
/// Rate-limit advisories.
pub mod advisory;
/// Client configuration.
pub mod config;
/// Execution context and credentials.
pub mod context;
/// Envelope policy.
pub mod envelope;
/// Error types and classification.
pub mod error;
/// Typed input access.
pub mod input;
/// Action metadata.
pub mod metadata;
/// Pagination helper.
pub mod pagination;
/// Prelude for integration crates.
pub mod prelude;
/// Action registry and invocation boundary.
pub mod registry;
/// HTTP transport seam.
pub mod transport;
/// Shared input validators.
pub mod validate;
/// Vendor response decoding.
pub mod vendor;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// ── Public re-exports ───────────────────────────────────────────────────────

pub use action::{Action, ActionFuture, FnAction};
pub use advisory::{DEFAULT_RETRY_AFTER, MAX_RATE_LIMIT_RETRIES, RateLimitAdvisory};
pub use config::ClientConfig;
pub use context::{Credentials, ExecutionContext, status_error};
pub use envelope::{EnvelopeStyle, Outcome, StatusKey, is_success};
pub use error::{ActionError, ErrorKind};
pub use input::ActionInput;
pub use metadata::ActionMetadata;
pub use pagination::{DEFAULT_PAGE_SIZE, PageRequest, paginate};
pub use registry::ActionRegistry;
pub use transport::{
    HttpRequest, HttpResponse, HttpTransport, RequestAuth, RequestBody, RequestMethod,
    ReqwestTransport, TransportError, encode_segment, encode_segment_keep,
};
pub use vendor::VendorResponse;
