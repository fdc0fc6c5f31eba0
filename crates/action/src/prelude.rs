//! Everything an integration module usually needs.

pub use futures::FutureExt;
pub use serde_json::{Map, Value, json};

pub use crate::{
    ActionError, ActionInput, ActionMetadata, ActionRegistry, Credentials, EnvelopeStyle,
    ErrorKind, ExecutionContext, HttpRequest, HttpResponse, PageRequest, RequestAuth,
    VendorResponse, encode_segment, encode_segment_keep, paginate, validate,
};
