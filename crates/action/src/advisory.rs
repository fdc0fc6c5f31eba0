//! Rate-limit advisories: retry returned as data, never as control flow.
//!
//! When a vendor answers 429 the action does not sleep or loop. It returns
//! an advisory telling the caller how long to wait and whether another
//! attempt is allowed; the caller echoes `_retry_attempt` back on the next
//! call.

use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::error::{ActionError, ErrorKind};

/// Retry ceiling shared by every integration that emits advisories.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Wait used when the vendor sent no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// `error_type` carried by advisory envelopes.
pub const RATE_LIMIT_ERROR_TYPE: &str = "rate_limit";

/// Structured, stateless description of a 429 condition.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitAdvisory {
    /// Vendor display name used in the wording (`"Typeform"`).
    pub vendor: String,
    /// Seconds the caller should wait.
    pub retry_after_seconds: u64,
    /// Attempt number supplied by the caller, zero-based.
    pub retry_attempt: u32,
    /// Retry ceiling.
    pub max_retries: u32,
    /// Action key echoed back as `action`.
    pub action: Option<String>,
    /// Success-shape defaults merged first, so the caller sees the same keys
    /// whether it got data or a notice.
    pub empty_data: Map<String, Value>,
}

impl RateLimitAdvisory {
    /// Advisory with the default ceiling and no action tag.
    pub fn new(vendor: impl Into<String>, retry_after: Duration, retry_attempt: u32) -> Self {
        Self {
            vendor: vendor.into(),
            retry_after_seconds: retry_after.as_secs(),
            retry_attempt,
            max_retries: MAX_RATE_LIMIT_RETRIES,
            action: None,
            empty_data: Map::new(),
        }
    }

    /// Build an advisory for `err` if it is a rate-limit failure.
    ///
    /// Uses the vendor `Retry-After` when present, otherwise
    /// [`DEFAULT_RETRY_AFTER`].
    pub fn detect(vendor: &str, err: &ActionError, retry_attempt: u32) -> Option<Self> {
        if err.kind() != ErrorKind::RateLimited {
            return None;
        }
        let wait = err.retry_after().unwrap_or(DEFAULT_RETRY_AFTER);
        Some(Self::new(vendor, wait, retry_attempt))
    }

    /// Set the retry ceiling.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Tag the advisory with the action key.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into()).filter(|a: &String| !a.is_empty());
        self
    }

    /// Set the success-shape defaults.
    pub fn with_empty_data(mut self, empty_data: Map<String, Value>) -> Self {
        self.empty_data = empty_data;
        self
    }

    /// Whether the caller may try again.
    pub fn can_retry(&self) -> bool {
        self.retry_attempt < self.max_retries
    }

    /// Human-readable error for the current state.
    pub fn error_message(&self) -> String {
        let wait = self.retry_after_seconds;
        if self.can_retry() {
            format!(
                "Rate limit exceeded. Please wait {wait} seconds before retrying. \
                 This is attempt {} of {} allowed attempts.",
                self.retry_attempt + 1,
                self.max_retries + 1
            )
        } else {
            format!(
                "Rate limit exceeded and maximum retry attempts ({}) exhausted. \
                 The {} API requires waiting {wait} seconds between requests. \
                 Please try again later or reduce request frequency.",
                self.max_retries, self.vendor
            )
        }
    }

    /// Instructions for the caller. Exhausted advisories always contain
    /// "Do not retry".
    pub fn retry_instructions(&self) -> String {
        if self.can_retry() {
            format!(
                "To retry: wait at least {} seconds, then call this action again \
                 with _retry_attempt={}. You have {} retries remaining.",
                self.retry_after_seconds,
                self.retry_attempt + 1,
                self.max_retries - self.retry_attempt
            )
        } else {
            format!(
                "Maximum retries exceeded. Do not retry automatically. \
                 Inform the user that the {} API rate limit has been reached.",
                self.vendor
            )
        }
    }

    /// Render the advisory envelope under `status_key`.
    pub fn to_envelope(&self, status_key: &str) -> Value {
        let mut out = self.empty_data.clone();
        out.insert(status_key.to_string(), Value::Bool(false));
        out.insert("error".into(), Value::String(self.error_message()));
        out.insert("error_type".into(), json!(RATE_LIMIT_ERROR_TYPE));
        out.insert("retry_after_seconds".into(), json!(self.retry_after_seconds));
        out.insert("retry_attempt".into(), json!(self.retry_attempt));
        out.insert("max_retries".into(), json!(self.max_retries));
        out.insert("can_retry".into(), json!(self.can_retry()));
        out.insert("retry_instructions".into(), Value::String(self.retry_instructions()));
        if let Some(action) = &self.action {
            out.insert("action".into(), Value::String(action.clone()));
        }
        Value::Object(out)
    }
}
