//! Envelope policy: every outcome becomes one JSON object.
//!
//! ```text
//! Start ── validate ──▶ ValidationFailed   {<status>:false, error, error_type:"validation_error"}
//!   │
//!   └──▶ Dispatched ──▶ Normalized         {<status>:true, ...payload}
//!             │
//!             └──▶ Classified              {<status>:false, error, [error_type], [error_code], ...}
//!                   (or a rate-limit advisory when the integration opts in)
//! ```

use std::borrow::Cow;

use serde_json::{Map, Value};

use crate::advisory::RateLimitAdvisory;
use crate::error::ActionError;
use crate::input::ActionInput;

/// Terminal state reached by one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input rejected before dispatch.
    ValidationFailed,
    /// All calls succeeded and the payload was normalised.
    Normalized,
    /// A call failed and the failure was classified.
    Classified,
}

impl Outcome {
    /// State reached for a given action result.
    pub fn of<T>(result: &Result<T, ActionError>) -> Self {
        match result {
            Ok(_) => Self::Normalized,
            Err(err) if err.is_validation() => Self::ValidationFailed,
            Err(_) => Self::Classified,
        }
    }
}

/// Name of the boolean status field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusKey {
    /// `result` (most integrations)
    #[default]
    Result,
    /// `success` (WhatsApp)
    Success,
}

impl StatusKey {
    /// Field name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Result => "result",
            Self::Success => "success",
        }
    }
}

/// Retry advisory policy for integrations that emit advisories on 429.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryPolicy {
    /// Vendor display name used in advisory wording.
    pub vendor: Cow<'static, str>,
    /// Retry ceiling.
    pub max_retries: u32,
}

/// How one action shapes its envelope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvelopeStyle {
    /// Status field name.
    pub status_key: StatusKey,
    /// Include `error_type` on failures.
    pub error_type: bool,
    /// Include `error_code` (empty string when unknown) on failures.
    pub error_code: bool,
    /// Prefix for failures raised at the network boundary
    /// (`"Failed to send message"` renders `"Failed to send message: <e>"`).
    pub error_prefix: Option<Cow<'static, str>>,
    /// Success-shape defaults merged under every failure.
    pub failure_defaults: Map<String, Value>,
    /// Emit a rate-limit advisory instead of a plain failure on 429.
    pub advisory: Option<AdvisoryPolicy>,
}

impl EnvelopeStyle {
    /// `{result: ...}` style with no extra failure fields.
    pub fn result() -> Self {
        Self::default()
    }

    /// `{success: ...}` style.
    pub fn success() -> Self {
        Self {
            status_key: StatusKey::Success,
            ..Self::default()
        }
    }

    /// Include `error_type` on failures.
    pub fn with_error_type(mut self) -> Self {
        self.error_type = true;
        self
    }

    /// Include `error_code` on failures.
    pub fn with_error_code(mut self) -> Self {
        self.error_code = true;
        self
    }

    /// Prefix network-boundary failure messages.
    pub fn with_error_prefix(mut self, prefix: impl Into<Cow<'static, str>>) -> Self {
        self.error_prefix = Some(prefix.into());
        self
    }

    /// Merge `defaults` (an object) under every failure.
    pub fn with_failure_defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.failure_defaults = map;
        }
        self
    }

    /// Emit rate-limit advisories worded for `vendor`.
    pub fn with_advisory(mut self, vendor: impl Into<Cow<'static, str>>) -> Self {
        self.advisory = Some(AdvisoryPolicy {
            vendor: vendor.into(),
            max_retries: crate::advisory::MAX_RATE_LIMIT_RETRIES,
        });
        self
    }

    /// Wrap a normalised payload. Non-object payloads land under `data`.
    pub fn render_success(&self, payload: Value) -> Value {
        let mut out = match payload {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".into(), other);
                map
            }
        };
        out.insert(self.status_key.as_str().into(), Value::Bool(true));
        Value::Object(out)
    }

    /// Render a failure.
    pub fn render_failure(&self, err: &ActionError, action: &str, input: &ActionInput) -> Value {
        if let Some(policy) = &self.advisory
            && let Some(advisory) = RateLimitAdvisory::detect(&policy.vendor, err, input.retry_attempt())
        {
            return advisory
                .with_max_retries(policy.max_retries)
                .with_action(action)
                .with_empty_data(self.failure_defaults.clone())
                .to_envelope(self.status_key.as_str());
        }

        let mut out = self.failure_defaults.clone();
        out.insert(self.status_key.as_str().into(), Value::Bool(false));

        let message = match (&self.error_prefix, err.is_api()) {
            (Some(prefix), true) => format!("{prefix}: {err}"),
            _ => err.to_string(),
        };
        out.insert("error".into(), Value::String(message));

        if self.error_type {
            out.insert("error_type".into(), Value::String(err.kind().as_str().into()));
        }
        if self.error_code {
            out.insert(
                "error_code".into(),
                Value::String(err.code().unwrap_or_default().into()),
            );
        }
        if let ActionError::Vendor { fields, .. } = err {
            for (k, v) in fields {
                out.insert(k.clone(), v.clone());
            }
        }

        Value::Object(out)
    }
}

/// Whether an envelope reports success under either status key.
pub fn is_success(envelope: &Value) -> bool {
    [StatusKey::Result, StatusKey::Success]
        .iter()
        .any(|k| envelope.get(k.as_str()).and_then(Value::as_bool) == Some(true))
}
