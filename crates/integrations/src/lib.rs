//! # Nebula Integrations
//!
//! One registry holding every vendor action, and the single entry point
//! hosts call:
//!
//! ```rust,no_run
//! # async fn run() -> Result<(), nebula_integrations::HostError> {
//! use serde_json::json;
//!
//! let _log = nebula_integrations::init_logging()?;
//! let ctx = nebula_integrations::context_from_env(&json!({"access_token": "..."}))?;
//! let envelope = nebula_integrations::execute_action(
//!     "bitly.shorten_url",
//!     json!({"long_url": "https://example.com/a/very/long/path"}),
//!     ctx,
//! )
//! .await;
//! assert!(nebula_integrations::is_success(&envelope));
//! # Ok(())
//! # }
//! ```
//!
//! Action names are `<category>.<action>`; categories are the vendor
//! crates' `CATEGORY` constants.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::sync::{Arc, LazyLock};

pub use nebula_action::{
    ActionRegistry, ClientConfig, Credentials, ExecutionContext, is_success,
};
use nebula_action::{ReqwestTransport, TransportError};
use serde_json::Value;

pub use nebula_aws as aws;
pub use nebula_bigquery as bigquery;
pub use nebula_bitly as bitly;
pub use nebula_humanitix as humanitix;
pub use nebula_microsoft_excel as microsoft_excel;
pub use nebula_tiktok as tiktok;
pub use nebula_typeform as typeform;
pub use nebula_uber as uber;
pub use nebula_whatsapp as whatsapp;

/// Host setup failures.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HostError {
    /// HTTP client could not be built
    #[error("transport setup failed: {0}")]
    Transport(#[from] TransportError),

    /// Logging could not be installed
    #[error(transparent)]
    Log(#[from] nebula_log::LogError),
}

type Registrar = fn(&mut ActionRegistry);

const VENDORS: [Registrar; 9] = [
    nebula_aws::register,
    nebula_bigquery::register,
    nebula_bitly::register,
    nebula_humanitix::register,
    nebula_microsoft_excel::register,
    nebula_tiktok::register,
    nebula_typeform::register,
    nebula_uber::register,
    nebula_whatsapp::register,
];

static DEFAULT_REGISTRY: LazyLock<ActionRegistry> = LazyLock::new(default_registry);

/// A fresh registry with every vendor's actions.
pub fn default_registry() -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for register in VENDORS {
        register(&mut registry);
    }
    tracing::info!(actions = registry.len(), "integration registry populated");
    registry
}

/// Run `name` against the shared default registry.
///
/// Never fails: unknown names, bad inputs and vendor errors all come back
/// as failure envelopes.
pub async fn execute_action(name: &str, inputs: Value, ctx: ExecutionContext) -> Value {
    DEFAULT_REGISTRY.execute(name, inputs, ctx).await
}

/// Context backed by a real HTTP client, configured from the environment
/// (timeouts, user agent, `<VENDOR>_API_BASE_URL`) with credentials taken
/// from a host auth document.
pub fn context_from_env(auth: &Value) -> Result<ExecutionContext, HostError> {
    let config = ClientConfig::from_env();
    let transport = ReqwestTransport::with_config(&config)?;
    Ok(ExecutionContext::new(Arc::new(transport))
        .with_credentials(Credentials::from_json(auth))
        .with_config(config))
}

/// Install the global `tracing` subscriber, see [`nebula_log::auto_init`].
pub fn init_logging() -> Result<nebula_log::LoggerGuard, HostError> {
    Ok(nebula_log::auto_init()?)
}
