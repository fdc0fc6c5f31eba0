use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::error::{ActionError, ErrorKind};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// Credentials supplied by the host for one invocation.
///
/// Values are held as secrets: `Debug` lists key names only.
#[derive(Default)]
pub struct Credentials {
    values: HashMap<String, SecretString>,
}

impl Credentials {
    /// Create an empty credential set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a credential, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a credential.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(key.into(), SecretString::from(value.into()));
    }

    /// Build from a host auth document.
    ///
    /// Accepts either a flat object or one nested under `"credentials"`.
    /// Non-string scalars are stringified; nested objects are skipped.
    pub fn from_json(auth: &Value) -> Self {
        let source = auth.get("credentials").unwrap_or(auth);
        let mut creds = Self::new();
        if let Some(map) = source.as_object() {
            for (key, value) in map {
                match value {
                    Value::String(s) => creds.insert(key.clone(), s.clone()),
                    Value::Number(n) => creds.insert(key.clone(), n.to_string()),
                    Value::Bool(b) => creds.insert(key.clone(), b.to_string()),
                    _ => {}
                }
            }
        }
        creds
    }

    /// Look up a non-empty credential.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
    }

    /// Returns `true` if a non-empty credential exists under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Sorted key names.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.values.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Everything an action may touch while it runs: credentials, the HTTP
/// transport, client configuration and a cancellation token.
///
/// Cheap to clone; the host builds one per invocation and the action only
/// borrows it for the duration of the call.
#[derive(Clone)]
#[non_exhaustive]
pub struct ExecutionContext {
    credentials: Arc<Credentials>,
    transport: Arc<dyn HttpTransport>,
    config: Arc<ClientConfig>,
    /// Cancellation token for cooperative cancellation.
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    /// Create a context over `transport` with no credentials and default
    /// configuration.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            credentials: Arc::new(Credentials::new()),
            transport,
            config: Arc::new(ClientConfig::default()),
            cancellation: CancellationToken::new(),
        }
    }

    /// Attach credentials.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Attach client configuration.
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Set a custom cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Credentials for this invocation.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Required credential; a missing one is an `auth_error`.
    pub fn credential(&self, key: &str) -> Result<&str, ActionError> {
        self.credentials.get(key).ok_or_else(|| {
            ActionError::api(ErrorKind::AuthError, format!("missing credential `{key}`"))
        })
    }

    /// First credential present among `keys`.
    pub fn credential_any(&self, keys: &[&str]) -> Result<&str, ActionError> {
        keys.iter()
            .find_map(|k| self.credentials.get(k))
            .ok_or_else(|| {
                ActionError::api(
                    ErrorKind::AuthError,
                    format!(
                        "Missing {} in auth context. Available keys: {:?}",
                        keys.first().copied().unwrap_or("credential"),
                        self.credentials.keys()
                    ),
                )
            })
    }

    /// OAuth bearer token (`access_token`, falling back to `token`).
    pub fn bearer_token(&self) -> Result<&str, ActionError> {
        self.credential_any(&["access_token", "token"])
    }

    /// Base URL for `vendor`, honouring configured overrides.
    pub fn base_url(&self, vendor: &str, default: &str) -> String {
        self.config.base_url(vendor, default)
    }

    /// Returns `true` if cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Check cancellation; returns `Err(Cancelled)` if requested.
    pub fn check_cancelled(&self) -> Result<(), ActionError> {
        if self.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Send a request and return the raw response, whatever its status.
    pub async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ActionError> {
        self.check_cancelled()?;
        tracing::debug!(method = %request.method, url = %request.url, "dispatching request");

        tokio::select! {
            () = self.cancellation.cancelled() => Err(ActionError::Cancelled),
            result = self.transport.send(request) => {
                let response = result?;
                tracing::debug!(status = response.status, "response received");
                Ok(response)
            }
        }
    }

    /// Send a request and return its JSON body; non-2xx becomes a
    /// classified [`ActionError`].
    pub async fn fetch(&self, request: HttpRequest) -> Result<Value, ActionError> {
        let response = self.send(request).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(status_error(&response))
        }
    }
}

/// Classified error for a non-2xx response.
///
/// The message reads `"HTTP <status>: <vendor message or reason>"`.
pub fn status_error(response: &HttpResponse) -> ActionError {
    let detail = response.error_message().unwrap_or_else(|| {
        http::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown error")
            .to_string()
    });
    let err = ActionError::http(response.status, format!("HTTP {}: {detail}", response.status))
        .with_retry_after(response.retry_after());
    tracing::warn!(status = response.status, kind = %err.kind(), "request failed");
    err
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("credentials", &self.credentials)
            .field("config", &self.config)
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}
