use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;

use serde_json::{Value, json};
use tracing::Instrument;

use crate::action::{Action, ActionFuture, FnAction};
use crate::context::ExecutionContext;
use crate::envelope::Outcome;
use crate::error::{ActionError, ErrorKind};
use crate::input::ActionInput;
use crate::metadata::ActionMetadata;

/// Explicit registry mapping action keys to handlers.
///
/// Populated once at startup by each integration's `register` function and
/// then shared read-only (typically behind an `Arc`). There is no global
/// registry.
///
/// # Example
///
/// ```rust
/// use futures::FutureExt;
/// use nebula_action::{ActionError, ActionInput, ActionMetadata, ActionRegistry, ExecutionContext};
/// use serde_json::{Value, json};
///
/// async fn ping(_input: ActionInput, _ctx: ExecutionContext) -> Result<Value, ActionError> {
///     Ok(json!({"pong": true}))
/// }
///
/// let mut registry = ActionRegistry::new();
/// registry.register_fn(ActionMetadata::new("demo", "ping", "Ping"), |i, c| ping(i, c).boxed());
///
/// assert!(registry.contains("demo.ping"));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Default)]
pub struct ActionRegistry {
    actions: HashMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an action. Overwrites any existing action with the same key.
    pub fn register(&mut self, action: impl Action) {
        let key = action.metadata().key.clone();
        self.actions.insert(key, Arc::new(action));
    }

    /// Register a plain async function as an action.
    pub fn register_fn<F>(&mut self, metadata: ActionMetadata, handler: F)
    where
        F: Fn(ActionInput, ExecutionContext) -> ActionFuture + Send + Sync + 'static,
    {
        self.register(FnAction::new(metadata, handler));
    }

    /// Register an `async fn(ActionInput, ExecutionContext)` directly.
    pub fn register_async<F, Fut>(&mut self, metadata: ActionMetadata, handler: F)
    where
        F: Fn(ActionInput, ExecutionContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ActionError>> + Send + 'static,
    {
        self.register_fn(metadata, move |input, ctx| handler(input, ctx).boxed());
    }

    /// Look up an action by its key.
    pub fn get(&self, key: &str) -> Option<&Arc<dyn Action>> {
        self.actions.get(key)
    }

    /// Check whether an action with the given key is registered.
    pub fn contains(&self, key: &str) -> bool {
        self.actions.contains_key(key)
    }

    /// Metadata for all registered actions, sorted by key.
    pub fn list(&self) -> Vec<&ActionMetadata> {
        let mut all: Vec<&ActionMetadata> = self.actions.values().map(|a| a.metadata()).collect();
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    /// Keys registered under one vendor category, sorted.
    pub fn keys_in(&self, category: &str) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .actions
            .values()
            .map(|a| a.metadata())
            .filter(|m| m.category == category)
            .map(|m| m.key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns `true` if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate over all registered `(key, action)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Action>)> {
        self.actions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Run one action and return its envelope.
    ///
    /// This is the invocation boundary: it never fails and never panics on
    /// bad input. Unknown keys and malformed inputs come back as
    /// `validation_error` envelopes.
    pub async fn execute(&self, key: &str, inputs: Value, ctx: ExecutionContext) -> Value {
        let Some(action) = self.get(key) else {
            tracing::warn!(action = key, "unknown action");
            return json!({
                "result": false,
                "error": format!("Unknown action: {key}"),
                "error_type": ErrorKind::ValidationError.as_str(),
            });
        };
        let meta = action.metadata();
        let span = tracing::info_span!("action", action = %meta.key);

        let input = match ActionInput::from_value(inputs) {
            Ok(input) => input,
            Err(err) => {
                return meta
                    .envelope
                    .render_failure(&err, meta.name(), &ActionInput::default());
            }
        };

        let result: Result<Value, ActionError> = action
            .execute(input.clone(), ctx)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match (&result, Outcome::of(&result)) {
            (Err(err), Outcome::Classified) => {
                tracing::warn!(kind = %err.kind(), error = %err, "action failed");
            }
            (_, Outcome::ValidationFailed) => tracing::debug!("input rejected before dispatch"),
            _ => tracing::debug!("action succeeded"),
        });

        match result {
            Ok(payload) => meta.envelope.render_success(payload),
            Err(err) => meta.envelope.render_failure(&err, meta.name(), &input),
        }
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("count", &self.actions.len())
            .field("keys", &self.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::envelope::EnvelopeStyle;
    use crate::testing::MockTransport;
    use crate::transport::HttpRequest;

    async fn echo(input: ActionInput, _ctx: ExecutionContext) -> Result<Value, ActionError> {
        let name = input.require_str("name")?;
        Ok(json!({ "greeting": format!("hi {name}") }))
    }

    async fn call_out(_input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> {
        ctx.fetch(HttpRequest::get("https://api.example.com/things")).await
    }

    fn registry() -> ActionRegistry {
        let mut reg = ActionRegistry::new();
        reg.register_fn(
            ActionMetadata::new("demo", "echo", "Echo a name")
                .with_envelope(EnvelopeStyle::result().with_error_type()),
            |i, c| echo(i, c).boxed(),
        );
        reg.register_fn(
            ActionMetadata::new("demo", "call_out", "Call out"),
            |i, c| call_out(i, c).boxed(),
        );
        reg
    }

    fn ctx() -> ExecutionContext {
        ExecutionContext::new(Arc::new(MockTransport::new()))
    }

    #[test]
    fn empty_registry() {
        let reg = ActionRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.get("anything").is_none());
    }

    #[test]
    fn register_and_list() {
        let reg = registry();
        assert_eq!(reg.len(), 2);
        assert!(reg.contains("demo.echo"));
        assert_eq!(reg.keys_in("demo"), vec!["demo.call_out", "demo.echo"]);
        assert_eq!(reg.list()[0].key, "demo.call_out");
    }

    #[tokio::test]
    async fn success_is_enveloped() {
        let out = registry()
            .execute("demo.echo", json!({"name": "ada"}), ctx())
            .await;
        assert_eq!(out, json!({"result": true, "greeting": "hi ada"}));
    }

    #[tokio::test]
    async fn missing_field_is_validation_envelope() {
        let out = registry().execute("demo.echo", json!({}), ctx()).await;
        assert_eq!(
            out,
            json!({"result": false, "error": "name is required", "error_type": "validation_error"})
        );
    }

    #[tokio::test]
    async fn unknown_action_never_panics() {
        let out = registry().execute("demo.nope", json!({}), ctx()).await;
        assert_eq!(out["result"], json!(false));
        assert_eq!(out["error"], json!("Unknown action: demo.nope"));
    }

    #[tokio::test]
    async fn non_object_inputs_are_rejected() {
        let out = registry().execute("demo.echo", json!("hello"), ctx()).await;
        assert_eq!(out["error_type"], json!("validation_error"));
    }

    #[tokio::test]
    async fn network_failures_become_envelopes() {
        let out = registry().execute("demo.call_out", json!({}), ctx()).await;
        assert_eq!(out["result"], json!(false));
        assert!(out["error"].as_str().unwrap().starts_with("HTTP 404"));
    }
}
