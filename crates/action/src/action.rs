use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::context::ExecutionContext;
use crate::error::ActionError;
use crate::input::ActionInput;
use crate::metadata::ActionMetadata;

/// One named operation against a vendor API.
///
/// Implementations validate `input`, issue calls through `ctx`, and return
/// the normalised payload. They never build the envelope themselves; the
/// registry wraps both `Ok` and `Err` according to
/// [`ActionMetadata::envelope`].
#[async_trait]
pub trait Action: Send + Sync + 'static {
    /// Returns the static metadata for this action.
    fn metadata(&self) -> &ActionMetadata;

    /// Run the action once.
    async fn execute(&self, input: ActionInput, ctx: ExecutionContext)
    -> Result<Value, ActionError>;
}

/// Boxed future returned by action handler functions.
pub type ActionFuture = BoxFuture<'static, Result<Value, ActionError>>;

/// Adapter that turns a plain async function into an [`Action`].
///
/// ```rust,ignore
/// async fn get_user(input: ActionInput, ctx: ExecutionContext) -> Result<Value, ActionError> { .. }
///
/// registry.register(FnAction::new(meta, |i, c| get_user(i, c).boxed()));
/// ```
pub struct FnAction<F> {
    metadata: ActionMetadata,
    handler: F,
}

impl<F> FnAction<F>
where
    F: Fn(ActionInput, ExecutionContext) -> ActionFuture + Send + Sync + 'static,
{
    /// Wrap `handler` with its metadata.
    pub fn new(metadata: ActionMetadata, handler: F) -> Self {
        Self { metadata, handler }
    }
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: Fn(ActionInput, ExecutionContext) -> ActionFuture + Send + Sync + 'static,
{
    fn metadata(&self) -> &ActionMetadata {
        &self.metadata
    }

    async fn execute(
        &self,
        input: ActionInput,
        ctx: ExecutionContext,
    ) -> Result<Value, ActionError> {
        (self.handler)(input, ctx).await
    }
}

impl<F> std::fmt::Debug for FnAction<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAction")
            .field("key", &self.metadata.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use futures::FutureExt;
    use serde_json::json;

    use super::*;

    async fn echo(input: ActionInput, _ctx: ExecutionContext) -> Result<Value, ActionError> {
        Ok(Value::Object(input.as_map().clone()))
    }

    #[tokio::test]
    async fn fn_action_runs_handler() {
        let action =
            FnAction::new(ActionMetadata::new("test", "echo", "Echo"), |i, c| echo(i, c).boxed());
        let ctx = ExecutionContext::new(std::sync::Arc::new(crate::testing::MockTransport::new()));
        let input = ActionInput::from_value(json!({"a": 1})).unwrap();

        let out = action.execute(input, ctx).await.unwrap();

        assert_eq!(out, json!({"a": 1}));
        assert_eq!(action.metadata().key, "test.echo");
    }
}
