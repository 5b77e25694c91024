//! Callback types and per-call records for the procedure pipeline.

use crate::errors::ProcedureError;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;

/// Parameters passed to the main handler on each attempt.
///
/// `input` is the validated/coerced input, not the raw caller-supplied
/// value: schema defaults and coercions are visible to the handler.
pub struct HandlerParams<Ctx, C> {
    /// The validated input value.
    pub input: Value,
    /// The context value fixed at builder creation.
    pub ctx: Arc<Ctx>,
    /// The transport client fixed at builder creation.
    pub client: Arc<C>,
}

/// Type-erased main handler.
pub type HandlerFn<Ctx, C> = Arc<
    dyn Fn(HandlerParams<Ctx, C>) -> BoxFuture<'static, Result<Value, ProcedureError>>
        + Send
        + Sync,
>;

/// Type-erased output transform.
pub type TransformFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value, ProcedureError>> + Send + Sync>;

/// Type-erased zero-argument lifecycle hook.
pub type HookFn = Arc<dyn Fn() -> BoxFuture<'static, Result<(), ProcedureError>> + Send + Sync>;

/// Type-erased completion hook.
pub type CompleteFn =
    Arc<dyn Fn(CompletionInfo) -> BoxFuture<'static, Result<(), ProcedureError>> + Send + Sync>;

/// Summary delivered to the completion hook, exactly once per call.
#[derive(Debug, Clone)]
pub struct CompletionInfo {
    /// True when the pipeline ran to the end.
    pub is_success: bool,
    /// True when any stage failed; always the negation of `is_success`.
    pub is_error: bool,
    /// The post-validation input, or the raw input when input validation
    /// itself failed.
    pub input: Value,
    /// Whatever output had been computed when the call settled.
    pub output: Option<Value>,
    /// The caught error; present iff `is_error`.
    pub error: Option<ProcedureError>,
}

impl CompletionInfo {
    /// Builds the success-path summary.
    #[must_use]
    pub fn success(input: Value, output: Option<Value>) -> Self {
        Self {
            is_success: true,
            is_error: false,
            input,
            output,
            error: None,
        }
    }

    /// Builds the failure-path summary.
    #[must_use]
    pub fn failure(input: Value, output: Option<Value>, error: ProcedureError) -> Self {
        Self {
            is_success: false,
            is_error: true,
            input,
            output,
            error: Some(error),
        }
    }
}
