//! The callable procedure: the frozen pipeline executor.
//!
//! One invocation runs the fixed stage sequence exactly once and always
//! resolves to a [`CallResult`]; no stage failure escapes the call. Each
//! invocation owns its local state, so concurrent calls to the same
//! procedure never interfere; the only shared state is the frozen
//! configuration, which is read-only.

use super::config::{CompleteFn, CompletionInfo, HandlerFn, HandlerParams, HookFn, TransformFn};
use super::hooks::{run_hook, HookStage};
use super::processors::{process_input, process_output, OutputContract};
use crate::errors::ProcedureError;
use crate::events::{names, EventSink};
use crate::observability::{generate_call_id, SpanTimer};
use crate::retry::{run_with_retry, RetryOptions};
use crate::schema::Schema;
use serde_json::Value;
use std::sync::Arc;

/// The tagged outcome of one procedure call.
///
/// Exactly one of `data`/`error` is populated. Callers branch on
/// [`is_success`](Self::is_success) rather than catching anything.
#[derive(Debug, Clone)]
pub struct CallResult<E = ProcedureError> {
    data: Option<Value>,
    error: Option<E>,
}

impl<E> CallResult<E> {
    pub(crate) fn success(data: Value) -> Self {
        Self {
            data: Some(data),
            error: None,
        }
    }

    pub(crate) fn failure(error: E) -> Self {
        Self {
            data: None,
            error: Some(error),
        }
    }

    /// Returns true when the call produced data.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Returns true when the call produced an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The output value, when the call succeeded.
    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// The mapped error, when the call failed.
    #[must_use]
    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    /// Converts into a standard `Result`.
    pub fn into_result(self) -> Result<Value, E> {
        if let Some(error) = self.error {
            Err(error)
        } else {
            Ok(self.data.unwrap_or(Value::Null))
        }
    }
}

/// Per-invocation mutable state, local to one call.
struct CallState {
    input: Value,
    output: Option<Value>,
}

/// A finalized, invocable procedure pipeline.
///
/// Produced only by the builder's terminal transition, so a handler is
/// always present. Cheap to share: all configuration is behind `Arc`s.
pub struct Procedure<Ctx, C, E = ProcedureError> {
    pub(crate) ctx: Arc<Ctx>,
    pub(crate) client: Arc<C>,
    pub(crate) sink: Arc<dyn EventSink>,
    pub(crate) input_schema: Option<Arc<dyn Schema>>,
    pub(crate) output_contract: Option<OutputContract<Ctx>>,
    pub(crate) retry: RetryOptions,
    pub(crate) transform: Option<TransformFn>,
    pub(crate) on_start: Option<HookFn>,
    pub(crate) on_success: Option<HookFn>,
    pub(crate) on_complete: Option<CompleteFn>,
    pub(crate) handler: HandlerFn<Ctx, C>,
    pub(crate) catch_all: Arc<dyn Fn(ProcedureError) -> E + Send + Sync>,
}

impl<Ctx, C, E> std::fmt::Debug for Procedure<Ctx, C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("has_input_schema", &self.input_schema.is_some())
            .field("has_output_contract", &self.output_contract.is_some())
            .field("retry", &self.retry)
            .field("has_transform", &self.transform.is_some())
            .field("has_on_start", &self.on_start.is_some())
            .field("has_on_success", &self.on_success.is_some())
            .field("has_on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl<Ctx, C, E> Procedure<Ctx, C, E>
where
    Ctx: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Runs the pipeline once for a raw input value.
    pub async fn call(&self, input: Value) -> CallResult<E> {
        let call_id = generate_call_id();
        let timer = SpanTimer::start();
        self.sink.try_emit(
            names::CALL_STARTED,
            Some(serde_json::json!({"call_id": call_id})),
        );

        let mut state = CallState {
            input,
            output: None,
        };
        match self.run_stages(&mut state).await {
            Ok(()) => {
                self.complete(&state, None).await;
                self.sink.try_emit(
                    names::CALL_SUCCEEDED,
                    Some(serde_json::json!({
                        "call_id": call_id,
                        "duration_ms": timer.elapsed_ms(),
                    })),
                );
                CallResult::success(state.output.take().unwrap_or(Value::Null))
            }
            Err(error) => {
                self.complete(&state, Some(&error)).await;
                self.sink.try_emit(
                    names::CALL_FAILED,
                    Some(serde_json::json!({
                        "call_id": call_id,
                        "error": error.kind(),
                        "duration_ms": timer.elapsed_ms(),
                    })),
                );
                CallResult::failure((self.catch_all)(error))
            }
        }
    }

    /// Runs the pipeline with the empty-object default input, for
    /// handlers that ignore their input.
    pub async fn call_empty(&self) -> CallResult<E> {
        self.call(Value::Object(serde_json::Map::new())).await
    }

    /// The linear stage sequence. Any `Err` here diverts to the failure
    /// path in [`call`](Self::call); `state` keeps whatever the pipeline
    /// had computed when the failure happened.
    async fn run_stages(&self, state: &mut CallState) -> Result<(), ProcedureError> {
        run_hook(HookStage::OnStart, self.on_start.as_ref()).await?;

        state.input = process_input(&state.input, self.input_schema.as_ref())?;

        let handler = Arc::clone(&self.handler);
        let input = state.input.clone();
        let ctx = Arc::clone(&self.ctx);
        let client = Arc::clone(&self.client);
        let raw = run_with_retry(&self.retry, move || {
            handler(HandlerParams {
                input: input.clone(),
                ctx: Arc::clone(&ctx),
                client: Arc::clone(&client),
            })
        })
        .await?;

        let shaped = match &self.transform {
            Some(transform) => transform(raw).await?,
            None => raw,
        };

        // Store before validating so a validation failure still reports
        // the computed output to the completion hook.
        state.output = Some(shaped);
        if let Some(output) = state.output.as_ref() {
            let validated =
                process_output(output, self.output_contract.as_ref(), &self.ctx, &state.input)?;
            state.output = Some(validated);
        }

        run_hook(HookStage::OnSuccess, self.on_success.as_ref()).await?;
        Ok(())
    }

    /// Dispatches the completion hook, exactly once per call. A failure
    /// inside the hook must never mask the outcome already determined for
    /// this call, so it is logged and suppressed.
    async fn complete(&self, state: &CallState, error: Option<&ProcedureError>) {
        let Some(hook) = self.on_complete.as_ref() else {
            return;
        };
        let info = match error {
            None => CompletionInfo::success(state.input.clone(), state.output.clone()),
            Some(error) => {
                CompletionInfo::failure(state.input.clone(), state.output.clone(), error.clone())
            }
        };
        if let Err(hook_error) = hook(info).await {
            tracing::warn!(error = %hook_error, "onComplete hook failed; suppressed");
            self.sink.try_emit(
                names::ON_COMPLETE_FAILED,
                Some(serde_json::json!({"error": hook_error.to_string()})),
            );
        }
    }
}
