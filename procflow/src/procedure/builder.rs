//! Fluent procedure configuration.
//!
//! A [`ProcedureBuilder`] accumulates the pipeline configuration one slot
//! at a time; every slot except the retry policy may be set at most once.
//! The terminal [`catch_all`](ProcedureBuilder::catch_all) (or
//! [`build`](ProcedureBuilder::build)) call validates the configuration
//! and freezes it into a [`Procedure`]. The builder/callable split is two
//! distinct types, so "configure after finalization" is unrepresentable.

use super::callable::Procedure;
use super::config::{CompleteFn, CompletionInfo, HandlerFn, HandlerParams, HookFn, TransformFn};
use super::processors::{OutputContract, SchemaArgs};
use crate::errors::{ConfigurationError, ProcedureError};
use crate::events::{EventSink, NoOpEventSink};
use crate::retry::RetryOptions;
use crate::schema::Schema;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

fn ensure_unset(already_set: bool, field: &str) -> Result<(), ConfigurationError> {
    if already_set {
        Err(ConfigurationError::duplicate(field))
    } else {
        Ok(())
    }
}

/// Creates independent procedure builders closed over a shared context
/// and transport client.
pub struct ProcedureFactory<Ctx, C> {
    ctx: Arc<Ctx>,
    client: Arc<C>,
    sink: Arc<dyn EventSink>,
}

impl<Ctx, C> Clone for ProcedureFactory<Ctx, C> {
    fn clone(&self) -> Self {
        Self {
            ctx: Arc::clone(&self.ctx),
            client: Arc::clone(&self.client),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<Ctx, C> ProcedureFactory<Ctx, C>
where
    Ctx: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Creates a factory over a context and client.
    #[must_use]
    pub fn new(ctx: Ctx, client: C) -> Self {
        Self {
            ctx: Arc::new(ctx),
            client: Arc::new(client),
            sink: Arc::new(NoOpEventSink),
        }
    }

    /// Sets the event sink handed to every builder this factory creates.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Starts a fresh, independent procedure configuration.
    #[must_use]
    pub fn procedure(&self) -> ProcedureBuilder<Ctx, C> {
        ProcedureBuilder::with_parts(
            Arc::clone(&self.ctx),
            Arc::clone(&self.client),
            Arc::clone(&self.sink),
        )
    }
}

/// Accumulates one procedure's configuration.
pub struct ProcedureBuilder<Ctx, C> {
    ctx: Arc<Ctx>,
    client: Arc<C>,
    sink: Arc<dyn EventSink>,
    input_schema: Option<Arc<dyn Schema>>,
    output_contract: Option<OutputContract<Ctx>>,
    retry: RetryOptions,
    transform: Option<TransformFn>,
    on_start: Option<HookFn>,
    on_success: Option<HookFn>,
    on_complete: Option<CompleteFn>,
    handler: Option<HandlerFn<Ctx, C>>,
}

impl<Ctx, C> std::fmt::Debug for ProcedureBuilder<Ctx, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcedureBuilder")
            .field("has_input_schema", &self.input_schema.is_some())
            .field("has_output_contract", &self.output_contract.is_some())
            .field("retry", &self.retry)
            .field("has_transform", &self.transform.is_some())
            .field("has_on_start", &self.on_start.is_some())
            .field("has_on_success", &self.on_success.is_some())
            .field("has_on_complete", &self.on_complete.is_some())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

impl<Ctx, C> ProcedureBuilder<Ctx, C>
where
    Ctx: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Creates a standalone builder over a context and client.
    #[must_use]
    pub fn new(ctx: Ctx, client: C) -> Self {
        Self::with_parts(Arc::new(ctx), Arc::new(client), Arc::new(NoOpEventSink))
    }

    pub(crate) fn with_parts(ctx: Arc<Ctx>, client: Arc<C>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            ctx,
            client,
            sink,
            input_schema: None,
            output_contract: None,
            retry: RetryOptions::default(),
            transform: None,
            on_start: None,
            on_success: None,
            on_complete: None,
            handler: None,
        }
    }

    /// Sets the input schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if an input schema was already set.
    pub fn input<S>(mut self, schema: S) -> Result<Self, ConfigurationError>
    where
        S: Schema + 'static,
    {
        ensure_unset(self.input_schema.is_some(), "input")?;
        self.input_schema = Some(Arc::new(schema));
        Ok(self)
    }

    /// Sets the hook that runs before anything else in the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the hook was already set.
    pub fn on_start<F, Fut>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProcedureError>> + Send + 'static,
    {
        ensure_unset(self.on_start.is_some(), "on_start")?;
        let hook: HookFn = Arc::new(move || Box::pin(f()));
        self.on_start = Some(hook);
        Ok(self)
    }

    /// Sets the hook that runs after output validation on the success path.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the hook was already set.
    pub fn on_success<F, Fut>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProcedureError>> + Send + 'static,
    {
        ensure_unset(self.on_success.is_some(), "on_success")?;
        let hook: HookFn = Arc::new(move || Box::pin(f()));
        self.on_success = Some(hook);
        Ok(self)
    }

    /// Replaces the retry policy wholesale.
    ///
    /// Unlike the other configurators this is overwriting, not single-use:
    /// the policy always has a sensible default state, so the latest call
    /// wins.
    #[must_use]
    pub fn retry(mut self, options: RetryOptions) -> Self {
        self.retry = options;
        self
    }

    /// Sets the main handler.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if a handler was already set.
    pub fn handler<F, Fut>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(HandlerParams<Ctx, C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ProcedureError>> + Send + 'static,
    {
        ensure_unset(self.handler.is_some(), "handler")?;
        let handler: HandlerFn<Ctx, C> = Arc::new(move |params| Box::pin(f(params)));
        self.handler = Some(handler);
        Ok(self)
    }

    /// Sets a fixed output schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if an output contract was already
    /// set (by either this or [`output_fn`](Self::output_fn)).
    pub fn output<S>(mut self, schema: S) -> Result<Self, ConfigurationError>
    where
        S: Schema + 'static,
    {
        ensure_unset(self.output_contract.is_some(), "output")?;
        self.output_contract = Some(OutputContract::Static(Arc::new(schema)));
        Ok(self)
    }

    /// Sets a dynamic output schema chosen per call from the context,
    /// input, and output.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if an output contract was already
    /// set (by either this or [`output`](Self::output)).
    pub fn output_fn<F>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(SchemaArgs<Ctx>) -> Arc<dyn Schema> + Send + Sync + 'static,
    {
        ensure_unset(self.output_contract.is_some(), "output")?;
        self.output_contract = Some(OutputContract::Dynamic(Arc::new(f)));
        Ok(self)
    }

    /// Sets the transform applied to the handler output before output
    /// validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if a transform was already set.
    pub fn transform<F, Fut>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, ProcedureError>> + Send + 'static,
    {
        ensure_unset(self.transform.is_some(), "transform")?;
        let transform: TransformFn = Arc::new(move |output| Box::pin(f(output)));
        self.transform = Some(transform);
        Ok(self)
    }

    /// Sets the hook that runs exactly once after every call, on both the
    /// success and failure paths. Its own failure is logged and
    /// suppressed, never surfaced.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the hook was already set.
    pub fn on_complete<F, Fut>(mut self, f: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(CompletionInfo) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ProcedureError>> + Send + 'static,
    {
        ensure_unset(self.on_complete.is_some(), "on_complete")?;
        let hook: CompleteFn = Arc::new(move |info| Box::pin(f(info)));
        self.on_complete = Some(hook);
        Ok(self)
    }

    /// Sets the terminal error mapper and freezes the configuration into
    /// a callable [`Procedure`].
    ///
    /// This is the single transition out of the builder state; the
    /// builder is consumed, so a second terminal call cannot be written.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] with field `handler` when no
    /// handler was configured.
    pub fn catch_all<E, F>(self, f: F) -> Result<Procedure<Ctx, C, E>, ConfigurationError>
    where
        F: Fn(ProcedureError) -> E + Send + Sync + 'static,
    {
        let Some(handler) = self.handler else {
            return Err(ConfigurationError::missing_handler());
        };
        Ok(Procedure {
            ctx: self.ctx,
            client: self.client,
            sink: self.sink,
            input_schema: self.input_schema,
            output_contract: self.output_contract,
            retry: self.retry,
            transform: self.transform,
            on_start: self.on_start,
            on_success: self.on_success,
            on_complete: self.on_complete,
            handler,
            catch_all: Arc::new(f),
        })
    }

    /// Freezes the configuration with an identity error mapper.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] with field `handler` when no
    /// handler was configured.
    pub fn build(self) -> Result<Procedure<Ctx, C, ProcedureError>, ConfigurationError> {
        self.catch_all(|error| error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypedSchema;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Ping {
        target: String,
    }

    fn factory() -> ProcedureFactory<(), ()> {
        ProcedureFactory::new((), ())
    }

    #[test]
    fn test_factory_builders_are_independent() {
        let factory = factory();
        let first = factory
            .procedure()
            .input(TypedSchema::<Ping>::new())
            .unwrap();
        // A sibling builder starts with a free input slot
        let second = factory.procedure().input(TypedSchema::<Ping>::new());
        assert!(second.is_ok());
        drop(first);
    }

    #[test]
    fn test_duplicate_input_fails() {
        let result = factory()
            .procedure()
            .input(TypedSchema::<Ping>::new())
            .unwrap()
            .input(TypedSchema::<Ping>::new());

        let error = result.unwrap_err();
        assert_eq!(error.message, "input() can only be called once");
        assert_eq!(error.field, Some("input".to_string()));
    }

    #[test]
    fn test_duplicate_handler_fails() {
        let result = factory()
            .procedure()
            .handler(|_| async { Ok(serde_json::json!(1)) })
            .unwrap()
            .handler(|_| async { Ok(serde_json::json!(2)) });

        assert_eq!(
            result.unwrap_err().message,
            "handler() can only be called once"
        );
    }

    #[test]
    fn test_duplicate_hooks_fail() {
        let result = factory()
            .procedure()
            .on_start(|| async { Ok(()) })
            .unwrap()
            .on_start(|| async { Ok(()) });
        assert!(result.is_err());

        let result = factory()
            .procedure()
            .on_complete(|_| async { Ok(()) })
            .unwrap()
            .on_complete(|_| async { Ok(()) });
        assert!(result.is_err());
    }

    #[test]
    fn test_output_slot_is_shared_between_forms() {
        let result = factory()
            .procedure()
            .output(TypedSchema::<Ping>::new())
            .unwrap()
            .output_fn(|_| Arc::new(TypedSchema::<Ping>::new()));

        assert_eq!(
            result.unwrap_err().message,
            "output() can only be called once"
        );
    }

    #[test]
    fn test_retry_overwrites_instead_of_failing() {
        let builder = factory()
            .procedure()
            .retry(RetryOptions::new().with_retries(2))
            .retry(RetryOptions::new().with_retries(5));

        assert_eq!(builder.retry.retries, 5);
    }

    #[test]
    fn test_catch_all_without_handler_fails() {
        let result = factory()
            .procedure()
            .catch_all(|error| error.to_string());

        let error = result.unwrap_err();
        assert_eq!(error.field, Some("handler".to_string()));
    }

    #[test]
    fn test_build_without_handler_fails() {
        assert!(factory().procedure().build().is_err());
    }

    #[test]
    fn test_full_chain_builds() {
        let procedure = factory()
            .procedure()
            .input(TypedSchema::<Ping>::new())
            .unwrap()
            .on_start(|| async { Ok(()) })
            .unwrap()
            .retry(RetryOptions::new().with_retries(3).with_delay_millis(1))
            .handler(|params| async move { Ok(params.input) })
            .unwrap()
            .transform(|output| async move { Ok(output) })
            .unwrap()
            .on_success(|| async { Ok(()) })
            .unwrap()
            .on_complete(|_| async { Ok(()) })
            .unwrap()
            .catch_all(|error| error.to_value());

        assert!(procedure.is_ok());
    }
}
