//! # Procflow
//!
//! Composable procedure pipelines for HTTP calls.
//!
//! Procflow assembles, around a single HTTP operation, a pipeline of
//! input validation, retryable execution, transformation, output
//! validation, lifecycle hooks, and unified error handling, producing one
//! callable unit that never throws for runtime conditions and instead
//! resolves to a tagged result:
//!
//! - **Fluent configuration**: each pipeline slot is set at most once;
//!   the terminal `catch_all` freezes the builder into a callable
//! - **Status-aware retries**: client errors (4xx) fail fast, everything
//!   else retries under a fixed or computed backoff
//! - **Injected validation**: any `Schema` implementation, static or
//!   chosen per call from runtime state
//! - **Closed error taxonomy**: classifiable failure kinds with
//!   structured fields, no message-string matching
//! - **Injected observability**: event sinks and tracing, no globals
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use procflow::prelude::*;
//!
//! // Configure a procedure
//! let procedure = ProcedureFactory::new(ctx, client)
//!     .procedure()
//!     .input(TypedSchema::<GetUser>::new())?
//!     .retry(RetryOptions::new().with_retries(3))
//!     .handler(|params| async move { params.client.get("/user", None).await })?
//!     .catch_all(|error| error.to_value())?;
//!
//! // Execute it
//! let result = procedure.call(input).await;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod client;
pub mod errors;
pub mod events;
pub mod observability;
pub mod procedure;
pub mod retry;
pub mod schema;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{HttpClient, HttpMethod, RequestOptions};
    pub use crate::errors::{
        ConfigurationError, HookError, HttpError, NetworkError, ProcedureError, RetryError,
        TimeoutError, TokenRefreshError, ValidationError, ValidationTarget,
    };
    pub use crate::events::{
        CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink,
    };
    pub use crate::observability::init_tracing;
    pub use crate::procedure::{
        CallResult, CompletionInfo, HandlerParams, HookStage, OutputContract, Procedure,
        ProcedureBuilder, ProcedureFactory, SchemaArgs,
    };
    pub use crate::retry::{
        BackoffStrategy, JitterStrategy, RetryDelay, RetryOptions,
    };
    pub use crate::schema::{FnSchema, Schema, SchemaViolation, TypedSchema};
}
