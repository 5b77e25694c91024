//! Observability events for procedure execution.
//!
//! The executor reports call lifecycle transitions through an injected
//! [`EventSink`] rather than a global channel, so suppressed failures
//! (a broken `onComplete` hook) stay observable without escaping.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Stable event names emitted by the procedure executor.
pub mod names {
    /// A procedure call entered the pipeline.
    pub const CALL_STARTED: &str = "procedure.call.started";
    /// A procedure call completed successfully.
    pub const CALL_SUCCEEDED: &str = "procedure.call.succeeded";
    /// A procedure call failed; the error went through the catch-all.
    pub const CALL_FAILED: &str = "procedure.call.failed";
    /// The `onComplete` hook itself failed and was suppressed.
    pub const ON_COMPLETE_FAILED: &str = "procedure.hook.on_complete_failed";
}
