//! Procedure configuration and execution.
//!
//! The entry points are [`ProcedureFactory`] (independent builders closed
//! over a shared context/client) and [`ProcedureBuilder`] (the fluent
//! configuration phase). The terminal `catch_all`/`build` call freezes
//! the configuration into a [`Procedure`], whose `call` runs the fixed
//! pipeline: onStart hook, input validation, retry-wrapped handler,
//! transform, output validation, onSuccess hook, onComplete hook, and
//! always resolves to a [`CallResult`].

mod builder;
mod callable;
mod config;
mod hooks;
mod processors;


pub use builder::{ProcedureBuilder, ProcedureFactory};
pub use callable::{CallResult, Procedure};
pub use config::{CompleteFn, CompletionInfo, HandlerFn, HandlerParams, HookFn, TransformFn};
pub use hooks::HookStage;
pub use processors::{process_input, process_output, OutputContract, SchemaArgs};
