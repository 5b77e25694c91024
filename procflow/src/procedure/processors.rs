//! Input and output processing against injected schemas.
//!
//! Both processors pass the value through unchanged when no validator is
//! configured, and normalize a [`SchemaViolation`] into the taxonomy's
//! [`ValidationError`] with the matching target.

use crate::errors::{ProcedureError, ValidationError, ValidationTarget};
use crate::schema::{Schema, SchemaViolation};
use serde_json::Value;
use std::sync::Arc;

/// Runtime state handed to a dynamic output schema function.
///
/// The output shape may depend on the very request that produced the data
/// being validated (e.g., a richer payload when an input flag requests
/// detail), so the selector sees the context, the validated input, and
/// the candidate output.
pub struct SchemaArgs<Ctx> {
    /// The procedure's context value.
    pub ctx: Arc<Ctx>,
    /// The validated input for this call.
    pub input: Value,
    /// The output value about to be validated.
    pub output: Value,
}

/// The configured output validation policy.
pub enum OutputContract<Ctx> {
    /// One fixed schema for every call.
    Static(Arc<dyn Schema>),
    /// A schema chosen per call from the context, input, and output.
    Dynamic(Arc<dyn Fn(SchemaArgs<Ctx>) -> Arc<dyn Schema> + Send + Sync>),
}

fn violation_error(target: ValidationTarget, violation: SchemaViolation) -> ProcedureError {
    let mut error = ValidationError::new(target, violation.message);
    if let Some(detail) = violation.detail {
        error = error.with_detail(detail);
    }
    error.into()
}

/// Validates the caller-supplied input.
///
/// Returns the parsed value (with any validator coercions applied) or a
/// [`ValidationError`] with target `input`.
pub fn process_input(
    value: &Value,
    schema: Option<&Arc<dyn Schema>>,
) -> Result<Value, ProcedureError> {
    match schema {
        None => Ok(value.clone()),
        Some(schema) => schema
            .parse(value)
            .map_err(|violation| violation_error(ValidationTarget::Input, violation)),
    }
}

/// Validates the pipeline output.
///
/// Resolves a dynamic contract against the context/input/output triple,
/// then parses. Failure raises a [`ValidationError`] with target `output`.
pub fn process_output<Ctx>(
    value: &Value,
    contract: Option<&OutputContract<Ctx>>,
    ctx: &Arc<Ctx>,
    input: &Value,
) -> Result<Value, ProcedureError> {
    match contract {
        None => Ok(value.clone()),
        Some(OutputContract::Static(schema)) => schema
            .parse(value)
            .map_err(|violation| violation_error(ValidationTarget::Output, violation)),
        Some(OutputContract::Dynamic(select)) => {
            let schema = select(SchemaArgs {
                ctx: Arc::clone(ctx),
                input: input.clone(),
                output: value.clone(),
            });
            schema
                .parse(value)
                .map_err(|violation| violation_error(ValidationTarget::Output, violation))
        }
    }
}
