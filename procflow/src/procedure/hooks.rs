//! Lifecycle hook execution.

use super::config::HookFn;
use crate::errors::{HookError, ProcedureError};

/// Fixed pipeline points where lifecycle hooks run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    /// Before input validation.
    OnStart,
    /// After output validation, on the success path only.
    OnSuccess,
    /// After the call settles, on both paths.
    OnComplete,
}

impl HookStage {
    /// Returns the hook's conventional name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::OnStart => "onStart",
            Self::OnSuccess => "onSuccess",
            Self::OnComplete => "onComplete",
        }
    }
}

impl std::fmt::Display for HookStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs an optional hook, normalizing absence and wrapping a failure into
/// a [`HookError`] naming the stage.
pub(crate) async fn run_hook(
    stage: HookStage,
    hook: Option<&HookFn>,
) -> Result<(), ProcedureError> {
    let Some(hook) = hook else {
        return Ok(());
    };
    hook()
        .await
        .map_err(|error| HookError::new(stage.name(), error.to_string()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_stage_names() {
        assert_eq!(HookStage::OnStart.name(), "onStart");
        assert_eq!(HookStage::OnSuccess.to_string(), "onSuccess");
        assert_eq!(HookStage::OnComplete.name(), "onComplete");
    }

    #[tokio::test]
    async fn test_absent_hook_is_ok() {
        assert!(run_hook(HookStage::OnStart, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_successful_hook_passes_through() {
        let hook: HookFn = Arc::new(|| Box::pin(async { Ok(()) }));
        assert!(run_hook(HookStage::OnSuccess, Some(&hook)).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_hook_is_wrapped_with_stage_name() {
        let hook: HookFn =
            Arc::new(|| Box::pin(async { Err(ProcedureError::unexpected("db offline")) }));
        let error = run_hook(HookStage::OnStart, Some(&hook)).await.unwrap_err();

        assert!(error.is_hook());
        assert_eq!(error.to_string(), "onStart hook failed: db offline");
    }
}
