//! Tracing setup and call-level observability helpers.

use std::collections::HashMap;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Initializes a global tracing subscriber with env-filter support.
///
/// Respects `RUST_LOG`; defaults to `info` when unset. Calling this more
/// than once is a no-op.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Generates a unique correlation id for one procedure invocation.
#[must_use]
pub fn generate_call_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Structured fields describing one procedure call, for log correlation.
#[derive(Debug, Clone, Default)]
pub struct CallSpanAttributes {
    /// Per-invocation correlation id.
    pub call_id: Option<String>,
    /// Outcome status ("succeeded" / "failed").
    pub status: Option<String>,
    /// Error kind discriminant when the call failed.
    pub error_kind: Option<String>,
    /// Handler attempts consumed by the retry executor.
    pub attempts: Option<usize>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: Option<f64>,
}

impl CallSpanAttributes {
    /// Creates empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the call id.
    #[must_use]
    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }

    /// Sets the outcome status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the error kind.
    #[must_use]
    pub fn with_error_kind(mut self, kind: impl Into<String>) -> Self {
        self.error_kind = Some(kind.into());
        self
    }

    /// Sets the duration.
    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: f64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Flattens to string key/value pairs for structured log fields.
    #[must_use]
    pub fn to_fields(&self) -> HashMap<String, String> {
        let mut fields = HashMap::new();
        if let Some(ref v) = self.call_id {
            fields.insert("call.id".to_string(), v.clone());
        }
        if let Some(ref v) = self.status {
            fields.insert("call.status".to_string(), v.clone());
        }
        if let Some(ref v) = self.error_kind {
            fields.insert("call.error_kind".to_string(), v.clone());
        }
        if let Some(v) = self.attempts {
            fields.insert("call.attempts".to_string(), v.to_string());
        }
        if let Some(v) = self.duration_ms {
            fields.insert("call.duration_ms".to_string(), v.to_string());
        }
        fields
    }
}

/// Simple duration helper for timing one call.
#[derive(Debug)]
pub struct SpanTimer {
    start: Instant,
}

impl SpanTimer {
    /// Starts the timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_ids_are_unique() {
        assert_ne!(generate_call_id(), generate_call_id());
    }

    #[test]
    fn test_span_attributes_to_fields() {
        let attrs = CallSpanAttributes::new()
            .with_call_id("abc-123")
            .with_status("failed")
            .with_error_kind("HttpError")
            .with_duration_ms(12.5);

        let fields = attrs.to_fields();
        assert_eq!(fields.get("call.id"), Some(&"abc-123".to_string()));
        assert_eq!(fields.get("call.status"), Some(&"failed".to_string()));
        assert_eq!(fields.get("call.error_kind"), Some(&"HttpError".to_string()));
        assert_eq!(fields.get("call.duration_ms"), Some(&"12.5".to_string()));
        assert!(!fields.contains_key("call.attempts"));
    }

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.elapsed_ms() >= 5.0);
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing();
        init_tracing();
        // Second call must not panic
    }
}
