//! Error taxonomy for procedure execution.
//!
//! Every failure a procedure call can produce is one of a closed set of
//! named kinds, each carrying structured fields beyond a message. The
//! catch-all consumer classifies via [`ProcedureError::kind`] or the
//! per-kind predicates rather than matching on message strings.

use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// The unified error type for procedure operations.
#[derive(Debug, Clone, Error)]
pub enum ProcedureError {
    /// The transport received a non-2xx response.
    #[error("{0}")]
    Http(#[from] HttpError),

    /// The transport exceeded its configured deadline.
    #[error("{0}")]
    Timeout(#[from] TimeoutError),

    /// Input or output validation failed.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The retry budget was exhausted.
    #[error("{0}")]
    Retry(#[from] RetryError),

    /// The transport's token refresh callback failed.
    #[error("{0}")]
    TokenRefresh(#[from] TokenRefreshError),

    /// A connection-level failure was detected.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// The procedure was misconfigured.
    #[error("{0}")]
    Configuration(#[from] ConfigurationError),

    /// A lifecycle hook failed.
    #[error("{0}")]
    Hook(#[from] HookError),

    /// An error outside the taxonomy, carried as its message.
    #[error("{0}")]
    Unexpected(String),
}

impl ProcedureError {
    /// Creates an error outside the taxonomy from an arbitrary message.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Returns the stable discriminant string for this kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "HttpError",
            Self::Timeout(_) => "TimeoutError",
            Self::Validation(_) => "ValidationError",
            Self::Retry(_) => "RetryError",
            Self::TokenRefresh(_) => "TokenRefreshError",
            Self::Network(_) => "NetworkError",
            Self::Configuration(_) => "ConfigurationError",
            Self::Hook(_) => "HookError",
            Self::Unexpected(_) => "UnexpectedError",
        }
    }

    /// Returns true if this is an HTTP status error.
    #[must_use]
    pub fn is_http(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    /// Returns true if this is a timeout error.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a retry-exhaustion error.
    #[must_use]
    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }

    /// Returns true if this is a token refresh error.
    #[must_use]
    pub fn is_token_refresh(&self) -> bool {
        matches!(self, Self::TokenRefresh(_))
    }

    /// Returns true if this is a network error.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns true if this is a hook error.
    #[must_use]
    pub fn is_hook(&self) -> bool {
        matches!(self, Self::Hook(_))
    }

    /// Returns the HTTP status carried by this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => Some(err.status),
            _ => None,
        }
    }

    /// Returns true unless the error carries a client (4xx) status.
    ///
    /// Client errors are never retried; everything else is eligible.
    #[must_use]
    pub fn is_retry_eligible(&self) -> bool {
        !matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Converts to a structured JSON representation.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("type".to_string(), Value::String(self.kind().to_string()));
        map.insert("message".to_string(), Value::String(self.to_string()));

        match self {
            Self::Http(err) => {
                map.insert("status".to_string(), serde_json::json!(err.status));
                if let Some(ref data) = err.data {
                    map.insert("data".to_string(), data.clone());
                }
            }
            Self::Timeout(err) => {
                map.insert(
                    "timeout_ms".to_string(),
                    serde_json::json!(err.timeout.as_millis() as u64),
                );
            }
            Self::Validation(err) => {
                map.insert(
                    "validation_type".to_string(),
                    Value::String(err.target.as_str().to_string()),
                );
                if let Some(ref detail) = err.detail {
                    map.insert("detail".to_string(), detail.clone());
                }
            }
            Self::Retry(err) => {
                map.insert("attempts".to_string(), serde_json::json!(err.attempts));
                map.insert("last_error".to_string(), err.last_error.to_value());
            }
            Self::Configuration(err) => {
                if let Some(ref field) = err.field {
                    map.insert("field".to_string(), Value::String(field.clone()));
                }
            }
            Self::Hook(err) => {
                map.insert("hook".to_string(), Value::String(err.hook.clone()));
            }
            Self::TokenRefresh(_) | Self::Network(_) | Self::Unexpected(_) => {}
        }

        Value::Object(map)
    }
}

impl From<anyhow::Error> for ProcedureError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unexpected(format!("{err:#}"))
    }
}

/// Error raised when the transport receives a non-2xx response.
#[derive(Debug, Clone, Error)]
#[error("HTTP request failed with status {status}")]
pub struct HttpError {
    /// The HTTP status code.
    pub status: u16,
    /// The response body, if one was captured.
    pub data: Option<Value>,
    /// The response headers, if captured.
    pub headers: Option<HashMap<String, String>>,
}

impl HttpError {
    /// Creates a new HTTP error for a status code.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            data: None,
            headers: None,
        }
    }

    /// Attaches the response body.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches the response headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Returns true for 4xx statuses.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Returns true for 5xx statuses.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Returns true if the status matches exactly.
    #[must_use]
    pub fn has_status(&self, status: u16) -> bool {
        self.status == status
    }
}

/// Error raised when the transport exceeds its configured deadline.
#[derive(Debug, Clone, Error)]
#[error("request timed out after {}ms", .timeout.as_millis())]
pub struct TimeoutError {
    /// The deadline that was exceeded.
    pub timeout: Duration,
}

impl TimeoutError {
    /// Creates a new timeout error.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Creates a timeout error from a millisecond deadline.
    #[must_use]
    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }
}

/// Which value a validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationTarget {
    /// The caller-supplied input.
    Input,
    /// The pipeline output.
    Output,
}

impl ValidationTarget {
    /// Returns the lowercase discriminant used in serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Output => "Output",
        }
    }
}

/// Error raised when input or output validation fails.
#[derive(Debug, Clone, Error)]
#[error("{} validation failed: {message}", .target.label())]
pub struct ValidationError {
    /// Whether the input or the output failed validation.
    pub target: ValidationTarget,
    /// The validator's failure message.
    pub message: String,
    /// Structured detail from the underlying validator.
    pub detail: Option<Value>,
}

impl ValidationError {
    /// Creates a new validation error.
    #[must_use]
    pub fn new(target: ValidationTarget, message: impl Into<String>) -> Self {
        Self {
            target,
            message: message.into(),
            detail: None,
        }
    }

    /// Attaches structured validator detail.
    #[must_use]
    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Error raised when the retry budget is exhausted after more than one
/// attempt.
#[derive(Debug, Clone, Error)]
#[error("operation failed after {attempts} attempts: {last_error}")]
pub struct RetryError {
    /// How many attempts were made in total.
    pub attempts: usize,
    /// The error from the final attempt.
    pub last_error: Box<ProcedureError>,
}

impl RetryError {
    /// Creates a new retry-exhaustion error.
    #[must_use]
    pub fn new(attempts: usize, last_error: ProcedureError) -> Self {
        Self {
            attempts,
            last_error: Box::new(last_error),
        }
    }
}

/// Error raised when the transport's token refresh callback fails.
#[derive(Debug, Clone, Default, Error)]
#[error("token refresh failed")]
pub struct TokenRefreshError {
    /// The failure that caused the refresh to fail, if captured.
    pub original: Option<Box<ProcedureError>>,
}

impl TokenRefreshError {
    /// Creates a new token refresh error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the underlying failure.
    #[must_use]
    pub fn with_original(mut self, original: ProcedureError) -> Self {
        self.original = Some(Box::new(original));
        self
    }
}

/// Error raised when the transport detects a connection-level failure.
#[derive(Debug, Clone, Default, Error)]
#[error("network request failed")]
pub struct NetworkError {
    /// The failure that was classified as connection-level, if captured.
    pub original: Option<Box<ProcedureError>>,
}

impl NetworkError {
    /// Creates a new network error.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches the underlying failure.
    #[must_use]
    pub fn with_original(mut self, original: ProcedureError) -> Self {
        self.original = Some(Box::new(original));
        self
    }
}

/// Error raised when the fluent configuration API is misused.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ConfigurationError {
    /// The configuration slot involved, if one is identifiable.
    pub field: Option<String>,
    /// The error message.
    pub message: String,
}

impl ConfigurationError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    /// Creates the error for a configurator invoked a second time.
    #[must_use]
    pub fn duplicate(field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            message: format!("{field}() can only be called once"),
            field: Some(field),
        }
    }

    /// Creates the error for finalizing a procedure without a handler.
    #[must_use]
    pub fn missing_handler() -> Self {
        Self {
            field: Some("handler".to_string()),
            message: "procedure cannot be finalized without a handler".to_string(),
        }
    }
}

/// Error raised when an `onStart` or `onSuccess` hook fails.
#[derive(Debug, Clone, Error)]
#[error("{hook} hook failed: {message}")]
pub struct HookError {
    /// The name of the hook that failed.
    pub hook: String,
    /// The hook's failure message.
    pub message: String,
}

impl HookError {
    /// Creates a new hook error.
    #[must_use]
    pub fn new(hook: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            message: message.into(),
        }
    }
}
