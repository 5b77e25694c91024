//! Transport client interface boundary.
//!
//! The engine never performs HTTP itself; handlers call whatever client
//! value the procedure was created with. This module fixes the vocabulary
//! adapters and handlers share: the verb set, per-request options, and the
//! failure contract (rejections carry taxonomy kinds, with
//! [`HttpError`](crate::errors::HttpError) statuses driving retry
//! classification).

use crate::errors::ProcedureError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// PATCH
    Patch,
    /// DELETE
    Delete,
    /// HEAD
    Head,
    /// OPTIONS
    Options,
}

impl HttpMethod {
    /// Returns the canonical uppercase verb.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request options passed through to the transport adapter.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Request headers.
    pub headers: HashMap<String, String>,
    /// Query-string parameters.
    pub query: HashMap<String, String>,
    /// Deadline for the request; exceeding it is a
    /// [`TimeoutError`](crate::errors::TimeoutError).
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    /// Creates empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets the request deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// The transport contract handlers program against.
///
/// Implementations reject with taxonomy errors: a non-2xx response maps to
/// `HttpError`, a missed deadline to `TimeoutError`, connection failures to
/// `NetworkError`, and a failed credential refresh to `TokenRefreshError`.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Sends a request and resolves to the response body.
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError>;

    /// Resolves the full URI a request for `path` would target.
    fn get_uri(&self, path: &str, opts: Option<&RequestOptions>) -> String;

    /// Sends a GET request.
    async fn get(&self, path: &str, opts: Option<RequestOptions>) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Get, path, None, opts).await
    }

    /// Sends a POST request.
    async fn post(
        &self,
        path: &str,
        body: Option<Value>,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Post, path, body, opts).await
    }

    /// Sends a PUT request.
    async fn put(
        &self,
        path: &str,
        body: Option<Value>,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Put, path, body, opts).await
    }

    /// Sends a PATCH request.
    async fn patch(
        &self,
        path: &str,
        body: Option<Value>,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Patch, path, body, opts).await
    }

    /// Sends a DELETE request.
    async fn delete(
        &self,
        path: &str,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Delete, path, None, opts).await
    }

    /// Sends a HEAD request.
    async fn head(&self, path: &str, opts: Option<RequestOptions>) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Head, path, None, opts).await
    }

    /// Sends an OPTIONS request.
    async fn options(
        &self,
        path: &str,
        opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.request(HttpMethod::Options, path, None, opts).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_as_str() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
        assert_eq!(HttpMethod::Options.to_string(), "OPTIONS");
    }

    #[test]
    fn test_method_serialization() {
        assert_eq!(
            serde_json::to_value(HttpMethod::Delete).unwrap(),
            serde_json::json!("DELETE")
        );
    }

    #[test]
    fn test_request_options_builders() {
        let opts = RequestOptions::new()
            .with_header("authorization", "Bearer t")
            .with_query("page", "2")
            .with_timeout(Duration::from_secs(5));

        assert_eq!(opts.headers.get("authorization"), Some(&"Bearer t".to_string()));
        assert_eq!(opts.query.get("page"), Some(&"2".to_string()));
        assert_eq!(opts.timeout, Some(Duration::from_secs(5)));
    }
}
