//! Hand-rolled test doubles.

use crate::client::{HttpClient, HttpMethod, RequestOptions};
use crate::errors::ProcedureError;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;

/// A scripted HTTP client that pops one queued outcome per request and
/// records every call.
///
/// An empty queue resolves to `null`, so ignore-the-response tests need
/// no scripting.
pub struct StaticHttpClient {
    base_url: String,
    responses: Mutex<VecDeque<Result<Value, ProcedureError>>>,
    calls: Mutex<Vec<(HttpMethod, String)>>,
}

impl StaticHttpClient {
    /// Creates a client double rooted at a base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queues a successful response body.
    pub fn enqueue_ok(&self, body: Value) {
        self.responses.lock().push_back(Ok(body));
    }

    /// Queues a failure.
    pub fn enqueue_err(&self, error: ProcedureError) {
        self.responses.lock().push_back(Err(error));
    }

    /// Returns how many requests were made.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the recorded method/path pairs, in order.
    #[must_use]
    pub fn recorded_calls(&self) -> Vec<(HttpMethod, String)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl HttpClient for StaticHttpClient {
    async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        _body: Option<Value>,
        _opts: Option<RequestOptions>,
    ) -> Result<Value, ProcedureError> {
        self.calls.lock().push((method, path.to_string()));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }

    fn get_uri(&self, path: &str, _opts: Option<&RequestOptions>) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Records labels in call order, for asserting hook sequencing.
#[derive(Debug, Default)]
pub struct CallRecorder {
    labels: Mutex<Vec<String>>,
}

impl CallRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a label.
    pub fn record(&self, label: impl Into<String>) {
        self.labels.lock().push(label.into());
    }

    /// Returns the recorded labels, in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }

    /// Returns how many labels were recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.lock().is_empty()
    }
}
