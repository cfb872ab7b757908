//! Response-side types: the header sink CORS writes into, the response being
//! assembled for a request, and the result value flowing through handler chains.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::request::HeaderVec;

/// A response that headers can be added to without clobbering earlier writes.
pub trait ResponseHeaders {
    /// Add `name: value` unless a header with that name (case-insensitive) is
    /// already present. Returns `true` when the header was written.
    fn add_header_if_not_added(&mut self, name: &str, value: &str) -> bool;
}

/// Response under construction for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in write order
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl Default for ActionResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::Null,
        }
    }
}

impl ActionResponse {
    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Copy a handler result into this response.
    ///
    /// Status and body come from the result. Result headers are added only
    /// where the response has not already set them, so CORS headers written
    /// before the handler ran survive.
    pub fn commit(&mut self, result: ActionResult) {
        self.status = result.status;
        self.body = result.body;
        for (name, value) in &result.headers {
            self.add_header_if_not_added(name, value);
        }
    }
}

impl ResponseHeaders for ActionResponse {
    fn add_header_if_not_added(&mut self, name: &str, value: &str) -> bool {
        if self.header(name).is_some() {
            return false;
        }
        self.headers.push((Arc::from(name), value.to_string()));
        true
    }
}

/// Value returned by an action and transformed by after-interceptors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResult {
    /// HTTP status code (200, 404, 500, etc.)
    pub status: u16,
    /// Extra headers the handler wants on the response
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON
    pub body: Value,
}

impl ActionResult {
    /// Create a result with the given status and body
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: HeaderVec::new(),
            body,
        }
    }

    /// 200 with a JSON body
    #[must_use]
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    /// Error result with `{ "error": message }` body
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::new(status, serde_json::json!({ "error": message }))
    }

    /// Attach a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a header by name
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}
