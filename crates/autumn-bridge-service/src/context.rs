//! Per-request context and transport response.

use std::collections::HashMap;

use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// Everything the dispatcher needs to know about one inbound request.
///
/// Created once per call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method.
    pub method: Method,
    /// Request URI as received, including the query string.
    pub uri: Uri,
    /// Request headers.
    pub headers: HeaderMap,
    /// Parsed JSON body; `Null` when the request had none.
    pub body: Value,
    /// Path parameters captured by the public route.
    pub path_params: HashMap<String, String>,
}

impl RequestContext {
    /// Create a context with no headers, body or parameters.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Value::Null,
            path_params: HashMap::new(),
        }
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Set the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// The request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// A header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A successful (or routing-miss) response produced by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// JSON body.
    pub body: Value,
}

impl TransportResponse {
    /// The response for a path with no internal route.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            body: json!({ "error": "Not found" }),
        }
    }
}

impl IntoResponse for TransportResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
