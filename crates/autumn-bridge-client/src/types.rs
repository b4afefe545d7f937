//! Request and response types for the billing client.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// HTTP method of a billing API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BillingMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// DELETE.
    Delete,
}

impl BillingMethod {
    /// Return the method name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A single call to the billing API.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingRequest {
    /// HTTP method.
    pub method: BillingMethod,
    /// Path relative to the client's base URL (e.g. `/customers`).
    pub path: String,
    /// Query parameters.
    pub query: HashMap<String, String>,
    /// JSON body, sent only when present.
    pub body: Option<serde_json::Value>,
}

impl BillingRequest {
    /// A GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: BillingMethod::Get,
            path: path.into(),
            query: HashMap::new(),
            body: None,
        }
    }

    /// A POST request with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: BillingMethod::Post,
            path: path.into(),
            query: HashMap::new(),
            body: Some(body),
        }
    }

    /// A DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: BillingMethod::Delete,
            path: path.into(),
            query: HashMap::new(),
            body: None,
        }
    }

    /// Attach query parameters.
    #[must_use]
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }
}

/// Response from the billing API, success or not.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingResponse {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: serde_json::Value,
}

impl BillingResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into a typed value.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// The error body, if the response carries one.
    #[must_use]
    pub fn error(&self) -> Option<ApiErrorBody> {
        if self.is_success() {
            return None;
        }
        serde_json::from_value(self.body.clone()).ok()
    }
}

/// Error body returned by the billing API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable code.
    #[serde(default)]
    pub code: Option<String>,
}
