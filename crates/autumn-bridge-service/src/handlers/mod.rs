//! Internal billing handlers.
//!
//! One handler per [`Operation`](crate::router::Operation). Handlers receive
//! an already-normalized (snake_case) body and a deferred subject; those that
//! bill someone resolve the subject and merge it into the outgoing body as
//! `customer_id` + `customer_data`.

use std::collections::HashMap;
use std::sync::Arc;

use autumn_bridge_client::{BillingApi, BillingResponse, ClientError};
use autumn_bridge_core::{BillingSubject, SubjectProvider};
use futures::future::BoxFuture;
use serde_json::{json, Map, Value};

pub mod customers;
pub mod entities;
pub mod features;
pub mod health;
pub mod products;
pub mod purchases;
pub mod referrals;

/// Signature shared by every internal handler.
pub type Handler = fn(HandlerArgs) -> BoxFuture<'static, HandlerResult>;

/// Inputs to a handler invocation.
pub struct HandlerArgs {
    /// Billing client scoped to this request.
    pub client: Arc<dyn BillingApi>,
    /// Normalized request body.
    pub body: Value,
    /// Internal path the request was routed to.
    pub path: String,
    /// Deferred billing subject.
    pub subject: SubjectProvider,
    /// Path parameters captured by the internal route.
    pub path_params: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, String>,
}

impl HandlerArgs {
    /// Resolve the subject, or produce the "no customer" result.
    async fn require_subject(&self) -> Result<BillingSubject, HandlerResult> {
        self.subject.resolve().await.ok_or_else(|| {
            tracing::debug!(path = %self.path, "No billing subject for request");
            HandlerResult::no_customer()
        })
    }

    /// Resolve the subject and merge it into the body.
    async fn customer_body(self) -> Result<(Arc<dyn BillingApi>, Value), HandlerResult> {
        let subject = self.require_subject().await?;
        let body = merge_object(self.body, subject.to_customer_fields())?;
        Ok((self.client, body))
    }

    /// Resolve the subject, returning the client, customer id and body.
    async fn scoped_to_customer(
        self,
    ) -> Result<(Arc<dyn BillingApi>, String, Value), HandlerResult> {
        let subject = self.require_subject().await?;
        Ok((self.client, subject.subject_id, self.body))
    }
}

/// Outcome of a handler: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResult {
    /// HTTP status code.
    pub status: u16,
    /// JSON body.
    pub body: Value,
}

impl HandlerResult {
    /// Build a result.
    #[must_use]
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// An error result with the standard `{ message, code }` body.
    #[must_use]
    pub fn error(status: u16, message: &str, code: &str) -> Self {
        Self::new(status, json!({ "message": message, "code": code }))
    }

    /// No billing subject could be resolved.
    #[must_use]
    pub fn no_customer() -> Self {
        Self::error(401, "No customer ID found", "no_customer_id")
    }

    /// Whether the result should be surfaced as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// `message` field of the body, if it is a string.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// `code` field of the body, if it is a string.
    #[must_use]
    pub fn code(&self) -> Option<String> {
        self.body
            .get("code")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Convert a client call outcome.
    #[must_use]
    pub fn from_client(result: Result<BillingResponse, ClientError>) -> Self {
        match result {
            Ok(response) => Self::new(response.status, response.body),
            Err(e) => {
                tracing::error!(error = %e, "Billing API call failed");
                Self::error(
                    502,
                    "Failed to reach billing provider",
                    "external_service_error",
                )
            }
        }
    }
}

/// Merge `fields` into an object body; `null` counts as an empty object.
///
/// Fields from `fields` override caller-supplied ones.
fn merge_object(body: Value, fields: Map<String, Value>) -> Result<Value, HandlerResult> {
    let mut object = match body {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        _ => {
            return Err(HandlerResult::error(
                400,
                "Request body must be a JSON object",
                "invalid_body",
            ))
        }
    };
    object.extend(fields);
    Ok(Value::Object(object))
}

/// Replace a `null` body with an empty object.
fn object_or_empty(body: Value) -> Value {
    if body.is_null() {
        Value::Object(Map::new())
    } else {
        body
    }
}
