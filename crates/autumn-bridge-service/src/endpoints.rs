//! Public endpoint registry.
//!
//! Every billing endpoint served under [`EXTERNAL_PREFIX`], with its method,
//! the minimal body shape it accepts and whether it needs a session. The
//! dispatcher looks endpoints up by [`Operation`], so legacy public names
//! get the same checks as the operation they resolve to.

use axum::http::Method;
use axum::routing::MethodFilter;
use autumn_bridge_core::camel_to_snake;
use serde_json::Value;

use crate::error::ApiError;
use crate::route_table::EXTERNAL_PREFIX;
use crate::router::{Operation, Operation as Op};

/// Minimal shape a request body must have.
///
/// Field names are the camelCase names callers send; the snake_case
/// spelling is accepted too. Anything deeper is left to the billing API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodySchema {
    /// An object (or no body) carrying every listed field.
    Object {
        /// Fields that must be present.
        required: &'static [&'static str],
    },
    /// An object carrying at least one of the listed fields.
    AnyOf {
        /// Candidate fields.
        fields: &'static [&'static str],
    },
    /// An object or an array of objects.
    ObjectOrArray,
}

impl BodySchema {
    /// Check `body` against this schema.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBody`] describing the first mismatch.
    pub fn check(&self, body: &Value) -> Result<(), ApiError> {
        match self {
            Self::Object { required } => {
                if body.is_null() && required.is_empty() {
                    return Ok(());
                }
                let object = as_object(body)?;
                match required.iter().find(|f| !has_field(object, f)) {
                    Some(missing) => Err(ApiError::InvalidBody(format!(
                        "Missing required field: {missing}"
                    ))),
                    None => Ok(()),
                }
            }
            Self::AnyOf { fields } => {
                let object = as_object(body)?;
                if fields.iter().any(|f| has_field(object, f)) {
                    Ok(())
                } else {
                    Err(ApiError::InvalidBody(format!(
                        "Expected one of: {}",
                        fields.join(", ")
                    )))
                }
            }
            Self::ObjectOrArray => match body {
                Value::Object(_) => Ok(()),
                Value::Array(items) if items.iter().all(Value::is_object) => Ok(()),
                _ => Err(ApiError::InvalidBody(
                    "Request body must be an object or an array of objects".into(),
                )),
            },
        }
    }
}

fn as_object(body: &Value) -> Result<&serde_json::Map<String, Value>, ApiError> {
    body.as_object()
        .ok_or_else(|| ApiError::InvalidBody("Request body must be a JSON object".into()))
}

fn has_field(object: &serde_json::Map<String, Value>, field: &str) -> bool {
    object
        .get(field)
        .or_else(|| object.get(&camel_to_snake(field)))
        .is_some_and(|v| !v.is_null())
}

/// A public billing endpoint.
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Internal operation served.
    pub operation: Operation,
    /// Path below [`EXTERNAL_PREFIX`], in axum syntax.
    pub path: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Body shape check, if any.
    pub body_schema: Option<BodySchema>,
    /// Whether requests without a session are refused.
    pub requires_session: bool,
}

impl Endpoint {
    /// The endpoint serving `operation`.
    #[must_use]
    pub fn for_operation(operation: Operation) -> Option<&'static Self> {
        ENDPOINTS.iter().find(|e| e.operation == operation)
    }

    /// Full public path.
    #[must_use]
    pub fn public_path(&self) -> String {
        format!("{EXTERNAL_PREFIX}{}", self.path)
    }

    /// Method filter for axum routing.
    #[must_use]
    pub fn method_filter(&self) -> MethodFilter {
        if self.method == Method::GET {
            MethodFilter::GET
        } else if self.method == Method::DELETE {
            MethodFilter::DELETE
        } else {
            MethodFilter::POST
        }
    }

    /// Check a request body against the endpoint's schema.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBody`] when the body has the wrong shape.
    pub fn check_body(&self, body: &Value) -> Result<(), ApiError> {
        self.body_schema.as_ref().map_or(Ok(()), |schema| schema.check(body))
    }
}

const fn endpoint(
    operation: Operation,
    path: &'static str,
    method: Method,
    body_schema: Option<BodySchema>,
    requires_session: bool,
) -> Endpoint {
    Endpoint {
        operation,
        path,
        method,
        body_schema,
        requires_session,
    }
}

const OBJECT: Option<BodySchema> = Some(BodySchema::Object { required: &[] });

const PRODUCT: Option<BodySchema> = requires(&["productId"]);

const fn requires(fields: &'static [&'static str]) -> Option<BodySchema> {
    Some(BodySchema::Object { required: fields })
}

/// The billing endpoints.
pub static ENDPOINTS: &[Endpoint] = &[
    endpoint(Op::CreateCustomer, "/customers", Method::POST, OBJECT, false),
    endpoint(Op::ListProducts, "/products", Method::GET, None, false),
    endpoint(Op::Checkout, "/checkout", Method::POST, PRODUCT, true),
    endpoint(Op::Attach, "/attach", Method::POST, PRODUCT, true),
    endpoint(
        Op::Check,
        "/check",
        Method::POST,
        Some(BodySchema::AnyOf {
            fields: &["featureId", "productId"],
        }),
        true,
    ),
    endpoint(
        Op::Track,
        "/track",
        Method::POST,
        Some(BodySchema::AnyOf {
            fields: &["featureId", "eventName"],
        }),
        true,
    ),
    endpoint(Op::Cancel, "/cancel", Method::POST, PRODUCT, true),
    endpoint(
        Op::CreateReferralCode,
        "/referrals/code",
        Method::POST,
        requires(&["programId"]),
        true,
    ),
    endpoint(
        Op::RedeemReferralCode,
        "/referrals/redeem",
        Method::POST,
        requires(&["code"]),
        true,
    ),
    endpoint(Op::BillingPortal, "/billing_portal", Method::POST, OBJECT, true),
    endpoint(
        Op::CreateEntity,
        "/entities",
        Method::POST,
        Some(BodySchema::ObjectOrArray),
        true,
    ),
    endpoint(Op::GetEntity, "/entities/:entityId", Method::GET, None, true),
    endpoint(Op::DeleteEntity, "/entities/:entityId", Method::DELETE, None, true),
];

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn registry_covers_every_operation() {
        assert_eq!(ENDPOINTS.len(), 13);

        let open: Vec<_> = ENDPOINTS
            .iter()
            .filter(|e| !e.requires_session)
            .map(|e| e.path)
            .collect();
        assert_eq!(open, ["/customers", "/products"]);
    }

    #[test]
    fn method_and_path_pairs_are_unique() {
        for (i, a) in ENDPOINTS.iter().enumerate() {
            for b in &ENDPOINTS[i + 1..] {
                assert!(a.path != b.path || a.method != b.method, "{}", a.path);
            }
        }
    }

    #[test]
    fn every_operation_has_one_endpoint() {
        for endpoint in ENDPOINTS {
            let found = Endpoint::for_operation(endpoint.operation).unwrap();
            assert_eq!(found.path, endpoint.path);
            assert_eq!(found.method, endpoint.method);
        }
    }

    #[test]
    fn public_paths() {
        assert_eq!(ENDPOINTS[0].public_path(), "/autumn/customers");
        assert_eq!(ENDPOINTS[12].public_path(), "/autumn/entities/:entityId");
        assert_eq!(ENDPOINTS[12].method, Method::DELETE);
    }

    #[test]
    fn required_fields_accept_either_spelling() {
        let schema = BodySchema::Object {
            required: &["productId"],
        };
        assert!(schema.check(&json!({ "productId": "pro" })).is_ok());
        assert!(schema.check(&json!({ "product_id": "pro" })).is_ok());
        assert!(schema.check(&json!({ "productId": null })).is_err());
        assert!(schema.check(&Value::Null).is_err());
    }

    #[test]
    fn optional_object_accepts_empty_body() {
        let schema = BodySchema::Object { required: &[] };
        assert!(schema.check(&Value::Null).is_ok());
        assert!(schema.check(&json!({})).is_ok());
        assert!(schema.check(&json!("text")).is_err());
    }

    #[test]
    fn any_of() {
        let schema = BodySchema::AnyOf {
            fields: &["featureId", "eventName"],
        };
        assert!(schema.check(&json!({ "eventName": "login" })).is_ok());
        assert!(schema.check(&json!({ "value": 1 })).is_err());
    }

    #[test]
    fn object_or_array() {
        let schema = BodySchema::ObjectOrArray;
        assert!(schema.check(&json!({ "id": "seat-1" })).is_ok());
        assert!(schema.check(&json!([{ "id": "a" }, { "id": "b" }])).is_ok());
        assert!(schema.check(&json!([1])).is_err());
        assert!(schema.check(&Value::Null).is_err());
    }

    #[test]
    fn invalid_body_error() {
        let err = ENDPOINTS[3].check_body(&json!({})).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(msg) if msg.contains("productId")));
    }
}
