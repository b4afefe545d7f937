//! Internal route matching.
//!
//! A small method + path matcher over the internal billing routes. Patterns
//! are made of exact segments and `:name` parameters; the first route that
//! matches structurally wins.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use axum::http::Method;

use crate::handlers::{self, Handler};

/// Internal billing operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Get or create the customer for the current subject.
    CreateCustomer,
    /// List catalog products.
    ListProducts,
    /// Start a checkout.
    Checkout,
    /// Attach a product.
    Attach,
    /// Check feature access.
    Check,
    /// Record usage.
    Track,
    /// Cancel a product.
    Cancel,
    /// Create a referral code.
    CreateReferralCode,
    /// Redeem a referral code.
    RedeemReferralCode,
    /// Open the billing portal.
    BillingPortal,
    /// Create entities.
    CreateEntity,
    /// Fetch an entity.
    GetEntity,
    /// Delete an entity.
    DeleteEntity,
}

impl Operation {
    /// Stable name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateCustomer => "create_customer",
            Self::ListProducts => "list_products",
            Self::Checkout => "checkout",
            Self::Attach => "attach",
            Self::Check => "check",
            Self::Track => "track",
            Self::Cancel => "cancel",
            Self::CreateReferralCode => "create_referral_code",
            Self::RedeemReferralCode => "redeem_referral_code",
            Self::BillingPortal => "billing_portal",
            Self::CreateEntity => "create_entity",
            Self::GetEntity => "get_entity",
            Self::DeleteEntity => "delete_entity",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Exact(String),
    Param(String),
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| match s.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_string()),
            None => Segment::Exact(s.to_string()),
        })
        .collect()
}

struct Route {
    method: Method,
    segments: Vec<Segment>,
    operation: Operation,
    handler: Handler,
}

impl Route {
    fn capture(&self, parts: &[&str]) -> Option<HashMap<String, String>> {
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Exact(expected) if expected == part => {}
                Segment::Exact(_) => return None,
                Segment::Param(name) => {
                    params.insert(name.clone(), (*part).to_string());
                }
            }
        }
        Some(params)
    }
}

/// Result of a successful route lookup.
pub struct RouteMatch {
    /// The matched operation.
    pub operation: Operation,
    /// Handler to invoke.
    pub handler: Handler,
    /// Captured `:name` parameters.
    pub params: HashMap<String, String>,
}

impl fmt::Debug for RouteMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMatch")
            .field("operation", &self.operation)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Method + path matcher for internal routes.
#[derive(Default)]
pub struct InternalRouter {
    routes: Vec<Route>,
}

static INTERNAL_ROUTER: OnceLock<InternalRouter> = OnceLock::new();

impl InternalRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The router with every billing operation registered.
    pub fn global() -> &'static Self {
        INTERNAL_ROUTER.get_or_init(Self::billing_routes)
    }

    fn billing_routes() -> Self {
        use Operation as Op;

        Self::new()
            .route(
                Method::POST,
                "/api/autumn/customers",
                Op::CreateCustomer,
                handlers::customers::create_customer,
            )
            .route(
                Method::GET,
                "/api/autumn/products",
                Op::ListProducts,
                handlers::products::list_products,
            )
            .route(
                Method::POST,
                "/api/autumn/checkout",
                Op::Checkout,
                handlers::purchases::checkout,
            )
            .route(Method::POST, "/api/autumn/attach", Op::Attach, handlers::purchases::attach)
            .route(Method::POST, "/api/autumn/cancel", Op::Cancel, handlers::purchases::cancel)
            .route(Method::POST, "/api/autumn/check", Op::Check, handlers::features::check)
            .route(Method::POST, "/api/autumn/track", Op::Track, handlers::features::track)
            .route(
                Method::POST,
                "/api/autumn/referrals/code",
                Op::CreateReferralCode,
                handlers::referrals::create_code,
            )
            .route(
                Method::POST,
                "/api/autumn/referrals/redeem",
                Op::RedeemReferralCode,
                handlers::referrals::redeem_code,
            )
            .route(
                Method::POST,
                "/api/autumn/billing_portal",
                Op::BillingPortal,
                handlers::customers::billing_portal,
            )
            .route(
                Method::POST,
                "/api/autumn/entities",
                Op::CreateEntity,
                handlers::entities::create_entity,
            )
            .route(
                Method::GET,
                "/api/autumn/entities/:entityId",
                Op::GetEntity,
                handlers::entities::get_entity,
            )
            .route(
                Method::DELETE,
                "/api/autumn/entities/:entityId",
                Op::DeleteEntity,
                handlers::entities::delete_entity,
            )
    }

    /// Register a route.
    #[must_use]
    pub fn route(
        mut self,
        method: Method,
        pattern: &str,
        operation: Operation,
        handler: Handler,
    ) -> Self {
        self.routes.push(Route {
            method,
            segments: parse_pattern(pattern),
            operation,
            handler,
        });
        self
    }

    /// Find the first route matching `method` and `path`.
    #[must_use]
    pub fn matches(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        self.routes
            .iter()
            .filter(|r| r.method == *method)
            .find_map(|r| {
                r.capture(&parts).map(|params| RouteMatch {
                    operation: r.operation,
                    handler: r.handler,
                    params,
                })
            })
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let m = InternalRouter::global()
            .matches(&Method::POST, "/api/autumn/attach")
            .unwrap();
        assert_eq!(m.operation, Operation::Attach);
        assert!(m.params.is_empty());
    }

    #[test]
    fn parameter_capture() {
        let m = InternalRouter::global()
            .matches(&Method::GET, "/api/autumn/entities/seat-1")
            .unwrap();
        assert_eq!(m.operation, Operation::GetEntity);
        assert_eq!(m.params["entityId"], "seat-1");
    }

    #[test]
    fn method_distinguishes_routes() {
        let router = InternalRouter::global();
        let get = router.matches(&Method::GET, "/api/autumn/entities/e1").unwrap();
        let delete = router
            .matches(&Method::DELETE, "/api/autumn/entities/e1")
            .unwrap();
        let post = router.matches(&Method::POST, "/api/autumn/entities").unwrap();

        assert_eq!(get.operation, Operation::GetEntity);
        assert_eq!(delete.operation, Operation::DeleteEntity);
        assert_eq!(post.operation, Operation::CreateEntity);
        assert!(router.matches(&Method::GET, "/api/autumn/attach").is_none());
    }

    #[test]
    fn misses_are_none() {
        let router = InternalRouter::global();
        assert!(router.matches(&Method::POST, "/api/autumn/nope").is_none());
        assert!(router
            .matches(&Method::GET, "/api/autumn/entities/a/b")
            .is_none());
        assert!(router.matches(&Method::GET, "/api/autumn/entities").is_none());
        assert!(router.matches(&Method::POST, "/").is_none());
    }

    #[test]
    fn first_match_wins() {
        let router = InternalRouter::new()
            .route(Method::GET, "/x/:id", Operation::GetEntity, handlers::entities::get_entity)
            .route(
                Method::GET,
                "/x/fixed",
                Operation::ListProducts,
                handlers::products::list_products,
            );

        let m = router.matches(&Method::GET, "/x/fixed").unwrap();
        assert_eq!(m.operation, Operation::GetEntity);
        assert_eq!(m.params["id"], "fixed");
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn every_operation_is_registered_once() {
        assert_eq!(InternalRouter::global().len(), 13);
    }
}
