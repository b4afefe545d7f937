//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::to_bytes;
use axum::extract::{Path, Request, State};
use axum::routing::{any, get, on};
use axum::Router;
use serde_json::Value;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::context::{RequestContext, TransportResponse};
use crate::dispatcher;
use crate::endpoints::ENDPOINTS;
use crate::error::ApiError;
use crate::handlers::health;
use crate::route_table::EXTERNAL_PREFIX;
use crate::state::AppState;

/// Maximum concurrent requests for billing endpoints.
const BILLING_MAX_CONCURRENT_REQUESTS: usize = 100;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Billing (session per endpoint, see [`ENDPOINTS`])
/// - `POST /autumn/customers`, `GET /autumn/products`
/// - `POST /autumn/{checkout,attach,check,track,cancel}`
/// - `POST /autumn/referrals/{code,redeem}`, `POST /autumn/billing_portal`
/// - `POST /autumn/entities`, `GET|DELETE /autumn/entities/:entityId`
/// - `/autumn/*rest` - anything else, including the legacy `entitled` and
///   `event` names, goes to the dispatcher, which applies the checks of the
///   operation the path resolves to
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    let billing_routes = ENDPOINTS
        .iter()
        .fold(Router::new(), |router, endpoint| {
            router.route(
                &endpoint.public_path(),
                on(
                    endpoint.method_filter(),
                    move |State(state): State<Arc<AppState>>,
                          params: Option<Path<HashMap<String, String>>>,
                          request: Request| {
                        let params = params.map(|Path(p)| p).unwrap_or_default();
                        serve(state, params, request)
                    },
                ),
            )
        })
        .route(
            &format!("{EXTERNAL_PREFIX}/*rest"),
            any(|State(state): State<Arc<AppState>>, request: Request| {
                serve(state, HashMap::new(), request)
            }),
        )
        .layer(ConcurrencyLimitLayer::new(BILLING_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .merge(billing_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Turn an axum request into a [`RequestContext`] and dispatch it.
///
/// Session and body checks happen in the dispatcher once the internal
/// operation is known.
async fn serve(
    state: Arc<AppState>,
    path_params: HashMap<String, String>,
    request: Request,
) -> Result<TransportResponse, ApiError> {
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, state.config.max_body_bytes)
        .await
        .map_err(|e| ApiError::InvalidBody(format!("Failed to read request body: {e}")))?;
    let body = parse_body(&bytes)?;

    let mut ctx = RequestContext::new(parts.method, parts.uri)
        .with_headers(parts.headers)
        .with_body(body);
    ctx.path_params = path_params;

    dispatcher::handle(&state, ctx).await
}

/// Parse a JSON body; an empty body is `null`.
fn parse_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(bytes)
        .map_err(|e| ApiError::InvalidBody(format!("Request body must be valid JSON: {e}")))
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
