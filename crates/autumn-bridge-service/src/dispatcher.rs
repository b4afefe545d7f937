//! Request dispatch.
//!
//! [`handle`] takes one public request through credential lookup, route
//! rewriting and matching, session/organization resolution, body
//! normalization and the internal handler, then maps the handler's result
//! to a transport response or an [`ApiError`].

use std::collections::HashMap;
use std::sync::OnceLock;

use axum::extract::Query;
use axum::http::{StatusCode, Uri};
use autumn_bridge_core::{resolve, KeyExclusions};
use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::Instrument;
use uuid::Uuid;

use crate::collaborators::{CredentialError, SecretKeyCheck};
use crate::context::{RequestContext, TransportResponse};
use crate::endpoints::Endpoint;
use crate::error::{ApiError, UNKNOWN_ERROR_CODE, UNKNOWN_ERROR_MESSAGE};
use crate::handlers::HandlerArgs;
use crate::route_table::{resolve_path, strip_external_prefix};
use crate::router::InternalRouter;
use crate::state::AppState;

static BODY_EXCLUSIONS: OnceLock<KeyExclusions> = OnceLock::new();

/// Dispatch one request.
///
/// A path with no internal route yields the 404 transport response, not an
/// error. The session requirement and body shape come from the endpoint of
/// the matched operation. Handler results with status >= 400 become
/// [`ApiError::Handler`].
pub async fn handle(
    state: &AppState,
    ctx: RequestContext,
) -> Result<TransportResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "dispatch",
        %request_id,
        method = %ctx.method,
        path = %ctx.path(),
    );
    dispatch(state, ctx).instrument(span).await
}

async fn dispatch(state: &AppState, ctx: RequestContext) -> Result<TransportResponse, ApiError> {
    let secret_key = secret_key(state)?;

    let client = state
        .clients
        .build(&state.plugin.base_url, &secret_key)
        .map_err(|e| ApiError::Internal(format!("failed to build billing client: {e}")))?;

    let query: HashMap<String, String> = query_params(&ctx.uri);

    let internal_path = resolve_path(strip_external_prefix(ctx.path()));

    let Some(matched) = InternalRouter::global().matches(&ctx.method, &internal_path) else {
        tracing::debug!(internal_path = %internal_path, "No internal route");
        return Ok(TransportResponse::not_found());
    };
    tracing::debug!(
        operation = %matched.operation,
        internal_path = %internal_path,
        "Route matched"
    );

    let session = state
        .sessions
        .get_session(&ctx)
        .await
        .filter(|s| !s.is_expired_at(Utc::now()));
    let organization = state
        .organizations
        .organization_context(&ctx, session.as_ref(), &state.plugin)
        .await;

    // Checks follow the resolved operation, so aliases cannot skip them.
    let endpoint = Endpoint::for_operation(matched.operation);
    if endpoint.map_or(true, |e| e.requires_session) && session.is_none() {
        tracing::debug!(operation = %matched.operation, "Rejecting request without session");
        return Err(ApiError::Unauthorized);
    }
    if let Some(endpoint) = endpoint {
        endpoint.check_body(&ctx.body)?;
    }

    tracing::debug!(
        user_id = session.as_ref().map(|s| s.user_id.as_str()),
        organization_id = organization.organization_id(),
        custom_identity = state.plugin.has_custom_identity(),
        "Request context resolved"
    );

    let subject = resolve(session, organization, state.plugin.clone());

    let body = BODY_EXCLUSIONS
        .get_or_init(KeyExclusions::dispatcher_defaults)
        .apply(&ctx.body);

    // Parameters decoded by the public route take precedence over raw
    // segments captured from the rewritten path.
    let mut path_params = matched.params;
    path_params.extend(ctx.path_params);

    let result = (matched.handler)(HandlerArgs {
        client,
        body,
        path: internal_path,
        subject,
        path_params,
        query,
    })
    .await;

    if result.is_error() {
        tracing::warn!(
            operation = %matched.operation,
            status = result.status,
            code = result.code().as_deref().unwrap_or(UNKNOWN_ERROR_CODE),
            "Billing handler returned an error"
        );
        return Err(ApiError::handler(
            result.status,
            result.message(),
            result.code(),
        ));
    }

    tracing::info!(operation = %matched.operation, status = result.status, "Request completed");

    let status = StatusCode::from_u16(result.status)
        .map_err(|_| ApiError::Internal(format!("invalid handler status {}", result.status)))?;
    Ok(TransportResponse {
        status,
        body: result.body,
    })
}

/// Query parameters of `uri`; a query that does not fit `T` is ignored.
fn query_params<T>(uri: &Uri) -> T
where
    T: DeserializeOwned + Default,
{
    Query::<T>::try_from_uri(uri)
        .map(|Query(q)| q)
        .unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Ignoring malformed query string");
            T::default()
        })
}

/// The configured secret key, else the credential source's.
fn secret_key(state: &AppState) -> Result<String, ApiError> {
    if let Some(key) = &state.plugin.secret_key {
        return Ok(key.clone());
    }

    match state.credentials.check_secret_key() {
        SecretKeyCheck::Found(key) => Ok(key),
        SecretKeyCheck::Missing(details) => {
            let details = details.unwrap_or_else(|| CredentialError {
                status: 400,
                message: None,
                code: None,
            });
            tracing::warn!(
                reported_status = details.status,
                code = details.code.as_deref().unwrap_or(UNKNOWN_ERROR_CODE),
                "No billing secret key available"
            );
            Err(ApiError::MissingSecretKey {
                message: details
                    .message
                    .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
                code: details
                    .code
                    .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_params_are_decoded() {
        let uri: Uri = "/autumn/products?limit=5&name=a%20b".parse().unwrap();
        let query: HashMap<String, String> = query_params(&uri);
        assert_eq!(query["limit"], "5");
        assert_eq!(query["name"], "a b");
    }

    #[test]
    fn odd_query_strings_still_parse() {
        let uri: Uri = "/autumn/products?=&&a&b=1=2".parse().unwrap();
        let query: HashMap<String, String> = query_params(&uri);
        assert_eq!(query["a"], "");
        assert_eq!(query["b"], "1=2");
    }

    #[test]
    fn malformed_query_falls_back_to_default() {
        let uri: Uri = "/autumn/products?limit=many".parse().unwrap();
        let query: HashMap<String, u32> = query_params(&uri);
        assert!(query.is_empty());
    }

    #[test]
    fn missing_query_is_empty() {
        let uri: Uri = "/autumn/products".parse().unwrap();
        let query: HashMap<String, String> = query_params(&uri);
        assert!(query.is_empty());
    }
}
