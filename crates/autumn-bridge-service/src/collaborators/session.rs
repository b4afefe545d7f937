//! Session resolution.
//!
//! The default provider validates HS256 bearer tokens issued by the
//! application's auth layer and maps their claims to a [`SessionContext`].
//! Missing, malformed and expired tokens all resolve to "no session"; whether
//! that is acceptable is decided per endpoint by the dispatcher.

use async_trait::async_trait;
use autumn_bridge_core::SessionContext;
use chrono::{TimeZone, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::context::RequestContext;

/// Resolves the authenticated principal of a request.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The request's session, or `None` if it is unauthenticated.
    async fn get_session(&self, ctx: &RequestContext) -> Option<SessionContext>;
}

/// A provider for deployments without session support: never a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnonymousSessions;

#[async_trait]
impl SessionProvider for AnonymousSessions {
    async fn get_session(&self, _ctx: &RequestContext) -> Option<SessionContext> {
        None
    }
}

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID).
    pub sub: String,
    /// User email.
    pub email: String,
    /// User display name.
    #[serde(default)]
    pub name: String,
    /// Active organization, if the user has selected one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_organization_id: Option<String>,
    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Expiration time.
    pub exp: i64,
}

impl From<SessionClaims> for SessionContext {
    fn from(claims: SessionClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            active_organization_id: claims.active_organization_id,
            expires_at: Utc.timestamp_opt(claims.exp, 0).single(),
        }
    }
}

/// Validates `Authorization: Bearer <jwt>` session tokens.
pub struct JwtSessionProvider {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionProvider {
    /// Create a provider for tokens signed with `secret`.
    ///
    /// When `issuer` is given, tokens must carry a matching `iss` claim.
    #[must_use]
    pub fn new(secret: &str, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    fn validate(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(error = %e, "Session token rejected");
                None
            }
        }
    }
}

#[async_trait]
impl SessionProvider for JwtSessionProvider {
    async fn get_session(&self, ctx: &RequestContext) -> Option<SessionContext> {
        let token = ctx.header("authorization")?.strip_prefix("Bearer ")?;
        let claims = self.validate(token.trim())?;
        Some(claims.into())
    }
}
