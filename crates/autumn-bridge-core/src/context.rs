//! Session and organization contexts.
//!
//! Both are owned by the authentication collaborators; the core only reads
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// User id.
    pub user_id: String,
    /// User email.
    pub email: String,
    /// User display name.
    pub name: String,
    /// Organization the user currently has selected, if any.
    #[serde(default)]
    pub active_organization_id: Option<String>,
    /// When the session expires.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    /// Create a session without an active organization.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            name: name.into(),
            active_organization_id: None,
            expires_at: None,
        }
    }

    /// Set the active organization.
    #[must_use]
    pub fn with_active_organization(mut self, organization_id: impl Into<String>) -> Self {
        self.active_organization_id = Some(organization_id.into());
        self
    }

    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// An organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// Organization id.
    pub id: String,
    /// Organization name.
    #[serde(default)]
    pub name: Option<String>,
}

/// The caller's active organization and the email of its billing owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationContext {
    /// Active organization, if any.
    pub organization: Option<Organization>,
    /// Email of the organization's owner.
    pub owner_email: Option<String>,
}

impl OrganizationContext {
    /// No active organization.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// An active organization with a resolved owner email.
    #[must_use]
    pub fn active(organization: Organization, owner_email: Option<String>) -> Self {
        Self {
            organization: Some(organization),
            owner_email,
        }
    }

    /// The active organization id.
    #[must_use]
    pub fn organization_id(&self) -> Option<&str> {
        self.organization.as_ref().map(|o| o.id.as_str())
    }
}
