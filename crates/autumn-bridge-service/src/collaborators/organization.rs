//! Organization resolution.
//!
//! The default provider is an in-memory directory of organizations and their
//! members, optionally loaded from a JSON file at startup. The active
//! organization comes from the session; the billing owner is the first
//! member with the `owner` role.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use autumn_bridge_core::{Organization, OrganizationContext, PluginConfig, SessionContext};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::context::RequestContext;

/// Resolves the caller's active organization.
#[async_trait]
pub trait OrganizationProvider: Send + Sync {
    /// The active organization and its owner's email.
    ///
    /// Always called, even when organization billing is disabled, because a
    /// custom identity resolver may still want it.
    async fn organization_context(
        &self,
        ctx: &RequestContext,
        session: Option<&SessionContext>,
        config: &PluginConfig,
    ) -> OrganizationContext;
}

/// Errors loading an organization directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The file could not be read.
    #[error("failed to read organizations file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON of the expected shape.
    #[error("failed to parse organizations file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Role of an organization member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Owner; receives billing email.
    Owner,
    /// Administrator.
    Admin,
    /// Regular member.
    Member,
}

/// An organization member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationMember {
    /// User ID.
    pub user_id: String,
    /// User email.
    pub email: String,
    /// Role in the organization.
    pub role: MemberRole,
}

/// An organization and its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRecord {
    /// Organization ID.
    pub id: String,
    /// Organization name.
    #[serde(default)]
    pub name: Option<String>,
    /// Members.
    #[serde(default)]
    pub members: Vec<OrganizationMember>,
}

impl OrganizationRecord {
    /// Email of the first owner.
    #[must_use]
    pub fn owner_email(&self) -> Option<&str> {
        self.members
            .iter()
            .find(|m| m.role == MemberRole::Owner)
            .map(|m| m.email.as_str())
    }

    /// Whether `user_id` is a member.
    #[must_use]
    pub fn has_member(&self, user_id: &str) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

/// In-memory organization directory.
#[derive(Debug, Default)]
pub struct OrganizationDirectory {
    organizations: RwLock<HashMap<String, OrganizationRecord>>,
}

impl OrganizationDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a directory from records.
    #[must_use]
    pub fn from_records(records: impl IntoIterator<Item = OrganizationRecord>) -> Self {
        let organizations = records.into_iter().map(|r| (r.id.clone(), r)).collect();
        Self {
            organizations: RwLock::new(organizations),
        }
    }

    /// Load records from a JSON array file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let records: Vec<OrganizationRecord> = serde_json::from_str(&contents)?;
        tracing::info!(
            path = %path.as_ref().display(),
            count = records.len(),
            "Loaded organization directory"
        );
        Ok(Self::from_records(records))
    }

    /// Insert or replace an organization.
    pub async fn upsert(&self, record: OrganizationRecord) {
        self.organizations
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    /// Remove an organization.
    pub async fn remove(&self, id: &str) -> Option<OrganizationRecord> {
        self.organizations.write().await.remove(id)
    }

    /// Look up an organization.
    pub async fn get(&self, id: &str) -> Option<OrganizationRecord> {
        self.organizations.read().await.get(id).cloned()
    }
}

#[async_trait]
impl OrganizationProvider for OrganizationDirectory {
    async fn organization_context(
        &self,
        _ctx: &RequestContext,
        session: Option<&SessionContext>,
        _config: &PluginConfig,
    ) -> OrganizationContext {
        let Some(session) = session else {
            return OrganizationContext::none();
        };
        let Some(org_id) = session.active_organization_id.as_deref() else {
            return OrganizationContext::none();
        };

        match self.get(org_id).await {
            Some(record) => {
                if !record.has_member(&session.user_id) {
                    tracing::warn!(
                        user_id = %session.user_id,
                        organization_id = %org_id,
                        "Active organization does not list the session user as a member"
                    );
                }
                let owner_email = record.owner_email().map(str::to_string);
                OrganizationContext::active(
                    Organization {
                        id: record.id,
                        name: record.name,
                    },
                    owner_email,
                )
            }
            None => {
                tracing::debug!(organization_id = %org_id, "Active organization not in directory");
                OrganizationContext::active(
                    Organization {
                        id: org_id.to_string(),
                        name: None,
                    },
                    None,
                )
            }
        }
    }
}
