//! Billing subject resolution.
//!
//! Resolution is deferred: [`resolve`] only captures the request's contexts,
//! and the subject is computed the first time a handler calls
//! [`SubjectProvider::resolve`]. Handlers that do not bill anyone (listing
//! products, for example) never trigger it.
//!
//! # Decision order
//!
//! 1. A configured [`CustomIdentity`](crate::CustomIdentity) wins outright,
//!    whether or not there is a session.
//! 2. No session resolves to no subject.
//! 3. Organizations disabled, or no active organization: the user.
//! 4. Otherwise: the active organization, with its owner's email.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::{CustomIdentity, PluginConfig};
use crate::context::{OrganizationContext, SessionContext};
use crate::subject::{BillingSubject, CustomerData};

/// Build the subject provider for a request.
///
/// Uses the custom identity branch when one is configured, otherwise the
/// session/organization-derived rules.
#[must_use]
pub fn resolve(
    session: Option<SessionContext>,
    organization: OrganizationContext,
    config: Arc<PluginConfig>,
) -> SubjectProvider {
    match config.custom_identity.clone() {
        Some(identity) => SubjectProvider::custom(identity, session, organization, config),
        None => SubjectProvider::derived(session, organization, &config),
    }
}

enum Source {
    Custom {
        identity: Arc<dyn CustomIdentity>,
        session: Option<SessionContext>,
        organization: OrganizationContext,
        config: Arc<PluginConfig>,
    },
    Derived {
        session: Option<SessionContext>,
        organization: OrganizationContext,
        enable_organizations: bool,
    },
}

/// Deferred billing subject for one request.
pub struct SubjectProvider {
    source: Source,
    resolved: OnceCell<Option<BillingSubject>>,
}

impl SubjectProvider {
    /// Provider backed by a custom identity resolver.
    #[must_use]
    pub fn custom(
        identity: Arc<dyn CustomIdentity>,
        session: Option<SessionContext>,
        organization: OrganizationContext,
        config: Arc<PluginConfig>,
    ) -> Self {
        Self::from_source(Source::Custom {
            identity,
            session,
            organization,
            config,
        })
    }

    /// Provider derived from the session and active organization.
    #[must_use]
    pub fn derived(
        session: Option<SessionContext>,
        organization: OrganizationContext,
        config: &PluginConfig,
    ) -> Self {
        Self::from_source(Source::Derived {
            session,
            organization,
            enable_organizations: config.enable_organizations,
        })
    }

    /// A provider that always yields `subject`.
    #[must_use]
    pub fn fixed(subject: Option<BillingSubject>) -> Self {
        Self {
            source: Source::Derived {
                session: None,
                organization: OrganizationContext::none(),
                enable_organizations: false,
            },
            resolved: OnceCell::new_with(Some(subject)),
        }
    }

    fn from_source(source: Source) -> Self {
        Self {
            source,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve the subject, computing it on first use.
    pub async fn resolve(&self) -> Option<BillingSubject> {
        self.resolved
            .get_or_init(|| async { self.compute().await })
            .await
            .clone()
    }

    /// Whether [`resolve`](Self::resolve) has already run.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.initialized()
    }

    async fn compute(&self) -> Option<BillingSubject> {
        match &self.source {
            Source::Custom {
                identity,
                session,
                organization,
                config,
            } => identity.identify(organization, config, session.as_ref()).await,
            Source::Derived {
                session,
                organization,
                enable_organizations,
            } => derive(session.as_ref(), organization, *enable_organizations),
        }
    }
}

/// An active organization bills as itself when enabled; otherwise the user
/// does. A blank id on either side yields no subject from that side.
fn derive(
    session: Option<&SessionContext>,
    organization: &OrganizationContext,
    enable_organizations: bool,
) -> Option<BillingSubject> {
    let session = session?;

    let organization_subject = organization
        .organization
        .as_ref()
        .filter(|_| enable_organizations)
        .and_then(|org| {
            let data = CustomerData {
                email: organization.owner_email.clone(),
                name: Some(org.name.clone().unwrap_or_default()),
            };
            BillingSubject::new(org.id.clone(), data).ok()
        });

    organization_subject.or_else(|| {
        let data = CustomerData::new(session.email.clone(), session.name.clone());
        BillingSubject::new(session.user_id.clone(), data).ok()
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::config::identity_fn;
    use crate::context::Organization;

    fn ann() -> SessionContext {
        SessionContext::new("u1", "a@x.com", "Ann")
    }

    fn acme() -> OrganizationContext {
        OrganizationContext::active(
            Organization {
                id: "org1".into(),
                name: Some("Acme".into()),
            },
            Some("owner@acme.com".into()),
        )
    }

    fn config(enable_organizations: bool) -> Arc<PluginConfig> {
        Arc::new(
            PluginConfig::builder()
                .enable_organizations(enable_organizations)
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn user_subject_without_organization() {
        let provider = resolve(Some(ann()), OrganizationContext::none(), config(false));

        let subject = provider.resolve().await.unwrap();
        assert_eq!(subject.subject_id, "u1");
        assert_eq!(subject.display_data, CustomerData::new("a@x.com", "Ann"));
    }

    #[tokio::test]
    async fn organization_subject_when_enabled() {
        let provider = resolve(Some(ann()), acme(), config(true));

        let subject = provider.resolve().await.unwrap();
        assert_eq!(subject.subject_id, "org1");
        assert_eq!(
            subject.display_data,
            CustomerData::new("owner@acme.com", "Acme")
        );
    }

    #[tokio::test]
    async fn organization_ignored_when_disabled() {
        let provider = resolve(Some(ann()), acme(), config(false));

        let subject = provider.resolve().await.unwrap();
        assert_eq!(subject.subject_id, "u1");
    }

    #[tokio::test]
    async fn unnamed_organization_gets_empty_name() {
        let org = OrganizationContext::active(
            Organization {
                id: "org2".into(),
                name: None,
            },
            None,
        );
        let provider = resolve(Some(ann()), org, config(true));

        let subject = provider.resolve().await.unwrap();
        assert_eq!(subject.subject_id, "org2");
        assert_eq!(subject.display_data.name.as_deref(), Some(""));
        assert_eq!(subject.display_data.email, None);
    }

    #[tokio::test]
    async fn blank_organization_id_falls_back_to_user() {
        let org = OrganizationContext::active(
            Organization {
                id: " ".into(),
                name: Some("Ghost".into()),
            },
            None,
        );
        let provider = resolve(Some(ann()), org, config(true));

        assert_eq!(provider.resolve().await.unwrap().subject_id, "u1");
    }

    #[tokio::test]
    async fn blank_user_id_has_no_subject() {
        let session = SessionContext::new("", "a@x.com", "Ann");
        let provider = resolve(Some(session), OrganizationContext::none(), config(false));

        assert!(provider.resolve().await.is_none());
    }

    #[tokio::test]
    async fn no_session_no_subject() {
        let provider = resolve(None, acme(), config(true));
        assert!(provider.resolve().await.is_none());
    }

    #[tokio::test]
    async fn custom_identity_takes_precedence() {
        let identity = identity_fn(|_, _| {
            Some(BillingSubject {
                subject_id: "tenant-7".into(),
                display_data: CustomerData::default(),
            })
        });
        let config = Arc::new(
            PluginConfig::builder()
                .enable_organizations(true)
                .custom_identity(identity)
                .build()
                .unwrap(),
        );

        let with_session = resolve(Some(ann()), acme(), config.clone());
        let without_session = resolve(None, OrganizationContext::none(), config);

        assert_eq!(with_session.resolve().await.unwrap().subject_id, "tenant-7");
        assert_eq!(
            without_session.resolve().await.unwrap().subject_id,
            "tenant-7"
        );
    }

    #[tokio::test]
    async fn custom_identity_runs_once_and_only_on_demand() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let identity = identity_fn(move |_, session| {
            counter.fetch_add(1, Ordering::SeqCst);
            session.map(|s| BillingSubject {
                subject_id: format!("custom-{}", s.user_id),
                display_data: CustomerData::default(),
            })
        });
        let config = Arc::new(PluginConfig::builder().custom_identity(identity).build().unwrap());

        let provider = resolve(Some(ann()), OrganizationContext::none(), config);
        assert!(!provider.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = provider.resolve().await;
        let second = provider.resolve().await;

        assert!(provider.is_resolved());
        assert_eq!(first, second);
        assert_eq!(first.unwrap().subject_id, "custom-u1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fixed_provider() {
        let provider = SubjectProvider::fixed(None);
        assert!(provider.is_resolved());
        assert!(provider.resolve().await.is_none());
    }
}
