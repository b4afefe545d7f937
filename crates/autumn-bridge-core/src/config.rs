//! Plugin configuration.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{OrganizationContext, SessionContext};
use crate::error::{CoreError, Result};
use crate::subject::BillingSubject;

/// Default Autumn API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.useautumn.com/v1";

/// Deployment-supplied identity resolution.
///
/// When configured, its result replaces the user- and organization-derived
/// subject entirely, including for requests without a session.
#[async_trait]
pub trait CustomIdentity: Send + Sync {
    /// Resolve the billing subject for a request.
    async fn identify(
        &self,
        organization: &OrganizationContext,
        config: &PluginConfig,
        session: Option<&SessionContext>,
    ) -> Option<BillingSubject>;
}

struct FnIdentity<F>(F);

#[async_trait]
impl<F> CustomIdentity for FnIdentity<F>
where
    F: Fn(&OrganizationContext, Option<&SessionContext>) -> Option<BillingSubject> + Send + Sync,
{
    async fn identify(
        &self,
        organization: &OrganizationContext,
        _config: &PluginConfig,
        session: Option<&SessionContext>,
    ) -> Option<BillingSubject> {
        (self.0)(organization, session)
    }
}

/// Wrap a synchronous closure as a [`CustomIdentity`].
pub fn identity_fn<F>(f: F) -> Arc<dyn CustomIdentity>
where
    F: Fn(&OrganizationContext, Option<&SessionContext>) -> Option<BillingSubject>
        + Send
        + Sync
        + 'static,
{
    Arc::new(FnIdentity(f))
}

/// Process-wide plugin configuration.
///
/// Built once at startup and shared read-only across requests.
#[derive(Clone)]
pub struct PluginConfig {
    /// Custom identity resolution, overriding the derived subject.
    pub custom_identity: Option<Arc<dyn CustomIdentity>>,
    /// Bill the active organization instead of the user when one is selected.
    pub enable_organizations: bool,
    /// Billing API base URL.
    pub base_url: String,
    /// Billing API secret key.
    pub secret_key: Option<String>,
}

impl PluginConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> PluginConfigBuilder {
        PluginConfigBuilder::default()
    }

    /// Whether a custom identity resolver is configured.
    #[must_use]
    pub fn has_custom_identity(&self) -> bool {
        self.custom_identity.is_some()
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            custom_identity: None,
            enable_organizations: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            secret_key: None,
        }
    }
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("custom_identity", &self.custom_identity.is_some())
            .field("enable_organizations", &self.enable_organizations)
            .field("base_url", &self.base_url)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Builder for [`PluginConfig`].
#[derive(Default)]
pub struct PluginConfigBuilder {
    custom_identity: Option<Arc<dyn CustomIdentity>>,
    enable_organizations: bool,
    base_url: Option<String>,
    secret_key: Option<String>,
}

impl PluginConfigBuilder {
    /// Set a custom identity resolver.
    #[must_use]
    pub fn custom_identity(mut self, identity: Arc<dyn CustomIdentity>) -> Self {
        self.custom_identity = Some(identity);
        self
    }

    /// Enable organization-scoped billing.
    #[must_use]
    pub fn enable_organizations(mut self, enabled: bool) -> Self {
        self.enable_organizations = enabled;
        self
    }

    /// Override the billing API base URL.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the billing API secret key.
    #[must_use]
    pub fn secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }

    /// Build the configuration.
    ///
    /// Fails if the base URL is not an http(s) URL. Empty secret keys are
    /// treated as unset.
    pub fn build(self) -> Result<PluginConfig> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CoreError::Configuration(format!(
                "base url must be http(s): {base_url}"
            )));
        }

        Ok(PluginConfig {
            custom_identity: self.custom_identity,
            enable_organizations: self.enable_organizations,
            base_url,
            secret_key: self.secret_key.filter(|k| !k.trim().is_empty()),
        })
    }
}
