//! Application state.

use std::sync::Arc;

use autumn_bridge_client::{ClientError, ClientOptions};
use autumn_bridge_core::PluginConfig;

use crate::collaborators::{
    AnonymousSessions, AutumnClientFactory, BillingClientFactory, CredentialSource,
    DirectoryError, EnvCredentialSource, JwtSessionProvider, OrganizationDirectory,
    OrganizationProvider, SessionProvider,
};
use crate::config::ServiceConfig;

/// Errors building [`AppState`] at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    /// The billing HTTP client could not be built.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The configured organizations file could not be loaded.
    #[error("organizations file {path}: {source}")]
    Organizations {
        /// Configured path.
        path: String,
        /// Underlying error.
        #[source]
        source: DirectoryError,
    },
}

/// Application state shared across requests.
///
/// Everything here is read-only once the server is running.
#[derive(Clone)]
pub struct AppState {
    /// Plugin configuration used for identity resolution and client setup.
    pub plugin: Arc<PluginConfig>,

    /// Service configuration.
    pub config: ServiceConfig,

    /// Session collaborator.
    pub sessions: Arc<dyn SessionProvider>,

    /// Organization collaborator.
    pub organizations: Arc<dyn OrganizationProvider>,

    /// Secret key lookup used when the plugin has no key.
    pub credentials: Arc<dyn CredentialSource>,

    /// Billing client construction.
    pub clients: Arc<dyn BillingClientFactory>,
}

impl AppState {
    /// Create state with the default collaborators for `config`.
    ///
    /// Sessions are validated with the configured JWT secret; without one,
    /// no request has a session. The organization directory is loaded from
    /// the configured file if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured organizations file cannot be read
    /// or parsed, or if the billing HTTP client cannot be built.
    pub fn new(plugin: PluginConfig, config: ServiceConfig) -> Result<Self, StateError> {
        let sessions: Arc<dyn SessionProvider> = match &config.session_jwt_secret {
            Some(secret) => {
                tracing::info!("Session token validation enabled");
                Arc::new(JwtSessionProvider::new(
                    secret,
                    config.session_issuer.as_deref(),
                ))
            }
            None => {
                tracing::warn!("SESSION_JWT_SECRET not set - all requests are anonymous");
                Arc::new(AnonymousSessions)
            }
        };

        let organizations = match &config.organizations_file {
            Some(path) => {
                OrganizationDirectory::load(path).map_err(|source| StateError::Organizations {
                    path: path.clone(),
                    source,
                })?
            }
            None => OrganizationDirectory::default(),
        };

        let options = ClientOptions::with_timeout(config.billing_timeout_seconds);
        let clients = AutumnClientFactory::new(&options)?;

        Ok(Self {
            plugin: Arc::new(plugin),
            config,
            sessions,
            organizations: Arc::new(organizations),
            credentials: Arc::new(EnvCredentialSource::default()),
            clients: Arc::new(clients),
        })
    }

    /// Replace the session collaborator.
    #[must_use]
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionProvider>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Replace the organization collaborator.
    #[must_use]
    pub fn with_organizations(mut self, organizations: Arc<dyn OrganizationProvider>) -> Self {
        self.organizations = organizations;
        self
    }

    /// Replace the credential source.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Arc<dyn CredentialSource>) -> Self {
        self.credentials = credentials;
        self
    }

    /// Replace the billing client factory.
    #[must_use]
    pub fn with_clients(mut self, clients: Arc<dyn BillingClientFactory>) -> Self {
        self.clients = clients;
        self
    }

    /// Whether a secret key is configured up front.
    #[must_use]
    pub fn has_secret_key(&self) -> bool {
        self.plugin.secret_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn config_with_organizations(path: &str) -> ServiceConfig {
        ServiceConfig {
            organizations_file: Some(path.to_string()),
            ..ServiceConfig::default()
        }
    }

    #[test]
    fn organizations_file_is_loaded() {
        let records = serde_json::json!([{
            "id": "org1",
            "name": "Acme",
            "members": [{ "user_id": "u1", "email": "o@acme.com", "role": "owner" }]
        }]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{records}").unwrap();

        let config = config_with_organizations(file.path().to_str().unwrap());
        assert!(AppState::new(PluginConfig::default(), config).is_ok());
    }

    #[test]
    fn invalid_organizations_file_fails_startup() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();

        let config = config_with_organizations(file.path().to_str().unwrap());
        let err = AppState::new(PluginConfig::default(), config).err().unwrap();
        assert!(matches!(
            err,
            StateError::Organizations {
                source: DirectoryError::Parse(_),
                ..
            }
        ));
    }

    #[test]
    fn missing_organizations_file_fails_startup() {
        let config = config_with_organizations("/nonexistent/organizations.json");
        let err = AppState::new(PluginConfig::default(), config).err().unwrap();
        assert!(matches!(
            err,
            StateError::Organizations {
                source: DirectoryError::Io(_),
                ..
            }
        ));
    }

    #[test]
    fn secret_key_presence() {
        let state = AppState::new(PluginConfig::default(), ServiceConfig::default()).unwrap();
        assert!(!state.has_secret_key());

        let plugin = PluginConfig::builder().secret_key("am_sk_x").build().unwrap();
        let state = AppState::new(plugin, ServiceConfig::default()).unwrap();
        assert!(state.has_secret_key());
    }
}
