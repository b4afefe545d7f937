//! Service configuration.

use std::path::Path;

use autumn_bridge_core::{PluginConfig, DEFAULT_BASE_URL};
use serde::Deserialize;

/// Service configuration loaded from environment variables.
#[derive(Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Autumn API base URL (default: [`DEFAULT_BASE_URL`]).
    pub autumn_base_url: String,

    /// Autumn secret key. When unset, the key is looked up per request.
    pub autumn_secret_key: Option<String>,

    /// HS256 secret for session tokens. Without it no request has a session.
    pub session_jwt_secret: Option<String>,

    /// Expected session token issuer (optional).
    pub session_issuer: Option<String>,

    /// Bill the active organization instead of the user.
    pub enable_organizations: bool,

    /// JSON file with the organization directory (optional).
    pub organizations_file: Option<String>,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Timeout for calls to the Autumn API in seconds.
    pub billing_timeout_seconds: u64,
}

/// Autumn secrets file structure.
#[derive(Debug, Deserialize)]
struct AutumnSecrets {
    secret_key: String,
    #[serde(default)]
    base_url: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let (autumn_secret_key, secrets_base_url) = load_autumn_secrets();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            autumn_base_url: secrets_base_url
                .or_else(|| std::env::var("AUTUMN_BASE_URL").ok())
                .unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            autumn_secret_key,
            session_jwt_secret: std::env::var("SESSION_JWT_SECRET").ok(),
            session_issuer: std::env::var("SESSION_ISSUER").ok(),
            enable_organizations: std::env::var("ENABLE_ORGANIZATIONS")
                .ok()
                .is_some_and(|v| parse_flag(&v)),
            organizations_file: std::env::var("ORGANIZATIONS_FILE").ok(),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            billing_timeout_seconds: std::env::var("BILLING_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(20),
        }
    }

    /// Build the plugin configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an http(s) URL.
    pub fn plugin_config(&self) -> autumn_bridge_core::Result<PluginConfig> {
        let mut builder = PluginConfig::builder()
            .base_url(&self.autumn_base_url)
            .enable_organizations(self.enable_organizations);
        if let Some(key) = &self.autumn_secret_key {
            builder = builder.secret_key(key);
        }
        builder.build()
    }
}

impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("listen_addr", &self.listen_addr)
            .field("autumn_base_url", &self.autumn_base_url)
            .field("autumn_secret_key", &self.autumn_secret_key.as_ref().map(|_| "***"))
            .field("session_jwt_secret", &self.session_jwt_secret.as_ref().map(|_| "***"))
            .field("session_issuer", &self.session_issuer)
            .field("enable_organizations", &self.enable_organizations)
            .field("organizations_file", &self.organizations_file)
            .field("cors_origins", &self.cors_origins)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("billing_timeout_seconds", &self.billing_timeout_seconds)
            .finish()
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Load Autumn secrets from file or environment.
fn load_autumn_secrets() -> (Option<String>, Option<String>) {
    let secret_paths = [
        ".secrets/autumn.json",
        "autumn-bridge/.secrets/autumn.json",
        "../.secrets/autumn.json",
    ];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<AutumnSecrets>(path) {
            tracing::info!(path = %path, "Loaded Autumn secrets from file");
            return (Some(secrets.secret_key), secrets.base_url);
        }
    }

    tracing::debug!("Autumn secrets file not found, using environment variables");
    (std::env::var("AUTUMN_SECRET_KEY").ok(), None)
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(
    path: impl AsRef<Path>,
) -> Result<T, std::io::Error> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            autumn_base_url: DEFAULT_BASE_URL.into(),
            autumn_secret_key: None,
            session_jwt_secret: None,
            session_issuer: None,
            enable_organizations: false,
            organizations_file: None,
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            billing_timeout_seconds: 20,
        }
    }
}
