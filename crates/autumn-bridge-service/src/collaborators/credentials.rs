//! Billing secret key lookup.

/// Environment variable holding the Autumn secret key.
pub const SECRET_KEY_ENV: &str = "AUTUMN_SECRET_KEY";

/// Error details a credential source can attach to a missing key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError {
    /// Status the source suggests.
    pub status: u16,
    /// Message.
    pub message: Option<String>,
    /// Code.
    pub code: Option<String>,
}

/// Outcome of a secret key check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretKeyCheck {
    /// A key is available.
    Found(String),
    /// No key; optional details from the source.
    Missing(Option<CredentialError>),
}

/// Source of the billing secret key when none is configured up front.
pub trait CredentialSource: Send + Sync {
    /// Look up the secret key.
    fn check_secret_key(&self) -> SecretKeyCheck;
}

/// Reads the secret key from the process environment on every check.
#[derive(Debug, Clone)]
pub struct EnvCredentialSource {
    var: String,
}

impl EnvCredentialSource {
    /// Read from `var` instead of [`SECRET_KEY_ENV`].
    #[must_use]
    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentialSource {
    fn default() -> Self {
        Self::with_var(SECRET_KEY_ENV)
    }
}

impl CredentialSource for EnvCredentialSource {
    fn check_secret_key(&self) -> SecretKeyCheck {
        match std::env::var(&self.var) {
            Ok(key) if !key.trim().is_empty() => SecretKeyCheck::Found(key),
            _ => SecretKeyCheck::Missing(Some(CredentialError {
                status: 500,
                message: Some(format!("Autumn secret key not found. Set {}", self.var)),
                code: Some("no_secret_key".to_string()),
            })),
        }
    }
}
