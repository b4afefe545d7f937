//! Billing client construction.

use std::sync::Arc;

use autumn_bridge_client::{AutumnClient, BillingApi, ClientError, ClientOptions};

/// Builds a billing client for one request.
pub trait BillingClientFactory: Send + Sync {
    /// Build a client scoped to `base_url` and `secret_key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be constructed.
    fn build(&self, base_url: &str, secret_key: &str) -> Result<Arc<dyn BillingApi>, ClientError>;
}

/// Builds [`AutumnClient`]s on a shared HTTP connection pool.
#[derive(Debug, Clone)]
pub struct AutumnClientFactory {
    http: reqwest::Client,
}

impl AutumnClientFactory {
    /// Create a factory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(options: &ClientOptions) -> Result<Self, ClientError> {
        Ok(Self {
            http: options.http_client()?,
        })
    }
}

impl BillingClientFactory for AutumnClientFactory {
    fn build(&self, base_url: &str, secret_key: &str) -> Result<Arc<dyn BillingApi>, ClientError> {
        let client = AutumnClient::with_http_client(self.http.clone(), base_url, secret_key)?;
        Ok(Arc::new(client))
    }
}
