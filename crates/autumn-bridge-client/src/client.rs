//! Autumn HTTP client implementation.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use urlencoding::encode;

use crate::error::ClientError;
use crate::types::{BillingMethod, BillingRequest, BillingResponse};

/// A billing API the dispatcher can call.
///
/// Implementors only provide [`send`](BillingApi::send); the per-operation
/// methods build the request for each Autumn endpoint.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// Send a raw request.
    ///
    /// # Errors
    ///
    /// Returns an error only when no response was received. Error statuses
    /// are returned as a [`BillingResponse`].
    async fn send(&self, request: BillingRequest) -> Result<BillingResponse, ClientError>;

    /// Get or create a customer.
    async fn create_customer(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/customers", body)).await
    }

    /// List products.
    async fn list_products(
        &self,
        query: HashMap<String, String>,
    ) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::get("/products").with_query(query))
            .await
    }

    /// Start a checkout.
    async fn checkout(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/checkout", body)).await
    }

    /// Attach a product to a customer.
    async fn attach(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/attach", body)).await
    }

    /// Check feature or product access.
    async fn check(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/check", body)).await
    }

    /// Record usage.
    async fn track(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/track", body)).await
    }

    /// Cancel a product.
    async fn cancel(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/cancel", body)).await
    }

    /// Create (or fetch) a referral code.
    async fn create_referral_code(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/referrals/code", body))
            .await
    }

    /// Redeem a referral code.
    async fn redeem_referral_code(&self, body: Value) -> Result<BillingResponse, ClientError> {
        self.send(BillingRequest::post("/referrals/redeem", body))
            .await
    }

    /// Open a billing portal session.
    async fn billing_portal(
        &self,
        customer_id: &str,
        body: Value,
    ) -> Result<BillingResponse, ClientError> {
        let path = format!("/customers/{}/billing_portal", encode(customer_id));
        self.send(BillingRequest::post(path, body)).await
    }

    /// Create one or more entities under a customer.
    async fn create_entity(
        &self,
        customer_id: &str,
        body: Value,
    ) -> Result<BillingResponse, ClientError> {
        let path = format!("/customers/{}/entities", encode(customer_id));
        self.send(BillingRequest::post(path, body)).await
    }

    /// Fetch an entity.
    async fn get_entity(
        &self,
        customer_id: &str,
        entity_id: &str,
        query: HashMap<String, String>,
    ) -> Result<BillingResponse, ClientError> {
        let path = format!(
            "/customers/{}/entities/{}",
            encode(customer_id),
            encode(entity_id)
        );
        self.send(BillingRequest::get(path).with_query(query)).await
    }

    /// Delete an entity.
    async fn delete_entity(
        &self,
        customer_id: &str,
        entity_id: &str,
    ) -> Result<BillingResponse, ClientError> {
        let path = format!(
            "/customers/{}/entities/{}",
            encode(customer_id),
            encode(entity_id)
        );
        self.send(BillingRequest::delete(path)).await
    }
}

/// Autumn API client.
#[derive(Clone)]
pub struct AutumnClient {
    client: Client,
    base_url: String,
    secret_key: String,
}

impl fmt::Debug for AutumnClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutumnClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl AutumnClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Autumn API URL (e.g., `"https://api.useautumn.com/v1"`)
    /// * `secret_key` - Autumn secret key
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty or the HTTP client cannot
    /// be built.
    pub fn new(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Self::with_options(base_url, secret_key, &ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty or the HTTP client cannot
    /// be built.
    pub fn with_options(
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
        options: &ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = options.http_client()?;
        Self::with_http_client(client, base_url, secret_key)
    }

    /// Create a client on top of an existing HTTP client, sharing its
    /// connection pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret key is empty.
    pub fn with_http_client(
        client: Client,
        base_url: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let secret_key = secret_key.into();
        if secret_key.trim().is_empty() {
            return Err(ClientError::Configuration("secret key is empty".into()));
        }

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    /// The base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BillingApi for AutumnClient {
    async fn send(&self, request: BillingRequest) -> Result<BillingResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);

        tracing::debug!(
            method = request.method.as_str(),
            url = %url,
            "Sending billing request"
        );

        let mut builder = match request.method {
            BillingMethod::Get => self.client.get(&url),
            BillingMethod::Post => self.client.post(&url),
            BillingMethod::Delete => self.client.delete(&url),
        }
        .bearer_auth(&self.secret_key);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;

        if bytes.is_empty() {
            return Ok(BillingResponse {
                status,
                body: Value::Null,
            });
        }

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(body) => Ok(BillingResponse { status, body }),
            Err(e) => {
                tracing::warn!(
                    status,
                    error = %e,
                    url = %url,
                    "Billing API returned non-JSON body"
                );
                // A 2xx with an unreadable body is still a failed call from our side.
                Ok(BillingResponse {
                    status: if status >= 400 { status } else { 502 },
                    body: json!({
                        "message": format!("Invalid response from billing API (HTTP {status})"),
                        "code": "invalid_response"
                    }),
                })
            }
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
    /// User agent sent with every request.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: concat!("autumn-bridge/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientOptions {
    /// Options with a custom timeout.
    #[must_use]
    pub fn with_timeout(timeout_seconds: u64) -> Self {
        Self {
            timeout_seconds,
            ..Self::default()
        }
    }

    /// Build an HTTP client with these options.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn http_client(&self) -> Result<Client, ClientError> {
        Ok(Client::builder()
            .timeout(Duration::from_secs(self.timeout_seconds))
            .user_agent(&self.user_agent)
            .build()?)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = AutumnClient::new("http://localhost:8080/v1/", "am_sk_test").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn empty_secret_key_rejected() {
        let err = AutumnClient::new("http://localhost:8080", "").unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn debug_hides_secret_key() {
        let client = AutumnClient::new("http://localhost:8080", "am_sk_secret").unwrap();
        assert!(!format!("{client:?}").contains("am_sk_secret"));
    }
}
