//! Client error types.

/// Errors that can occur when talking to the billing API.
///
/// Error *responses* from the API are not errors at this level; they come back
/// as a [`BillingResponse`](crate::BillingResponse) with a 4xx/5xx status.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}
