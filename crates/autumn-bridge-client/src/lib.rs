//! Autumn billing API client.
//!
//! This crate provides the billing-client collaborator used by the
//! autumn-bridge dispatcher. Calls are expressed as [`BillingRequest`]s and
//! answered with a [`BillingResponse`] carrying the provider's status code and
//! JSON body verbatim; error statuses are data here, not `Err`.
//!
//! # Example
//!
//! ```no_run
//! use autumn_bridge_client::{AutumnClient, BillingApi};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), autumn_bridge_client::ClientError> {
//! let client = AutumnClient::new("https://api.useautumn.com/v1", "am_sk_test_123")?;
//!
//! let response = client
//!     .check(json!({ "customer_id": "user_123", "feature_id": "messages" }))
//!     .await?;
//!
//! println!("allowed: {}", response.body["allowed"]);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{AutumnClient, BillingApi, ClientOptions};
pub use error::ClientError;
pub use types::*;
