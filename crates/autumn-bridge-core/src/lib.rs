//! Core types and utilities for autumn-bridge.
//!
//! This crate provides the request-independent pieces of the bridge between an
//! application's session layer and the Autumn billing API:
//!
//! - **Contexts**: `SessionContext`, `Organization`, `OrganizationContext`
//! - **Subjects**: `BillingSubject`, `CustomerData`
//! - **Configuration**: `PluginConfig`, `CustomIdentity`
//! - **Identity**: `resolve`, `SubjectProvider`
//! - **Normalization**: `normalize`, `camel_to_snake`, `KeyExclusions`
//!
//! # Billing subjects
//!
//! Every billing call is made on behalf of exactly one subject: the signed-in
//! user, their active organization, or whatever a deployment-supplied
//! `CustomIdentity` returns. The subject is resolved lazily so that routes
//! such as product listing never pay for it.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod subject;

pub use config::{identity_fn, CustomIdentity, PluginConfig, PluginConfigBuilder, DEFAULT_BASE_URL};
pub use context::{Organization, OrganizationContext, SessionContext};
pub use error::{CoreError, Result};
pub use identity::{resolve, SubjectProvider};
pub use normalize::{camel_to_snake, normalize, KeyExclusions};
pub use subject::{BillingSubject, CustomerData};
