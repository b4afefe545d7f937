//! Autumn billing bridge HTTP service.
//!
//! Serves the billing endpoints under `/autumn` and forwards each request to
//! the Autumn API on behalf of the right billing subject:
//!
//! - The caller's session and active organization are resolved through
//!   pluggable [collaborators](collaborators).
//! - Public paths are rewritten to internal routes ([`route_table`]) and
//!   matched to handlers ([`router`]).
//! - Request bodies are converted from camelCase to snake_case.
//! - Handler failures are surfaced as `{ message, code }` with the handler's
//!   status.
//!
//! # Authentication
//!
//! Sessions come from HS256 bearer tokens when `SESSION_JWT_SECRET` is set.
//! Customer creation and product listing work without one; every other
//! endpoint answers 401.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers share one async signature

pub mod collaborators;
pub mod config;
pub mod context;
pub mod dispatcher;
pub mod endpoints;
pub mod error;
pub mod handlers;
pub mod route_table;
pub mod router;
pub mod routes;
pub mod state;

pub use collaborators::{
    BillingClientFactory, CredentialSource, OrganizationProvider, SessionProvider,
};
pub use config::ServiceConfig;
pub use context::{RequestContext, TransportResponse};
pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, StateError};
