//! Collaborators the dispatcher consumes.
//!
//! Each concern is a trait so deployments (and tests) can swap the
//! implementation; the default implementations here are enough to run the
//! service standalone.

pub mod billing;
pub mod credentials;
pub mod organization;
pub mod session;

pub use billing::{AutumnClientFactory, BillingClientFactory};
pub use credentials::{CredentialError, CredentialSource, EnvCredentialSource, SecretKeyCheck};
pub use organization::{
    DirectoryError, MemberRole, OrganizationDirectory, OrganizationMember, OrganizationProvider,
    OrganizationRecord,
};
pub use session::{AnonymousSessions, JwtSessionProvider, SessionClaims, SessionProvider};
