//! Session and identity management for the HeliConnect company portal.
//!
//! This crate owns the authenticated-identity lifecycle: session
//! acquisition, identity-to-profile resolution, company-membership
//! resolution, and the derived authorization snapshot the rest of the
//! portal renders from.
//!
//! # Core Concepts
//!
//! - **Session / Identity**: opaque credentials issued by the external
//!   identity service, replaced wholesale on every notification
//! - **Profile**: the application-level record carrying the
//!   authorization-relevant [`Role`](heliconnect_core::Role)
//! - **Company / Membership**: organization-scoped context, resolved only
//!   for company and superadmin roles
//! - **Resolver**: a single-writer task driven by the identity service's
//!   notification stream; consumers read an atomic snapshot through a
//!   watch channel
//!
//! # Integration Points
//!
//! Pages and route gates hold an [`AuthHandle`]: they read
//! [`AuthSnapshot`]s, await changes, and issue the three actions
//! (`sign_in`, `sign_out`, `refresh_profile`). The backing identity
//! service and data store are reached through the traits in
//! [`service`], so the portal never talks to the backend directly.

pub mod account;
pub mod error;
pub mod resolver;
pub mod service;
pub mod session;

pub use account::{
    BankDetails, BillingAddress, Company, CompanyAddress, CompanyMembership, CompanyRole, Profile,
};
pub use error::{AuthError, StoreError};
pub use resolver::{AuthHandle, AuthSnapshot, SessionResolver};
pub use service::{AuthChange, AuthEvent, IdentityService, MembershipStore, ProfileStore};
pub use session::{Identity, Session};

// Re-export the role model for convenience
pub use heliconnect_core::Role;
