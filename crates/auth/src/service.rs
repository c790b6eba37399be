//! External service boundaries consumed by the resolver.
//!
//! The portal never talks to the backend directly: the identity service
//! and the two store boundaries are the only seams, and in-memory
//! implementations stand in for them under test.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::account::{Company, CompanyMembership, Profile};
use crate::error::{AuthError, StoreError};
use crate::session::Session;

/// Discrete tag attached to every identity-service notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    /// First notification after registration, carrying the current state
    InitialSession,
    /// A session was established interactively
    SignedIn,
    /// The session was terminated
    SignedOut,
    /// The access token was refreshed in the background
    TokenRefreshed,
}

/// Notification delivered on every identity state change.
///
/// The session payload replaces the previous one wholesale; a `None`
/// payload means the service no longer holds a session.
#[derive(Debug, Clone)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

/// Boundary to the external identity service.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Session currently known to the service, if any.
    async fn current_session(&self) -> Result<Option<Session>, AuthError>;

    /// Register for change notifications.
    ///
    /// The service emits an [`AuthEvent::InitialSession`] notification
    /// soon after registration and one notification per subsequent
    /// change, in order.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;

    /// Exchange credentials for a session.
    ///
    /// On success the new session arrives through the notification
    /// stream; this call itself carries no payload.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError>;

    /// Terminate the current session. Confirmed through a
    /// [`AuthEvent::SignedOut`] notification.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Boundary to the profile table.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row keyed by an identity id. `Ok(None)` means
    /// no row exists.
    async fn profile_by_id(&self, identity_id: &str) -> Result<Option<Profile>, StoreError>;
}

/// Boundary to the company-membership join, resolved together with the
/// company it points at.
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// Fetch the active membership for an identity id, joined with its
    /// company. `Ok(None)` means no membership row exists.
    async fn membership_with_company(
        &self,
        identity_id: &str,
    ) -> Result<Option<(CompanyMembership, Company)>, StoreError>;
}
