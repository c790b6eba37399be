//! Subscription-driven session resolver.
//!
//! Single source of truth for who is logged in, what role they have, and
//! whether the rest of the portal may render protected content. The
//! resolver runs as one task; the identity-service notification stream is
//! its only writer, so every state transition flows through a single code
//! path and consumers can never observe a half-applied update.
//!
//! # State Transitions
//!
//! ```text
//! Bootstrapping
//!     ↓ (first notification, null session)      ↓ (first notification, session)
//! Unauthenticated                     AuthenticatedNoProfile
//!                                               ↓ (profile resolved)
//!                                     AuthenticatedWithProfile
//!                                       ├─ NoCompanyAccess            (role = client)
//!                                       ├─ CompanyAccessPendingMembership
//!                                       └─ CompanyAccessWithMembership
//! ```
//!
//! Sign-out returns the machine to `Unauthenticated`; there is no
//! terminal state. `Bootstrapping` is entered exactly once, at process
//! start, and never again.
//!
//! # Ordering
//!
//! The notification subscription is registered **before** the current
//! session is queried, so nothing emitted in between is lost.
//! Notifications and resolution chains are processed strictly one at a
//! time: a fetch chain started by an older notification finishes before a
//! newer notification is applied, so the newest notification's result is
//! always the final state and a stale fetch can never overwrite it.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, warn};

use crate::account::{Company, CompanyMembership, Profile};
use crate::error::AuthError;
use crate::service::{AuthChange, AuthEvent, IdentityService, MembershipStore, ProfileStore};
use crate::session::{Identity, Session};

/// Atomic snapshot of the resolved identity state.
///
/// Consumers receive whole snapshots through a watch channel; fields are
/// replaced together, never one at a time.
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    /// Credential bundle currently held by the identity service
    pub session: Option<Session>,
    /// Identity the session was issued for
    pub identity: Option<Identity>,
    /// Application profile resolved for the identity
    pub profile: Option<Profile>,
    /// Company context, only for company-access roles
    pub company: Option<Company>,
    /// Membership row linking profile and company
    pub membership: Option<CompanyMembership>,
    /// True until the first notification has been fully processed,
    /// including the profile/company fetches it triggers
    pub bootstrapping: bool,
}

impl AuthSnapshot {
    /// Snapshot the portal starts from.
    pub fn initial() -> Self {
        Self {
            session: None,
            identity: None,
            profile: None,
            company: None,
            membership: None,
            bootstrapping: true,
        }
    }

    /// True once bootstrap is complete and both an identity and its
    /// profile are present.
    ///
    /// Deliberately requires the profile, not just the identity: no
    /// authorization decision may be made before the role is known.
    pub fn is_authenticated(&self) -> bool {
        !self.bootstrapping && self.identity.is_some() && self.profile.is_some()
    }

    /// Purely role-derived. Independent of whether the company or
    /// membership rows have finished loading.
    pub fn has_company_access(&self) -> bool {
        self.profile
            .as_ref()
            .map(|profile| profile.role.has_company_access())
            .unwrap_or(false)
    }
}

/// Actions routed into the resolver task so they serialize with
/// notification processing.
enum Command {
    RefreshProfile,
}

/// The resolver task. Constructed and spawned through
/// [`SessionResolver::spawn`]; consumers interact via [`AuthHandle`].
pub struct SessionResolver {
    identity_service: Arc<dyn IdentityService>,
    profiles: Arc<dyn ProfileStore>,
    memberships: Arc<dyn MembershipStore>,
    changes: broadcast::Receiver<AuthChange>,
    commands: mpsc::Receiver<Command>,
    state: watch::Sender<AuthSnapshot>,
    bootstrapped: bool,
}

impl SessionResolver {
    /// Register the notification subscription, spawn the resolver task,
    /// and return the consumer handle.
    ///
    /// Subscription happens here, synchronously, before the task queries
    /// the current session: a notification fired the instant this
    /// function returns is still delivered.
    pub fn spawn(
        identity_service: Arc<dyn IdentityService>,
        profiles: Arc<dyn ProfileStore>,
        memberships: Arc<dyn MembershipStore>,
    ) -> AuthHandle {
        let changes = identity_service.subscribe();
        let (state_tx, state_rx) = watch::channel(AuthSnapshot::initial());
        let (command_tx, command_rx) = mpsc::channel(8);

        let resolver = SessionResolver {
            identity_service: Arc::clone(&identity_service),
            profiles,
            memberships,
            changes,
            commands: command_rx,
            state: state_tx,
            bootstrapped: false,
        };
        tokio::spawn(resolver.run());

        AuthHandle {
            state: state_rx,
            identity_service,
            commands: command_tx,
        }
    }

    async fn run(mut self) {
        match self.identity_service.current_session().await {
            Ok(session) => {
                self.apply_change(AuthChange {
                    event: AuthEvent::InitialSession,
                    session,
                })
                .await;
            }
            Err(err) => {
                // Fail-safe: stay bootstrapping and keep access blocked
                // rather than reporting an unauthenticated state we have
                // not actually confirmed.
                error!(error = %err, "initial session query failed");
            }
        }

        loop {
            tokio::select! {
                change = self.changes.recv() => match change {
                    Ok(change) => self.apply_change(change).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "notification stream lagged, resyncing");
                        self.resync().await;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("identity service notification stream closed");
                        break;
                    }
                },
                command = self.commands.recv() => match command {
                    Some(Command::RefreshProfile) => self.refresh_profile().await,
                    // Every handle dropped, nobody left to observe state.
                    None => break,
                },
            }
        }
    }

    /// Single write path for every state transition.
    async fn apply_change(&mut self, change: AuthChange) {
        debug!(
            event = ?change.event,
            has_session = change.session.is_some(),
            "applying auth change"
        );
        match change.session {
            // The tag is authoritative for teardown: a SignedOut
            // notification clears state whatever it carries.
            Some(session) if change.event != AuthEvent::SignedOut => {
                self.establish(session).await;
            }
            _ => self.clear(),
        }
    }

    /// Dropped notifications would leave us continuing from a gap, so
    /// re-query the service and apply its answer as the latest state.
    async fn resync(&mut self) {
        match self.identity_service.current_session().await {
            Ok(session) => {
                self.apply_change(AuthChange {
                    event: AuthEvent::InitialSession,
                    session,
                })
                .await;
            }
            Err(err) => {
                error!(error = %err, "resync session query failed");
            }
        }
    }

    /// A session is (or still is) established: publish it immediately,
    /// then resolve the profile and company context behind it.
    async fn establish(&mut self, session: Session) {
        let identity = session.identity.clone();
        let previous = self.state.borrow().clone();
        let identity_changed = previous
            .identity
            .as_ref()
            .map(|current| current.id != identity.id)
            .unwrap_or(true);

        // Session and identity become visible right away. Derived rows
        // keyed to a different identity must not outlive it; rows for the
        // same identity stay visible until the re-fetch replaces them, so
        // a token refresh does not flicker `is_authenticated`.
        self.state.send_replace(AuthSnapshot {
            session: Some(session),
            identity: Some(identity.clone()),
            profile: if identity_changed {
                None
            } else {
                previous.profile
            },
            company: if identity_changed {
                None
            } else {
                previous.company
            },
            membership: if identity_changed {
                None
            } else {
                previous.membership
            },
            bootstrapping: !self.bootstrapped,
        });

        let (profile, membership) = self.resolve_account(&identity.id).await;
        self.bootstrapped = true;

        let (membership, company) = match membership {
            Some((membership, company)) => (Some(membership), Some(company)),
            None => (None, None),
        };
        let current = self.state.borrow().clone();
        self.state.send_replace(AuthSnapshot {
            session: current.session,
            identity: current.identity,
            profile,
            company,
            membership,
            bootstrapping: false,
        });
    }

    /// No session: clear everything in one replacement, never four
    /// separately observable writes.
    fn clear(&mut self) {
        self.bootstrapped = true;
        self.state.send_replace(AuthSnapshot {
            session: None,
            identity: None,
            profile: None,
            company: None,
            membership: None,
            bootstrapping: false,
        });
    }

    /// Re-run profile/company resolution for the current identity.
    async fn refresh_profile(&mut self) {
        let identity_id = match self.state.borrow().identity.as_ref() {
            Some(identity) => identity.id.clone(),
            None => {
                debug!("profile refresh requested without an identity, ignoring");
                return;
            }
        };

        let (profile, membership) = self.resolve_account(&identity_id).await;
        let (membership, company) = match membership {
            Some((membership, company)) => (Some(membership), Some(company)),
            None => (None, None),
        };
        let current = self.state.borrow().clone();
        self.state.send_replace(AuthSnapshot {
            session: current.session,
            identity: current.identity,
            profile,
            company,
            membership,
            bootstrapping: current.bootstrapping,
        });
    }

    /// Fetch the profile for an identity and, when its role grants
    /// company access, the membership joined with its company.
    ///
    /// Failures are absorbed: a missing or unfetchable row leaves the
    /// corresponding field `None` and is reported through logs only.
    async fn resolve_account(
        &self,
        identity_id: &str,
    ) -> (Option<Profile>, Option<(CompanyMembership, Company)>) {
        let profile = match self.profiles.profile_by_id(identity_id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                warn!(identity_id, "no profile row for identity");
                None
            }
            Err(err) => {
                error!(identity_id, error = %err, "profile fetch failed");
                None
            }
        };

        let membership = match profile.as_ref() {
            Some(profile) if profile.role.has_company_access() => {
                match self.memberships.membership_with_company(identity_id).await {
                    Ok(Some(row)) => Some(row),
                    Ok(None) => {
                        // Valid mid-onboarding state: a company-role user
                        // whose membership row does not exist yet.
                        debug!(identity_id, "company-access profile has no membership row");
                        None
                    }
                    Err(err) => {
                        warn!(identity_id, error = %err, "membership fetch failed");
                        None
                    }
                }
            }
            _ => None,
        };

        (profile, membership)
    }
}

/// Cloneable consumer-side handle to the resolver.
///
/// Pages and gates read snapshots and await changes; the three actions
/// talk to the identity service or the resolver task and never write
/// snapshot state themselves.
#[derive(Clone)]
pub struct AuthHandle {
    state: watch::Receiver<AuthSnapshot>,
    identity_service: Arc<dyn IdentityService>,
    commands: mpsc::Sender<Command>,
}

impl AuthHandle {
    /// Current snapshot.
    pub fn snapshot(&self) -> AuthSnapshot {
        self.state.borrow().clone()
    }

    /// Wait until the snapshot changes.
    pub async fn changed(&mut self) -> Result<(), AuthError> {
        self.state
            .changed()
            .await
            .map_err(|_| AuthError::ResolverClosed)
    }

    /// Dedicated watch receiver for reactive consumers.
    pub fn watch(&self) -> watch::Receiver<AuthSnapshot> {
        self.state.clone()
    }

    /// Attempt credential exchange with the identity service.
    ///
    /// On success the snapshot updates asynchronously through the
    /// notification path; the error value is the user-facing message.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthError> {
        self.identity_service
            .sign_in_with_password(email, password)
            .await
    }

    /// Request session termination.
    ///
    /// State clears only once the service confirms with a SignedOut
    /// notification, not optimistically, so an in-flight profile fetch
    /// cannot race the teardown.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.identity_service.sign_out().await
    }

    /// Re-run profile/company resolution for the current identity
    /// without changing the session. No-op when signed out.
    pub async fn refresh_profile(&self) -> Result<(), AuthError> {
        self.commands
            .send(Command::RefreshProfile)
            .await
            .map_err(|_| AuthError::ResolverClosed)
    }
}
