//! Test utilities: in-memory stand-ins for the identity service and the
//! profile/membership stores, plus snapshot fixtures and wait helpers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use heliconnect_auth::{
    AuthChange, AuthError, AuthEvent, AuthHandle, AuthSnapshot, Company, CompanyMembership,
    CompanyRole, Identity, IdentityService, MembershipStore, Profile, ProfileStore, Session,
    SessionResolver, StoreError,
};
use heliconnect_core::Role;

/// Scripted identity service with a credential table and a notification
/// emitter tests drive directly.
pub struct StubIdentityService {
    session: Mutex<Option<Session>>,
    accounts: Mutex<HashMap<(String, String), Session>>,
    notifications: broadcast::Sender<AuthChange>,
}

impl StubIdentityService {
    pub fn new() -> Arc<Self> {
        Self::with_session(None)
    }

    pub fn with_session(session: Option<Session>) -> Arc<Self> {
        let (notifications, _) = broadcast::channel(64);
        Arc::new(Self {
            session: Mutex::new(session),
            accounts: Mutex::new(HashMap::new()),
            notifications,
        })
    }

    /// Register credentials that exchange for the given session.
    pub fn register_account(&self, email: &str, password: &str, session: Session) {
        self.accounts
            .lock()
            .unwrap()
            .insert((email.to_string(), password.to_string()), session);
    }

    /// Emit a notification and update the stored session to match.
    pub fn emit(&self, event: AuthEvent, session: Option<Session>) {
        *self.session.lock().unwrap() = session.clone();
        let _ = self.notifications.send(AuthChange { event, session });
    }

    /// Emit a notification without touching the stored session. Lets
    /// ordering tests deliver an event the current-session query does
    /// not yet know about.
    pub fn notify_only(&self, event: AuthEvent, session: Option<Session>) {
        let _ = self.notifications.send(AuthChange { event, session });
    }
}

#[async_trait]
impl IdentityService for StubIdentityService {
    async fn current_session(&self) -> Result<Option<Session>, AuthError> {
        Ok(self.session.lock().unwrap().clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.notifications.subscribe()
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let session = self
            .accounts
            .lock()
            .unwrap()
            .get(&(email.to_string(), password.to_string()))
            .cloned();
        match session {
            Some(session) => {
                self.emit(AuthEvent::SignedIn, Some(session));
                Ok(())
            }
            None => Err(AuthError::Credential(
                "Invalid login credentials".to_string(),
            )),
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(AuthEvent::SignedOut, None);
        Ok(())
    }
}

/// Profile store with programmable per-identity latency and a failure
/// switch.
pub struct StubProfileStore {
    rows: Mutex<HashMap<String, Profile>>,
    latency: Mutex<HashMap<String, Duration>>,
    failing: Mutex<bool>,
    calls: AtomicUsize,
}

impl StubProfileStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(HashMap::new()),
            latency: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn insert(&self, profile: Profile) {
        self.rows.lock().unwrap().insert(profile.id.clone(), profile);
    }

    /// Delay fetches for one identity, to keep a chain in flight while
    /// the test emits further notifications.
    pub fn set_latency(&self, identity_id: &str, latency: Duration) {
        self.latency
            .lock()
            .unwrap()
            .insert(identity_id.to_string(), latency);
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for StubProfileStore {
    async fn profile_by_id(&self, identity_id: &str) -> Result<Option<Profile>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let latency = self.latency.lock().unwrap().get(identity_id).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Unreachable("profile store down".to_string()));
        }
        Ok(self.rows.lock().unwrap().get(identity_id).cloned())
    }
}

/// Membership store with a failure switch and a call counter, so tests
/// can assert the fetch is skipped for non-company roles.
pub struct StubMembershipStore {
    rows: Mutex<HashMap<String, (CompanyMembership, Company)>>,
    failing: Mutex<bool>,
    calls: AtomicUsize,
}

impl StubMembershipStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(HashMap::new()),
            failing: Mutex::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn insert(&self, membership: CompanyMembership, company: Company) {
        self.rows
            .lock()
            .unwrap()
            .insert(membership.user_id.clone(), (membership, company));
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap() = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MembershipStore for StubMembershipStore {
    async fn membership_with_company(
        &self,
        identity_id: &str,
    ) -> Result<Option<(CompanyMembership, Company)>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if *self.failing.lock().unwrap() {
            return Err(StoreError::Unreachable(
                "membership store down".to_string(),
            ));
        }
        Ok(self.rows.lock().unwrap().get(identity_id).cloned())
    }
}

/// The three stubs plus a spawned resolver handle.
pub struct TestPortal {
    pub identity: Arc<StubIdentityService>,
    pub profiles: Arc<StubProfileStore>,
    pub memberships: Arc<StubMembershipStore>,
    pub handle: AuthHandle,
}

impl TestPortal {
    /// Start a portal with no current session.
    pub fn start_empty() -> Self {
        Self::start(StubIdentityService::new())
    }

    /// Start a portal around a prepared identity service.
    pub fn start(identity: Arc<StubIdentityService>) -> Self {
        let profiles = StubProfileStore::new();
        let memberships = StubMembershipStore::new();
        let handle = SessionResolver::spawn(
            identity.clone(),
            profiles.clone(),
            memberships.clone(),
        );
        Self {
            identity,
            profiles,
            memberships,
            handle,
        }
    }
}

/// Session fixture for an identity id.
pub fn session_for(identity_id: &str) -> Session {
    Session {
        access_token: format!("access-{identity_id}"),
        refresh_token: Some(format!("refresh-{identity_id}")),
        expires_at: Some(1_760_000_000),
        identity: Identity {
            id: identity_id.to_string(),
            email: Some(format!("{identity_id}@heliconnect.fr")),
            metadata: HashMap::new(),
        },
    }
}

/// Profile fixture with the given role.
pub fn profile_with_role(identity_id: &str, role: Role) -> Profile {
    Profile {
        id: identity_id.to_string(),
        email: format!("{identity_id}@heliconnect.fr"),
        first_name: Some("Camille".to_string()),
        last_name: Some("Robert".to_string()),
        phone: None,
        avatar_url: None,
        role,
        company_name: None,
        company_type: None,
        siret: None,
        vat_number: None,
        billing_address: None,
        preferred_language: "fr".to_string(),
        email_notifications: true,
        push_notifications: false,
        created_at: "2025-11-02T08:00:00Z".to_string(),
        updated_at: "2026-01-15T09:30:00Z".to_string(),
        last_login_at: None,
        is_active: true,
        is_verified: true,
    }
}

/// Company fixture.
pub fn company(company_id: &str) -> Company {
    Company {
        id: company_id.to_string(),
        owner_id: None,
        name: "Azur Hélico".to_string(),
        legal_name: Some("Azur Hélico SAS".to_string()),
        description: None,
        logo_url: None,
        website: None,
        email: "contact@azur-helico.fr".to_string(),
        phone: None,
        address: None,
        siret: Some("51234567800012".to_string()),
        vat_number: None,
        operating_license: None,
        insurance_number: None,
        insurance_expiry: None,
        commission_rate: 12.5,
        is_active: true,
        is_verified: true,
        contract_signed_at: None,
        contract_url: None,
        bank_details: None,
        created_at: "2025-10-01T00:00:00Z".to_string(),
        updated_at: "2026-01-15T09:30:00Z".to_string(),
    }
}

/// Membership fixture linking a user to a company.
pub fn membership(membership_id: &str, user_id: &str, company_id: &str) -> CompanyMembership {
    CompanyMembership {
        id: membership_id.to_string(),
        company_id: company_id.to_string(),
        user_id: user_id.to_string(),
        role: CompanyRole::Admin,
        permissions: HashMap::new(),
        created_at: "2025-11-02T08:00:00Z".to_string(),
    }
}

/// Await the first snapshot satisfying the condition, bounded by a
/// two-second timeout.
pub async fn wait_for<F>(handle: &AuthHandle, condition: F) -> AuthSnapshot
where
    F: Fn(&AuthSnapshot) -> bool,
{
    let mut state = handle.watch();
    timeout(Duration::from_secs(2), async move {
        loop {
            let snapshot = state.borrow_and_update().clone();
            if condition(&snapshot) {
                return snapshot;
            }
            state.changed().await.expect("resolver task stopped");
        }
    })
    .await
    .expect("condition not reached within timeout")
}

/// Observes every published snapshot and records violations of an
/// invariant. Abort with [`SnapshotProbe::finish`] to collect them.
pub struct SnapshotProbe {
    violations: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl SnapshotProbe {
    pub fn spawn<F>(handle: &AuthHandle, check: F) -> Self
    where
        F: Fn(&AuthSnapshot) -> Option<String> + Send + 'static,
    {
        let violations = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&violations);
        let mut state = handle.watch();
        let task = tokio::spawn(async move {
            loop {
                {
                    let snapshot = state.borrow_and_update().clone();
                    if let Some(violation) = check(&snapshot) {
                        recorded.lock().unwrap().push(violation);
                    }
                }
                if state.changed().await.is_err() {
                    break;
                }
            }
        });
        Self { violations, task }
    }

    /// Stop observing and return every recorded violation.
    pub fn finish(self) -> Vec<String> {
        self.task.abort();
        let violations = self.violations.lock().unwrap().clone();
        violations
    }
}
