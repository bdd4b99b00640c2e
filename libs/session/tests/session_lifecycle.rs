//! Lifecycle tests for the session manager and gates
//!
//! These tests drive the manager through in-memory fakes of the backend
//! auth service and the profile store, covering session resolution, admin
//! lookup (including stale-lookup discard), and the sign-in/up/out paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::sync::{Notify, watch};
use uuid::Uuid;

use common::error::{BackendError, BackendResult};
use session::{
    Access, AdminStatus, AuthBackend, AuthState, Gate, Identity, NewProfile, Profile, ProfileStore,
    Session, SessionEvents, SessionManager, SignUpDetails,
};

fn subject(n: u8) -> Uuid {
    Uuid::from_u128(n as u128)
}

fn make_session(id: Uuid, email: &str) -> Session {
    Session {
        identity: Identity {
            id,
            email: email.to_string(),
        },
        access_token: format!("access-{id}"),
        refresh_token: format!("refresh-{id}"),
        expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
    }
}

fn make_profile(id: Uuid, is_admin: bool) -> Profile {
    Profile {
        id,
        email: None,
        first_name: Some("Test".to_string()),
        last_name: None,
        phone: None,
        is_admin: Some(is_admin),
        created_at: None,
    }
}

struct FakeAuth {
    events: Mutex<Option<SessionEvents>>,
    notify: UnboundedSender<Option<Session>>,
    deny_sign_in: AtomicBool,
    deny_sign_up: AtomicBool,
    fail_sign_out: AtomicBool,
}

impl FakeAuth {
    fn new() -> (Arc<Self>, UnboundedSender<Option<Session>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let auth = Arc::new(Self {
            events: Mutex::new(Some(rx)),
            notify: tx.clone(),
            deny_sign_in: AtomicBool::new(false),
            deny_sign_up: AtomicBool::new(false),
            fail_sign_out: AtomicBool::new(false),
        });
        (auth, tx)
    }
}

#[async_trait]
impl AuthBackend for FakeAuth {
    fn subscribe(&self) -> SessionEvents {
        self.events
            .lock()
            .unwrap()
            .take()
            .expect("only one subscriber expected")
    }

    async fn sign_in_with_password(&self, email: &str, _password: &str) -> BackendResult<Session> {
        if self.deny_sign_in.load(Ordering::SeqCst) {
            return Err(BackendError::InvalidCredentials);
        }
        let session = make_session(subject(9), email);
        let _ = self.notify.send(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _details: &SignUpDetails,
    ) -> BackendResult<Identity> {
        if self.deny_sign_up.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 422,
                message: "email already registered".to_string(),
            });
        }
        Ok(Identity {
            id: subject(7),
            email: email.to_string(),
        })
    }

    async fn sign_out(&self) -> BackendResult<()> {
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 503,
                message: "backend unavailable".to_string(),
            });
        }
        let _ = self.notify.send(None);
        Ok(())
    }
}

struct FakeProfiles {
    rows: Mutex<HashMap<Uuid, Profile>>,
    holds: Mutex<HashMap<Uuid, Arc<Notify>>>,
    fail_get: AtomicBool,
    fail_create: AtomicBool,
    created: Mutex<Vec<NewProfile>>,
}

impl FakeProfiles {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(HashMap::new()),
            holds: Mutex::new(HashMap::new()),
            fail_get: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            created: Mutex::new(Vec::new()),
        })
    }

    fn insert(&self, profile: Profile) {
        self.rows.lock().unwrap().insert(profile.id, profile);
    }

    /// Make lookups for the given subject block until the returned handle
    /// is notified
    fn hold(&self, subject: Uuid) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.holds.lock().unwrap().insert(subject, gate.clone());
        gate
    }
}

#[async_trait]
impl ProfileStore for FakeProfiles {
    async fn get_profile(&self, subject: Uuid) -> BackendResult<Option<Profile>> {
        let gate = self.holds.lock().unwrap().get(&subject).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "profile store down".to_string(),
            });
        }
        Ok(self.rows.lock().unwrap().get(&subject).cloned())
    }

    async fn create_profile(&self, profile: &NewProfile) -> BackendResult<()> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(BackendError::Api {
                status: 500,
                message: "profile store down".to_string(),
            });
        }
        self.created.lock().unwrap().push(profile.clone());
        Ok(())
    }
}

async fn wait_for<F>(state: &mut watch::Receiver<AuthState>, pred: F) -> AuthState
where
    F: Fn(&AuthState) -> bool,
{
    tokio::time::timeout(Duration::from_secs(1), async {
        loop {
            let current = state.borrow_and_update().clone();
            if pred(&current) {
                return current;
            }
            state.changed().await.expect("state channel closed");
        }
    })
    .await
    .expect("timed out waiting for state")
}

fn admin_of(state: &AuthState) -> Option<&AdminStatus> {
    match state {
        AuthState::Authenticated { admin, .. } => Some(admin),
        _ => None,
    }
}

#[tokio::test]
async fn initial_state_is_unresolved_and_gates_load() {
    let (auth, _tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);

    tokio::task::yield_now().await;

    let state = manager.current();
    assert!(state.is_loading());
    assert_eq!(Gate::authenticated().check(&state), Access::Loading);
    assert_eq!(Gate::administrator().check(&state), Access::Loading);
}

#[tokio::test]
async fn null_notification_resolves_to_anonymous() {
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(None).unwrap();
    let resolved = wait_for(&mut state, |s| !s.is_loading()).await;

    assert_eq!(resolved, AuthState::Anonymous);
    assert!(resolved.identity().is_none());
    assert!(!resolved.is_admin());
    assert!(matches!(
        Gate::authenticated().check(&resolved),
        Access::Redirect(_)
    ));
}

#[tokio::test]
async fn admin_gate_grants_only_after_profile_resolves() {
    let u1 = subject(1);
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    profiles.insert(make_profile(u1, true));
    let release = profiles.hold(u1);

    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(Some(make_session(u1, "a@x.com"))).unwrap();
    let pending = wait_for(&mut state, |s| s.identity().is_some()).await;

    // The lookup is still held back, so the flag must be unresolved and the
    // admin gate must not yet render.
    assert_eq!(admin_of(&pending), Some(&AdminStatus::Unknown));
    assert_eq!(Gate::administrator().check(&pending), Access::Loading);
    assert_eq!(Gate::authenticated().check(&pending), Access::Grant);

    release.notify_one();
    let resolved = wait_for(&mut state, |s| {
        admin_of(s).is_some_and(AdminStatus::is_resolved)
    })
    .await;

    assert!(resolved.is_admin());
    assert_eq!(Gate::administrator().check(&resolved), Access::Grant);
}

#[tokio::test]
async fn missing_profile_settles_admin_to_false() {
    let u1 = subject(1);
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(Some(make_session(u1, "a@x.com"))).unwrap();
    let resolved = wait_for(&mut state, |s| {
        admin_of(s).is_some_and(AdminStatus::is_resolved)
    })
    .await;

    assert!(!resolved.is_admin());
    assert!(matches!(
        Gate::administrator().check(&resolved),
        Access::Redirect(_)
    ));
    assert_eq!(Gate::authenticated().check(&resolved), Access::Grant);
}

#[tokio::test]
async fn errored_profile_lookup_settles_admin_to_false() {
    let u1 = subject(1);
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    profiles.insert(make_profile(u1, true));
    profiles.fail_get.store(true, Ordering::SeqCst);

    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(Some(make_session(u1, "a@x.com"))).unwrap();
    let resolved = wait_for(&mut state, |s| {
        admin_of(s).is_some_and(AdminStatus::is_resolved)
    })
    .await;

    assert!(!resolved.is_admin());
    assert!(resolved.identity().is_some());
}

#[tokio::test]
async fn stale_profile_lookup_is_discarded() {
    let u1 = subject(1);
    let u2 = subject(2);
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    profiles.insert(make_profile(u1, true));
    profiles.insert(make_profile(u2, false));
    let release_u1 = profiles.hold(u1);

    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    // u1 signs in but their lookup stalls; u2 takes over before it lands.
    tx.send(Some(make_session(u1, "one@x.com"))).unwrap();
    tx.send(Some(make_session(u2, "two@x.com"))).unwrap();

    let resolved = wait_for(&mut state, |s| {
        s.identity().map(|i| i.id) == Some(u2) && admin_of(s).is_some_and(AdminStatus::is_resolved)
    })
    .await;
    assert_eq!(admin_of(&resolved), Some(&AdminStatus::Known(false)));

    // Now let u1's admin=true lookup land; it must not clobber u2's flag.
    release_u1.notify_one();
    tokio::time::sleep(Duration::from_millis(50)).await;

    let current = manager.current();
    assert_eq!(current.identity().map(|i| i.id), Some(u2));
    assert_eq!(admin_of(&current), Some(&AdminStatus::Known(false)));
}

#[tokio::test]
async fn sign_out_when_anonymous_is_idempotent() {
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(None).unwrap();
    wait_for(&mut state, |s| !s.is_loading()).await;

    manager.sign_out().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    let current = manager.current();
    assert_eq!(current, AuthState::Anonymous);
    assert!(current.identity().is_none());
    assert!(!current.is_admin());
}

#[tokio::test]
async fn sign_out_clears_local_state_despite_remote_failure() {
    let u1 = subject(1);
    let (auth, tx) = FakeAuth::new();
    auth.fail_sign_out.store(true, Ordering::SeqCst);
    let profiles = FakeProfiles::new();
    profiles.insert(make_profile(u1, true));

    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(Some(make_session(u1, "a@x.com"))).unwrap();
    wait_for(&mut state, |s| s.identity().is_some()).await;

    // The remote call fails and emits no notification; local state must
    // still clear.
    manager.sign_out().await;
    let cleared = wait_for(&mut state, |s| s.identity().is_none()).await;
    assert_eq!(cleared, AuthState::Anonymous);
}

#[tokio::test]
async fn failed_sign_in_leaves_state_untouched() {
    let (auth, tx) = FakeAuth::new();
    auth.deny_sign_in.store(true, Ordering::SeqCst);
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(None).unwrap();
    wait_for(&mut state, |s| !s.is_loading()).await;

    let result = manager.sign_in("a@x.com", "wrong").await;
    assert!(matches!(result, Err(BackendError::InvalidCredentials)));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(manager.current(), AuthState::Anonymous);
}

#[tokio::test]
async fn admin_session_then_sign_out_scenario() {
    let u1 = subject(1);
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    profiles.insert(make_profile(u1, true));

    let manager = SessionManager::start(auth, profiles);
    let mut state = manager.subscribe();

    tx.send(Some(make_session(u1, "a@x.com"))).unwrap();
    let resolved = wait_for(&mut state, |s| {
        admin_of(s).is_some_and(AdminStatus::is_resolved)
    })
    .await;
    assert_eq!(Gate::administrator().check(&resolved), Access::Grant);

    tx.send(None).unwrap();
    let cleared = wait_for(&mut state, |s| s.identity().is_none()).await;
    assert!(!cleared.is_admin());
    assert!(matches!(
        Gate::administrator().check(&cleared),
        Access::Redirect(_)
    ));
}

#[tokio::test]
async fn sign_up_creates_profile_row_without_admin_flag() {
    let (auth, _tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles.clone());

    manager
        .sign_up("new@x.com", "Abcdef12", "Priya Sharma", "+91 98765 43210")
        .await
        .expect("sign-up should succeed");

    let created = profiles.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let row = &created[0];
    assert_eq!(row.id, subject(7));
    assert_eq!(row.email.as_deref(), Some("new@x.com"));
    assert_eq!(row.first_name.as_deref(), Some("Priya"));
    assert_eq!(row.last_name.as_deref(), Some("Sharma"));
    assert!(!row.is_admin);
}

#[tokio::test]
async fn failed_account_creation_writes_no_profile() {
    let (auth, _tx) = FakeAuth::new();
    auth.deny_sign_up.store(true, Ordering::SeqCst);
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles.clone());

    let result = manager
        .sign_up("dup@x.com", "Abcdef12", "Dup User", "9876543210")
        .await;

    assert!(result.is_err());
    assert!(profiles.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn failed_profile_write_surfaces_after_account_creation() {
    let (auth, _tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    profiles.fail_create.store(true, Ordering::SeqCst);
    let manager = SessionManager::start(auth, profiles.clone());

    // Account creation succeeded; the orphaned account is the documented,
    // accepted inconsistency.
    let result = manager
        .sign_up("new@x.com", "Abcdef12", "Priya Sharma", "9876543210")
        .await;
    assert!(matches!(result, Err(BackendError::Api { status: 500, .. })));
}

#[tokio::test]
async fn shutdown_stops_the_driver_but_keeps_the_snapshot() {
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);

    tx.send(None).unwrap();
    manager.resolved().await;

    manager.shutdown();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert!(tx.send(None).is_err());
    assert_eq!(manager.current(), AuthState::Anonymous);
}

#[tokio::test]
async fn dropping_the_manager_cancels_the_subscription() {
    let (auth, tx) = FakeAuth::new();
    let profiles = FakeProfiles::new();
    let manager = SessionManager::start(auth, profiles);

    tx.send(None).unwrap();
    manager.resolved().await;

    drop(manager);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The driver task is gone, so the events channel has no receiver left.
    assert!(tx.send(None).is_err());
}
