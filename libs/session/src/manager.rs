//! Session manager
//!
//! The manager subscribes to the backend's session-change notifications and
//! mirrors them into an [`AuthState`] watch channel. A single driver task
//! owns every state mutation; profile lookups run as independent tasks that
//! report back into the driver, tagged with the subject id they were issued
//! for, so a stale lookup can never overwrite a newer session's result.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use common::error::BackendResult;

use crate::backend::{AuthBackend, ProfileStore, SessionEvents};
use crate::model::{NewProfile, Session, SignUpDetails};
use crate::state::{AdminStatus, AuthState};

/// Messages handled by the driver task
enum DriverMsg {
    /// An admin lookup finished for the given subject
    ProfileResolved { subject: Uuid, is_admin: bool },
    /// Clear local state after a sign-out, whether or not the remote call
    /// succeeded
    ClearLocal,
}

/// Owns the session lifecycle for one application instance
///
/// Construct once at application root and share; dropping the manager stops
/// the driver task and cancels the subscription.
pub struct SessionManager {
    auth: Arc<dyn AuthBackend>,
    profiles: Arc<dyn ProfileStore>,
    state: watch::Receiver<AuthState>,
    inbox: mpsc::UnboundedSender<DriverMsg>,
    driver: JoinHandle<()>,
}

impl SessionManager {
    /// Subscribe to the auth backend and start the driver task
    ///
    /// The state starts as [`AuthState::Unresolved`] and resolves on the
    /// first notification, which the subscription contract delivers
    /// immediately.
    pub fn start(auth: Arc<dyn AuthBackend>, profiles: Arc<dyn ProfileStore>) -> Self {
        let (state_tx, state_rx) = watch::channel(AuthState::Unresolved);
        let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();

        let events = auth.subscribe();
        let driver = tokio::spawn(drive(
            events,
            inbox_rx,
            inbox_tx.clone(),
            state_tx,
            profiles.clone(),
        ));

        Self {
            auth,
            profiles,
            state: state_rx,
            inbox: inbox_tx,
            driver,
        }
    }

    /// Watch the authorization state
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Snapshot of the current authorization state
    pub fn current(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Wait until initial session resolution has completed
    pub async fn resolved(&self) -> AuthState {
        let mut state = self.state.clone();
        loop {
            let current = state.borrow_and_update().clone();
            if !current.is_loading() {
                return current;
            }
            if state.changed().await.is_err() {
                return state.borrow().clone();
            }
        }
    }

    /// Verify credentials against the backend
    ///
    /// On success local state is not touched here; the resulting session
    /// notification propagates it. On failure the error is returned
    /// unchanged and no state moves.
    pub async fn sign_in(&self, email: &str, password: &str) -> BackendResult<()> {
        self.auth.sign_in_with_password(email, password).await?;
        Ok(())
    }

    /// Create an account, then its profile row
    ///
    /// The two steps are not transactional: if the profile write fails the
    /// account still exists and the error is surfaced to the caller.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        phone: &str,
    ) -> BackendResult<()> {
        let details = SignUpDetails {
            full_name: full_name.to_string(),
            phone: phone.to_string(),
        };
        let identity = self.auth.sign_up(email, password, &details).await?;

        let (first_name, last_name) = split_full_name(full_name);
        let profile = NewProfile {
            id: identity.id,
            email: Some(identity.email),
            first_name: Some(first_name),
            last_name,
            phone: Some(phone.to_string()),
            is_admin: false,
        };
        self.profiles.create_profile(&profile).await
    }

    /// End the session
    ///
    /// Local state is cleared even when the remote call fails, so the UI
    /// cannot stay stuck in an authenticated view; the transport error is
    /// logged, not surfaced.
    pub async fn sign_out(&self) {
        if let Err(err) = self.auth.sign_out().await {
            warn!("sign-out request failed: {err}");
        }
        let _ = self.inbox.send(DriverMsg::ClearLocal);
    }

    /// Stop the driver task and cancel the subscription
    pub fn shutdown(&self) {
        self.driver.abort();
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive(
    mut events: SessionEvents,
    mut inbox: mpsc::UnboundedReceiver<DriverMsg>,
    inbox_tx: mpsc::UnboundedSender<DriverMsg>,
    state: watch::Sender<AuthState>,
    profiles: Arc<dyn ProfileStore>,
) {
    loop {
        tokio::select! {
            change = events.recv() => match change {
                Some(next) => apply_session_change(next, &state, &profiles, &inbox_tx),
                // Backend dropped; no further notifications can arrive.
                None => break,
            },
            msg = inbox.recv() => match msg {
                Some(DriverMsg::ProfileResolved { subject, is_admin }) => {
                    apply_admin_lookup(subject, is_admin, &state);
                }
                Some(DriverMsg::ClearLocal) => {
                    state.send_replace(AuthState::Anonymous);
                }
                None => break,
            },
        }
    }
}

/// Apply one session-change notification and, for a live session, kick off
/// the admin lookup for its subject
fn apply_session_change(
    next: Option<Session>,
    state: &watch::Sender<AuthState>,
    profiles: &Arc<dyn ProfileStore>,
    inbox: &mpsc::UnboundedSender<DriverMsg>,
) {
    match next {
        None => {
            debug!("session cleared");
            state.send_replace(AuthState::Anonymous);
        }
        Some(session) => {
            let identity = session.identity.clone();
            let subject = identity.id;
            debug!("session changed, subject {subject}");

            // A refresh for the same subject keeps the already-resolved
            // admin flag; a different subject starts over as unknown.
            let admin = {
                match &*state.borrow() {
                    AuthState::Authenticated {
                        identity: current,
                        admin,
                    } if current.id == subject => admin.clone(),
                    _ => AdminStatus::Unknown,
                }
            };
            state.send_replace(AuthState::Authenticated { identity, admin });

            let profiles = profiles.clone();
            let inbox = inbox.clone();
            tokio::spawn(async move {
                let is_admin = match profiles.get_profile(subject).await {
                    Ok(Some(profile)) => profile.is_admin.unwrap_or(false),
                    Ok(None) => {
                        debug!("no profile row for subject {subject}");
                        false
                    }
                    Err(err) => {
                        warn!("admin lookup failed for subject {subject}: {err}");
                        false
                    }
                };
                let _ = inbox.send(DriverMsg::ProfileResolved { subject, is_admin });
            });
        }
    }
}

/// Apply a finished admin lookup, discarding it when the session has since
/// moved to a different subject (or away entirely)
fn apply_admin_lookup(subject: Uuid, is_admin: bool, state: &watch::Sender<AuthState>) {
    let matches_current = {
        matches!(
            &*state.borrow(),
            AuthState::Authenticated { identity, .. } if identity.id == subject
        )
    };

    if !matches_current {
        debug!("discarding stale admin lookup for subject {subject}");
        return;
    }

    state.send_modify(|current| {
        if let AuthState::Authenticated { admin, .. } = current {
            *admin = AdminStatus::Known(is_admin);
        }
    });
}

/// Split a display name into the profile row's first/last name columns
fn split_full_name(full_name: &str) -> (String, Option<String>) {
    let trimmed = full_name.trim();
    match trimmed.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), Some(rest.trim().to_string())),
        None => (trimmed.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::split_full_name;

    #[test]
    fn splits_first_and_last_name() {
        assert_eq!(
            split_full_name("Priya Sharma"),
            ("Priya".to_string(), Some("Sharma".to_string()))
        );
        assert_eq!(
            split_full_name("Jean Claude van Damme"),
            ("Jean".to_string(), Some("Claude van Damme".to_string()))
        );
    }

    #[test]
    fn single_word_has_no_last_name() {
        assert_eq!(split_full_name("  Ronaldo "), ("Ronaldo".to_string(), None));
    }
}
