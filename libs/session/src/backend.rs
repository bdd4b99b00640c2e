//! Trait seams for the two backend collaborators
//!
//! The session core never talks HTTP itself; it drives these traits. The
//! production implementations live in the `backend` crate, the test suite
//! supplies in-memory fakes.

use async_trait::async_trait;
use tokio::sync::mpsc;
use uuid::Uuid;

use common::error::BackendResult;

use crate::model::{Identity, NewProfile, Profile, Session, SignUpDetails};

/// Ordered stream of session-change notifications
///
/// The subscription contract: the current session (or `None`) is delivered
/// immediately, then every subsequent change in arrival order. Dropping the
/// receiver cancels the subscription.
pub type SessionEvents = mpsc::UnboundedReceiver<Option<Session>>;

/// The backend authentication service
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Subscribe to session-change notifications
    fn subscribe(&self) -> SessionEvents;

    /// Verify an email/password pair and establish a session
    ///
    /// Callers observing session state should rely on the resulting
    /// notification rather than the returned value.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session>;

    /// Create an account with the given credentials and attached metadata
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: &SignUpDetails,
    ) -> BackendResult<Identity>;

    /// End the current session
    async fn sign_out(&self) -> BackendResult<()>;
}

/// The per-user profile store
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile row keyed by the given subject id
    async fn get_profile(&self, subject: Uuid) -> BackendResult<Option<Profile>>;

    /// Create a profile row for a freshly created account
    async fn create_profile(&self, profile: &NewProfile) -> BackendResult<()>;
}
