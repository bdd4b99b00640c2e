//! Authorization state published to the rest of the application
//!
//! The state is a tagged union rather than independent booleans so that
//! "still resolving" and "known to be false" can never be confused, and so
//! an identity cannot exist without the session that produced it.

use crate::model::Identity;

/// The derived administrator flag
///
/// `Unknown` means the profile lookup for the current session has not
/// resolved yet; it is distinct from `Known(false)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminStatus {
    Unknown,
    Known(bool),
}

impl AdminStatus {
    /// True only once the profile lookup has resolved to an admin profile
    pub fn is_admin(&self) -> bool {
        matches!(self, AdminStatus::Known(true))
    }

    /// True once the profile lookup has resolved either way
    pub fn is_resolved(&self) -> bool {
        matches!(self, AdminStatus::Known(_))
    }
}

/// Authentication state as seen by the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    /// No session notification has arrived yet; dependent views must not
    /// render either the authenticated or the anonymous variant
    Unresolved,
    /// The backend reported no active session
    Anonymous,
    /// A session is active; the admin flag resolves asynchronously
    Authenticated {
        identity: Identity,
        admin: AdminStatus,
    },
}

impl AuthState {
    /// Whether initial session resolution is still in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, AuthState::Unresolved)
    }

    /// The authenticated identity, if any
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthState::Authenticated { identity, .. } => Some(identity),
            _ => None,
        }
    }

    /// UI convenience only; server-side enforcement lives in the backend's
    /// row-level policies
    pub fn is_admin(&self) -> bool {
        match self {
            AuthState::Authenticated { admin, .. } => admin.is_admin(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn unresolved_is_loading() {
        assert!(AuthState::Unresolved.is_loading());
        assert!(!AuthState::Anonymous.is_loading());
    }

    #[test]
    fn identity_only_when_authenticated() {
        assert!(AuthState::Unresolved.identity().is_none());
        assert!(AuthState::Anonymous.identity().is_none());

        let id = identity();
        let state = AuthState::Authenticated {
            identity: id.clone(),
            admin: AdminStatus::Unknown,
        };
        assert_eq!(state.identity(), Some(&id));
    }

    #[test]
    fn admin_requires_resolved_true() {
        let state = AuthState::Authenticated {
            identity: identity(),
            admin: AdminStatus::Unknown,
        };
        assert!(!state.is_admin());

        let state = AuthState::Authenticated {
            identity: identity(),
            admin: AdminStatus::Known(false),
        };
        assert!(!state.is_admin());

        let state = AuthState::Authenticated {
            identity: identity(),
            admin: AdminStatus::Known(true),
        };
        assert!(state.is_admin());
    }

    #[test]
    fn anonymous_is_never_admin() {
        assert!(!AuthState::Anonymous.is_admin());
        assert!(!AuthState::Unresolved.is_admin());
    }
}
