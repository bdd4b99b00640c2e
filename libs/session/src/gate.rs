//! Rendering gates
//!
//! A gate decides whether a guarded view may render for the current
//! [`AuthState`]. While initial resolution is in flight the outcome is
//! `Loading`, never a redirect, so the user is not bounced off a page they
//! are actually allowed to see.

use crate::state::{AdminStatus, AuthState};

/// Where the public home view lives
pub const PUBLIC_HOME: &str = "/";

/// What a gate requires of the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePolicy {
    /// Any authenticated identity
    Authenticated,
    /// An authenticated identity whose profile carries the admin flag
    Administrator,
}

/// Outcome of evaluating a gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    /// Resolution in flight; render a neutral loading indicator
    Loading,
    /// Render the guarded children
    Grant,
    /// Send the user to the given location
    Redirect(String),
}

/// A UI-rendering guard for a guarded route
#[derive(Debug, Clone)]
pub struct Gate {
    policy: GatePolicy,
    redirect_to: String,
}

impl Gate {
    /// Gate requiring any authenticated user
    pub fn authenticated() -> Self {
        Self {
            policy: GatePolicy::Authenticated,
            redirect_to: PUBLIC_HOME.to_string(),
        }
    }

    /// Gate requiring an administrator
    pub fn administrator() -> Self {
        Self {
            policy: GatePolicy::Administrator,
            redirect_to: PUBLIC_HOME.to_string(),
        }
    }

    /// Override the redirect target
    pub fn with_redirect(mut self, to: impl Into<String>) -> Self {
        self.redirect_to = to.into();
        self
    }

    /// Evaluate the gate against the current state
    pub fn check(&self, state: &AuthState) -> Access {
        match state {
            AuthState::Unresolved => Access::Loading,
            AuthState::Anonymous => Access::Redirect(self.redirect_to.clone()),
            AuthState::Authenticated { admin, .. } => match self.policy {
                GatePolicy::Authenticated => Access::Grant,
                GatePolicy::Administrator => match admin {
                    // The flag is still resolving; showing the loading
                    // indicator avoids a redirect flash for actual admins.
                    AdminStatus::Unknown => Access::Loading,
                    AdminStatus::Known(true) => Access::Grant,
                    AdminStatus::Known(false) => Access::Redirect(self.redirect_to.clone()),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identity;
    use uuid::Uuid;

    fn authenticated(admin: AdminStatus) -> AuthState {
        AuthState::Authenticated {
            identity: Identity {
                id: Uuid::new_v4(),
                email: "a@x.com".to_string(),
            },
            admin,
        }
    }

    #[test]
    fn both_gates_load_while_unresolved() {
        assert_eq!(
            Gate::authenticated().check(&AuthState::Unresolved),
            Access::Loading
        );
        assert_eq!(
            Gate::administrator().check(&AuthState::Unresolved),
            Access::Loading
        );
    }

    #[test]
    fn anonymous_redirects_to_public_home() {
        assert_eq!(
            Gate::authenticated().check(&AuthState::Anonymous),
            Access::Redirect(PUBLIC_HOME.to_string())
        );
        assert_eq!(
            Gate::administrator().check(&AuthState::Anonymous),
            Access::Redirect(PUBLIC_HOME.to_string())
        );
    }

    #[test]
    fn authenticated_gate_grants_any_identity() {
        assert_eq!(
            Gate::authenticated().check(&authenticated(AdminStatus::Unknown)),
            Access::Grant
        );
        assert_eq!(
            Gate::authenticated().check(&authenticated(AdminStatus::Known(false))),
            Access::Grant
        );
    }

    #[test]
    fn admin_gate_waits_for_flag_resolution() {
        assert_eq!(
            Gate::administrator().check(&authenticated(AdminStatus::Unknown)),
            Access::Loading
        );
    }

    #[test]
    fn admin_gate_decides_on_resolved_flag() {
        assert_eq!(
            Gate::administrator().check(&authenticated(AdminStatus::Known(true))),
            Access::Grant
        );
        assert_eq!(
            Gate::administrator().check(&authenticated(AdminStatus::Known(false))),
            Access::Redirect(PUBLIC_HOME.to_string())
        );
    }

    #[test]
    fn custom_redirect_target() {
        let gate = Gate::authenticated().with_redirect("/login");
        assert_eq!(
            gate.check(&AuthState::Anonymous),
            Access::Redirect("/login".to_string())
        );
    }
}
