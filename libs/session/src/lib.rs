//! Session and authorization core for the SportsSpot client
//!
//! This crate owns the authentication session lifecycle: it mirrors the
//! backend's session-change notifications into an [`AuthState`] published
//! over a watch channel, resolves the administrator flag from the profile
//! store, and exposes the gates the rest of the application uses to decide
//! whether a view may render.
//!
//! The managed backend itself is reached through the [`AuthBackend`] and
//! [`ProfileStore`] traits; this crate contains no HTTP code.

pub mod backend;
pub mod gate;
pub mod manager;
pub mod model;
pub mod state;

pub use backend::{AuthBackend, ProfileStore, SessionEvents};
pub use gate::{Access, Gate, GatePolicy};
pub use manager::SessionManager;
pub use model::{Identity, NewProfile, Profile, Session, SignUpDetails};
pub use state::{AdminStatus, AuthState};
