//! Session, identity, and profile models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof of an authenticated principal, issued by the backend auth service
///
/// The tokens are opaque to this layer; only the identity and the expiry are
/// inspected locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub identity: Identity,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// The authenticated principal's public identity, derived 1:1 from a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
}

/// Per-user metadata record from the `profiles` table
///
/// The row is keyed by the auth subject id. Every column other than the key
/// is nullable in the backend schema, so all fields are optional here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_admin: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

/// New profile creation payload, written right after account creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub is_admin: bool,
}

/// Display name and contact details attached to account creation as metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpDetails {
    pub full_name: String,
    pub phone: String,
}
