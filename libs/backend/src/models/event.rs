//! Community event model
//!
//! Dates and participant counts are display strings in the backend schema;
//! they are passed through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub location: String,
    pub participants: String,
    pub image: String,
    pub created_at: Option<DateTime<Utc>>,
}
