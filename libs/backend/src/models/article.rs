//! News article model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Article entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: String,
    pub image: String,
    pub url: String,
    pub created_at: Option<DateTime<Utc>>,
}
