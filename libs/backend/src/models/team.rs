//! Team model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lenient_json_array;

/// Team entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_by: Uuid,
    #[serde(default, deserialize_with = "lenient_json_array")]
    pub members: Vec<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// New team creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub sport: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_by: Uuid,
    pub members: Vec<String>,
}
