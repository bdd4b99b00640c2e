//! Venue model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::lenient_json_array;

/// A facility offered at a venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub available: bool,
}

/// Venue listing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VenueStatus {
    Active,
    Inactive,
}

impl fmt::Display for VenueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VenueStatus::Active => write!(f, "active"),
            VenueStatus::Inactive => write!(f, "inactive"),
        }
    }
}

/// Venue entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub id: Uuid,
    pub name: String,
    pub sport: String,
    pub address: String,
    pub price: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_json_array")]
    pub facilities: Vec<Facility>,
    #[serde(default, deserialize_with = "lenient_json_array")]
    pub time_slots: Vec<String>,
    pub status: Option<VenueStatus>,
    pub created_at: Option<DateTime<Utc>>,
}

/// New venue creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVenue {
    pub name: String,
    pub sport: String,
    pub address: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub facilities: Vec<Facility>,
    pub time_slots: Vec<String>,
    pub status: VenueStatus,
}

/// Venue update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateVenue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facilities: Option<Vec<Facility>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slots: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<VenueStatus>,
}
