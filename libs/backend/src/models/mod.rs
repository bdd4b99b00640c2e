//! Wire models for the backend data tables

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

pub mod article;
pub mod booking;
pub mod event;
pub mod team;
pub mod venue;

pub use article::Article;
pub use booking::{Booking, BookingStatus, NewBooking, UpdateBooking};
pub use event::Event;
pub use team::{NewTeam, Team};
pub use venue::{Facility, NewVenue, UpdateVenue, Venue, VenueStatus};

/// Deserialize a JSON column that may hold an array, a JSON-encoded string
/// of one, or null; anything unreadable becomes an empty list, matching how
/// the application has always treated these columns
pub(crate) fn lenient_json_array<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None => Vec::new(),
        Some(serde_json::Value::String(text)) => serde_json::from_str(&text).unwrap_or_default(),
        Some(other) => serde_json::from_value(other).unwrap_or_default(),
    })
}
