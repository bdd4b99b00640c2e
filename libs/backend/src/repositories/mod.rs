//! Typed repositories over the backend data tables
//!
//! One repository per table; each is a thin, cloneable wrapper around the
//! shared [`RestClient`](crate::rest::RestClient).

pub mod articles;
pub mod bookings;
pub mod events;
pub mod teams;
pub mod venues;

pub use articles::ArticleRepository;
pub use bookings::BookingRepository;
pub use events::EventRepository;
pub use teams::TeamRepository;
pub use venues::VenueRepository;
