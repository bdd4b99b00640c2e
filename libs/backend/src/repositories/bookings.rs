//! Booking repository

use tracing::info;
use uuid::Uuid;

use common::error::{BackendError, BackendResult};

use crate::models::{Booking, BookingStatus, NewBooking, UpdateBooking};
use crate::query::{FilterOp, TableQuery};
use crate::rest::RestClient;

const TABLE: &str = "bookings";

/// Repository for the `bookings` table
#[derive(Clone)]
pub struct BookingRepository {
    rest: RestClient,
}

impl BookingRepository {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// A user's bookings, newest first
    pub async fn for_user(&self, user_id: Uuid) -> BackendResult<Vec<Booking>> {
        let query = TableQuery::new()
            .filter("user_id", FilterOp::Eq, user_id)
            .order_by("created_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Bookings in the given workflow state, oldest first so the queue is
    /// worked in arrival order
    pub async fn with_status(&self, status: BookingStatus) -> BackendResult<Vec<Booking>> {
        let query = TableQuery::new()
            .filter("status", FilterOp::Eq, status)
            .order_by("created_at", true);
        self.rest.select(TABLE, &query).await
    }

    /// Fetch a booking by id
    pub async fn get(&self, id: Uuid) -> BackendResult<Booking> {
        let query = TableQuery::new().filter("id", FilterOp::Eq, id).limit(1);
        let mut rows: Vec<Booking> = self.rest.select(TABLE, &query).await?;
        rows.pop().ok_or(BackendError::NotFound)
    }

    /// Create a booking
    pub async fn create(&self, booking: &NewBooking) -> BackendResult<Booking> {
        info!(
            "creating booking for venue {} on {}",
            booking.venue_id, booking.date
        );
        self.rest.insert(TABLE, booking).await
    }

    /// Move a booking through the workflow
    pub async fn set_status(&self, id: Uuid, status: BookingStatus) -> BackendResult<Booking> {
        info!("setting booking {id} status to {status}");
        let changes = UpdateBooking {
            status: Some(status),
            ..UpdateBooking::default()
        };
        let query = TableQuery::new().filter("id", FilterOp::Eq, id);
        let rows: Vec<Booking> = self.rest.update(TABLE, &query, &changes).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }
}
