//! Venue repository

use tracing::info;
use uuid::Uuid;

use common::error::{BackendError, BackendResult};

use crate::models::{NewVenue, UpdateVenue, Venue, VenueStatus};
use crate::query::{FilterOp, TableQuery};
use crate::rest::RestClient;

const TABLE: &str = "venues";

/// Repository for the `venues` table
#[derive(Clone)]
pub struct VenueRepository {
    rest: RestClient,
}

impl VenueRepository {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// List venues matching the given query
    pub async fn list(&self, query: &TableQuery) -> BackendResult<Vec<Venue>> {
        self.rest.select(TABLE, query).await
    }

    /// Venues currently open for booking, newest first
    pub async fn active(&self) -> BackendResult<Vec<Venue>> {
        let query = TableQuery::new()
            .filter("status", FilterOp::Eq, VenueStatus::Active)
            .order_by("created_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Fetch a venue by id
    pub async fn get(&self, id: Uuid) -> BackendResult<Venue> {
        let query = TableQuery::new().filter("id", FilterOp::Eq, id).limit(1);
        let mut rows: Vec<Venue> = self.rest.select(TABLE, &query).await?;
        rows.pop().ok_or(BackendError::NotFound)
    }

    /// Create a venue
    pub async fn create(&self, venue: &NewVenue) -> BackendResult<Venue> {
        info!("creating venue {}", venue.name);
        self.rest.insert(TABLE, venue).await
    }

    /// Update a venue and return it as stored
    pub async fn update(&self, id: Uuid, changes: &UpdateVenue) -> BackendResult<Venue> {
        let query = TableQuery::new().filter("id", FilterOp::Eq, id);
        let rows: Vec<Venue> = self.rest.update(TABLE, &query, changes).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    /// Flip a venue's listing status
    pub async fn set_status(&self, id: Uuid, status: VenueStatus) -> BackendResult<Venue> {
        info!("setting venue {id} status to {status}");
        let changes = UpdateVenue {
            status: Some(status),
            ..UpdateVenue::default()
        };
        self.update(id, &changes).await
    }

    /// Delete a venue
    pub async fn delete(&self, id: Uuid) -> BackendResult<()> {
        info!("deleting venue {id}");
        let query = TableQuery::new().filter("id", FilterOp::Eq, id);
        self.rest.delete(TABLE, &query).await
    }
}
