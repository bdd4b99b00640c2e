//! Event repository

use common::error::BackendResult;

use crate::models::Event;
use crate::query::TableQuery;
use crate::rest::RestClient;

const TABLE: &str = "events";

/// Repository for the `events` table
#[derive(Clone)]
pub struct EventRepository {
    rest: RestClient,
}

impl EventRepository {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// The most recently published events
    pub async fn featured(&self, limit: u32) -> BackendResult<Vec<Event>> {
        let query = TableQuery::new().order_by("created_at", false).limit(limit);
        self.rest.select(TABLE, &query).await
    }
}
