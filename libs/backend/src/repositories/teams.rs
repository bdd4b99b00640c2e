//! Team repository

use tracing::info;
use uuid::Uuid;

use common::error::BackendResult;

use crate::models::{NewTeam, Team};
use crate::query::{FilterOp, TableQuery};
use crate::rest::RestClient;

const TABLE: &str = "teams";

/// Repository for the `teams` table
#[derive(Clone)]
pub struct TeamRepository {
    rest: RestClient,
}

impl TeamRepository {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// All teams, newest first
    pub async fn list(&self) -> BackendResult<Vec<Team>> {
        let query = TableQuery::new().order_by("created_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Teams created by the given user
    pub async fn created_by(&self, user_id: Uuid) -> BackendResult<Vec<Team>> {
        let query = TableQuery::new()
            .filter("created_by", FilterOp::Eq, user_id)
            .order_by("created_at", false);
        self.rest.select(TABLE, &query).await
    }

    /// Create a team
    pub async fn create(&self, team: &NewTeam) -> BackendResult<Team> {
        info!("creating team {}", team.name);
        self.rest.insert(TABLE, team).await
    }
}
