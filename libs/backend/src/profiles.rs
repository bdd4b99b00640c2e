//! Profile store client
//!
//! Reads and writes the `profiles` table, and is the production
//! implementation of the session core's [`ProfileStore`] trait. The admin
//! flag read here gates UI only; the backend's row-level policies remain
//! the actual access control.

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use common::error::{BackendError, BackendResult};
use session::{NewProfile, Profile, ProfileStore};

use crate::query::{FilterOp, TableQuery};
use crate::rest::RestClient;

const TABLE: &str = "profiles";

/// Client for the `profiles` table
#[derive(Clone)]
pub struct ProfileClient {
    rest: RestClient,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

impl ProfileClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// Fetch a profile row by subject id
    pub async fn get(&self, id: Uuid) -> BackendResult<Option<Profile>> {
        let query = TableQuery::new().filter("id", FilterOp::Eq, id).limit(1);
        let mut rows: Vec<Profile> = self.rest.select(TABLE, &query).await?;
        Ok(rows.pop())
    }

    /// Create a profile row for a fresh account
    pub async fn create(&self, profile: &NewProfile) -> BackendResult<()> {
        self.rest.insert_only(TABLE, profile).await
    }

    /// Update a profile row and return it as stored
    pub async fn update(&self, id: Uuid, changes: &UpdateProfile) -> BackendResult<Profile> {
        let query = TableQuery::new().filter("id", FilterOp::Eq, id);
        let rows: Vec<Profile> = self.rest.update(TABLE, &query, changes).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    /// Grant or revoke administrator access
    pub async fn set_admin(&self, id: Uuid, is_admin: bool) -> BackendResult<Profile> {
        info!("setting admin flag for {id} to {is_admin}");
        let changes = UpdateProfile {
            is_admin: Some(is_admin),
            ..UpdateProfile::default()
        };
        self.update(id, &changes).await
    }
}

#[async_trait]
impl ProfileStore for ProfileClient {
    async fn get_profile(&self, subject: Uuid) -> BackendResult<Option<Profile>> {
        self.get(subject).await
    }

    async fn create_profile(&self, profile: &NewProfile) -> BackendResult<()> {
        self.create(profile).await
    }
}
