//! Article repository

use common::error::BackendResult;

use crate::models::Article;
use crate::query::TableQuery;
use crate::rest::RestClient;

const TABLE: &str = "articles";

/// Repository for the `articles` table
#[derive(Clone)]
pub struct ArticleRepository {
    rest: RestClient,
}

impl ArticleRepository {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// The most recently published articles
    pub async fn latest(&self, limit: u32) -> BackendResult<Vec<Article>> {
        let query = TableQuery::new().order_by("created_at", false).limit(limit);
        self.rest.select(TABLE, &query).await
    }
}
