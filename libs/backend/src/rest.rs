//! Authenticated REST transport for the data API
//!
//! Every table call goes through here: the publishable key rides along as
//! the api key header, and the bearer token is the signed-in user's access
//! token when a session is live, falling back to the publishable key for
//! anonymous reads. Row-level access control is enforced by the backend,
//! not by this client.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::watch;

use common::config::BackendConfig;
use common::error::{BackendError, BackendResult};
use session::Session;

use crate::query::TableQuery;

/// Shared transport for data-table requests
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: BackendConfig,
    session: watch::Receiver<Option<Session>>,
}

impl RestClient {
    /// Create a new REST transport following the given session feed
    pub fn new(
        config: BackendConfig,
        session: watch::Receiver<Option<Session>>,
    ) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    fn bearer(&self) -> String {
        self.session
            .borrow()
            .as_ref()
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.config.publishable_key.clone())
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, self.config.rest_endpoint(table))
            .header("apikey", self.config.publishable_key.clone())
            .bearer_auth(self.bearer())
    }

    /// Read rows matching the query
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &TableQuery,
    ) -> BackendResult<Vec<T>> {
        let response = self
            .request(Method::GET, table)
            .query(&query.to_params())
            .send()
            .await?;
        decode_json(response).await
    }

    /// Insert one row and return it as stored
    pub async fn insert<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        row: &B,
    ) -> BackendResult<T> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&[row])
            .send()
            .await?;
        let rows: Vec<T> = decode_json(response).await?;
        rows.into_iter().next().ok_or(BackendError::NotFound)
    }

    /// Insert one row without reading it back
    pub async fn insert_only<B: Serialize>(&self, table: &str, row: &B) -> BackendResult<()> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await?;
        expect_success(response).await
    }

    /// Update the rows matching the query and return them as stored
    pub async fn update<B: Serialize, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &TableQuery,
        changes: &B,
    ) -> BackendResult<Vec<T>> {
        let response = self
            .request(Method::PATCH, table)
            .query(&query.to_params())
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        decode_json(response).await
    }

    /// Delete the rows matching the query
    pub async fn delete(&self, table: &str, query: &TableQuery) -> BackendResult<()> {
        let response = self
            .request(Method::DELETE, table)
            .query(&query.to_params())
            .send()
            .await?;
        expect_success(response).await
    }
}

/// Decode a success response, or map the failure into the error taxonomy
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> BackendResult<T> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(response.json().await?)
}

pub(crate) async fn expect_success(response: Response) -> BackendResult<()> {
    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status, response).await);
    }
    Ok(())
}

/// Extract the backend's error message; different endpoints use different
/// field names for it
pub(crate) async fn api_error(status: StatusCode, response: Response) -> BackendError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        msg: Option<String>,
        error_description: Option<String>,
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.message.or(body.msg).or(body.error_description))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        });

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}
