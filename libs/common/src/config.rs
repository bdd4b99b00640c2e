//! Configuration for the managed backend
//!
//! The client talks to a single backend project identified by its base URL
//! and a publishable API key. Both are read from the environment.

use std::env;

use crate::error::{BackendError, BackendResult};

/// Configuration for the managed backend project
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project (e.g., "https://abc.example-backend.co")
    pub project_url: String,
    /// Publishable API key sent with every request
    pub publishable_key: String,
    /// HTTP request timeout in seconds
    pub http_timeout_secs: u64,
}

impl BackendConfig {
    /// Create a new BackendConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SPORTSSPOT_BACKEND_URL`: Backend base URL (default: "http://localhost:54321")
    /// - `SPORTSSPOT_PUBLISHABLE_KEY`: Publishable API key (required)
    /// - `SPORTSSPOT_HTTP_TIMEOUT`: Request timeout in seconds (default: 30)
    pub fn from_env() -> BackendResult<Self> {
        let project_url = env::var("SPORTSSPOT_BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:54321".to_string());

        let publishable_key = env::var("SPORTSSPOT_PUBLISHABLE_KEY").map_err(|_| {
            BackendError::Configuration(
                "SPORTSSPOT_PUBLISHABLE_KEY environment variable not set".to_string(),
            )
        })?;

        let http_timeout_secs = env::var("SPORTSSPOT_HTTP_TIMEOUT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            project_url,
            publishable_key,
            http_timeout_secs,
        })
    }

    /// URL of an authentication endpoint, e.g. `auth_endpoint("signup")`
    pub fn auth_endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.project_url.trim_end_matches('/'), path)
    }

    /// URL of a data-table endpoint, e.g. `rest_endpoint("venues")`
    pub fn rest_endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.project_url.trim_end_matches('/'), table)
    }
}
