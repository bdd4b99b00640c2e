//! Client for the backend authentication service
//!
//! Implements the session core's [`AuthBackend`] trait over the backend's
//! auth endpoints: password grant, signup, logout, and refresh grant. The
//! client owns the session-change notification fan-out, persists the
//! current session through an optional [`SessionFile`], and refreshes the
//! access token ahead of expiry on a background task.
//!
//! Construct inside a Tokio runtime; subscription forwarding and the
//! refresh timer run as spawned tasks.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use common::config::BackendConfig;
use common::error::{BackendError, BackendResult};
use session::{AuthBackend, Identity, Session, SessionEvents, SignUpDetails};

use crate::jwt;
use crate::rest::{api_error, decode_json};
use crate::storage::SessionFile;

/// Seconds before expiry at which the access token is refreshed
const REFRESH_MARGIN_SECS: i64 = 60;

/// Leeway when judging whether a restored token is still usable
const RESTORE_LEEWAY_SECS: i64 = 30;

/// Authentication client; cheap to clone, all clones share one session
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: BackendConfig,
    sessions: watch::Sender<Option<Session>>,
    store: Option<SessionFile>,
    refresh_task: Mutex<Option<JoinHandle<()>>>,
}

/// Token grant response from the auth endpoints
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    user: ApiUser,
}

#[derive(Deserialize)]
struct ApiUser {
    id: Uuid,
    email: Option<String>,
}

/// Signup answers with a full session when the account is usable right
/// away, or with just the user when email confirmation is pending
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Established(TokenResponse),
    PendingConfirmation(ApiUser),
}

impl TokenResponse {
    fn into_session(self) -> Session {
        Session {
            identity: Identity {
                id: self.user.id,
                email: self.user.email.unwrap_or_default(),
            },
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(self.expires_in),
        }
    }
}

impl AuthClient {
    /// Build the client, restoring a persisted session when one is still
    /// usable
    pub fn new(config: BackendConfig, store: Option<SessionFile>) -> BackendResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        let restored = store.as_ref().and_then(|file| match file.load() {
            Ok(session) => session,
            Err(err) => {
                warn!("ignoring unreadable persisted session: {err}");
                None
            }
        });

        // A restored token must decode, belong to the persisted identity,
        // and not be about to expire; otherwise fall back to the refresh
        // token.
        let (usable, stale) = match restored {
            Some(session) => match jwt::decode_claims(&session.access_token) {
                Ok(claims)
                    if claims.sub == session.identity.id
                        && !claims.is_expired(RESTORE_LEEWAY_SECS) =>
                {
                    (Some(session), None)
                }
                Ok(_) => (None, Some(session)),
                Err(err) => {
                    warn!("discarding persisted session with undecodable token: {err}");
                    (None, None)
                }
            },
            None => (None, None),
        };

        let (sessions, _) = watch::channel(usable.clone());
        let client = Self {
            inner: Arc::new(Inner {
                http,
                config,
                sessions,
                store,
                refresh_task: Mutex::new(None),
            }),
        };

        if let Some(session) = usable {
            info!("restored persisted session for {}", session.identity.id);
            client.schedule_refresh(&session);
        } else if let Some(session) = stale {
            let stale_client = client.clone();
            tokio::spawn(async move {
                match stale_client.refresh_grant(&session.refresh_token).await {
                    Ok(renewed) => {
                        info!("renewed persisted session for {}", renewed.identity.id);
                        stale_client.set_session(Some(renewed));
                    }
                    Err(err) => {
                        warn!("could not renew persisted session: {err}");
                        if let Some(file) = &stale_client.inner.store {
                            let _ = file.clear();
                        }
                    }
                }
            });
        }

        Ok(client)
    }

    /// Current session feed; the REST transport follows this to pick its
    /// bearer token
    pub fn sessions(&self) -> watch::Receiver<Option<Session>> {
        self.inner.sessions.subscribe()
    }

    /// Install a new session (or none): persist it, re-arm the refresh
    /// timer, and notify subscribers
    fn set_session(&self, next: Option<Session>) {
        if let Some(file) = &self.inner.store {
            let result = match &next {
                Some(session) => file.save(session),
                None => file.clear(),
            };
            if let Err(err) = result {
                warn!("failed to persist session change: {err}");
            }
        }

        // Aborting is a no-op for the task currently running this method;
        // it only takes effect at an await point, and there is none between
        // here and the end of the refresh task body.
        let previous = self.inner.refresh_task.lock().unwrap().take();
        if let Some(previous) = previous {
            previous.abort();
        }
        if let Some(session) = &next {
            self.schedule_refresh(session);
        }

        self.inner.sessions.send_replace(next);
    }

    fn schedule_refresh(&self, session: &Session) {
        let delay = (session.expires_at - Utc::now())
            .num_seconds()
            .saturating_sub(REFRESH_MARGIN_SECS)
            .max(0) as u64;
        let refresh_token = session.refresh_token.clone();
        let subject = session.identity.id;
        let client = self.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(delay)).await;
            match client.refresh_grant(&refresh_token).await {
                Ok(renewed) => {
                    info!("access token refreshed for {subject}");
                    client.set_session(Some(renewed));
                }
                Err(err) => {
                    // A failed refresh means the session is gone; surface
                    // that as a sign-out rather than a stuck stale token.
                    warn!("token refresh failed for {subject}: {err}");
                    client.set_session(None);
                }
            }
        });

        *self.inner.refresh_task.lock().unwrap() = Some(handle);
    }

    async fn refresh_grant(&self, refresh_token: &str) -> BackendResult<Session> {
        let response = self
            .inner
            .http
            .post(
                self.inner
                    .config
                    .auth_endpoint("token?grant_type=refresh_token"),
            )
            .header("apikey", self.inner.config.publishable_key.clone())
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let token: TokenResponse = decode_json(response).await?;
        Ok(token.into_session())
    }
}

#[async_trait]
impl AuthBackend for AuthClient {
    fn subscribe(&self) -> SessionEvents {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut feed = self.inner.sessions.subscribe();

        // The contract requires the current state immediately, then every
        // change in order.
        let _ = tx.send(feed.borrow_and_update().clone());
        tokio::spawn(async move {
            while feed.changed().await.is_ok() {
                let next = feed.borrow_and_update().clone();
                if tx.send(next).is_err() {
                    break;
                }
            }
        });

        rx
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> BackendResult<Session> {
        info!("signing in {email}");
        let response = self
            .inner
            .http
            .post(self.inner.config.auth_endpoint("token?grant_type=password"))
            .header("apikey", self.inner.config.publishable_key.clone())
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::InvalidCredentials);
        }

        let token: TokenResponse = decode_json(response).await?;
        let session = token.into_session();
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        details: &SignUpDetails,
    ) -> BackendResult<Identity> {
        info!("creating account for {email}");
        let response = self
            .inner
            .http
            .post(self.inner.config.auth_endpoint("signup"))
            .header("apikey", self.inner.config.publishable_key.clone())
            .json(&json!({
                "email": email,
                "password": password,
                "data": {
                    "full_name": details.full_name,
                    "phone": details.phone,
                },
            }))
            .send()
            .await?;

        let created: SignUpResponse = decode_json(response).await?;
        match created {
            SignUpResponse::Established(token) => {
                let session = token.into_session();
                let identity = session.identity.clone();
                self.set_session(Some(session));
                Ok(identity)
            }
            SignUpResponse::PendingConfirmation(user) => Ok(Identity {
                id: user.id,
                email: user.email.unwrap_or_else(|| email.to_string()),
            }),
        }
    }

    async fn sign_out(&self) -> BackendResult<()> {
        let token = {
            self.inner
                .sessions
                .borrow()
                .as_ref()
                .map(|session| session.access_token.clone())
        };

        let result = match token {
            Some(token) => {
                let outcome = self
                    .inner
                    .http
                    .post(self.inner.config.auth_endpoint("logout"))
                    .header("apikey", self.inner.config.publishable_key.clone())
                    .bearer_auth(token)
                    .send()
                    .await;

                match outcome {
                    Ok(response) => {
                        let status = response.status();
                        if status.is_success() {
                            Ok(())
                        } else {
                            Err(api_error(status, response).await)
                        }
                    }
                    Err(err) => Err(BackendError::Transport(err)),
                }
            }
            None => Ok(()),
        };

        // Local state clears regardless of the remote outcome, so the
        // notification stream reports the session gone either way.
        self.set_session(None);
        if result.is_ok() {
            info!("signed out");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_becomes_a_session() {
        let subject = Uuid::new_v4();
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": { "id": subject, "email": "a@x.com" },
        }))
        .expect("token response should parse");

        let session = token.into_session();
        assert_eq!(session.identity.id, subject);
        assert_eq!(session.identity.email, "a@x.com");
        assert!(session.expires_at > Utc::now());
    }

    #[test]
    fn signup_without_session_is_pending_confirmation() {
        let parsed: SignUpResponse = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "email": "a@x.com",
        }))
        .expect("user-only signup response should parse");
        assert!(matches!(parsed, SignUpResponse::PendingConfirmation(_)));
    }

    #[test]
    fn signup_with_session_is_established() {
        let parsed: SignUpResponse = serde_json::from_value(json!({
            "access_token": "access",
            "refresh_token": "refresh",
            "expires_in": 3600,
            "user": { "id": Uuid::new_v4(), "email": "a@x.com" },
        }))
        .expect("session signup response should parse");
        assert!(matches!(parsed, SignUpResponse::Established(_)));
    }
}
