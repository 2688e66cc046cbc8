//! Session lifecycle: acquire, query and terminate the cookie session.
//!
//! JIRA API docs: https://docs.atlassian.com/jira/REST/latest/#auth/1/session

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info, warn};

use super::Session;
use crate::api::{ApiResponse, AuthError, Transport};
use crate::client::ClientInner;

/// Endpoint for creating, inspecting and deleting the session
pub const SESSION_ENDPOINT: &str = "rest/auth/1/session";

/// Status the service answers a successful login with
const LOGIN_OK: u16 = 200;

/// Status the service answers a successful logout with
const LOGOUT_OK: u16 = 204;

/// Session operations for one [`Client`](crate::Client).
///
/// Obtained from [`Client::authentication`](crate::Client::authentication).
/// A [`detached`](Self::detached) service is bound to no client: it reports
/// unauthenticated and refuses every operation with
/// [`AuthError::NotConfigured`].
pub struct AuthenticationService<T> {
    client: Option<Arc<ClientInner<T>>>,
}

impl<T> Clone for AuthenticationService<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
        }
    }
}

impl<T> Default for AuthenticationService<T> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<T> AuthenticationService<T> {
    pub(crate) fn bound(client: Arc<ClientInner<T>>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn detached() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    fn client(&self) -> Result<&ClientInner<T>, AuthError> {
        self.client.as_deref().ok_or(AuthError::NotConfigured)
    }
}

impl<T: Transport> AuthenticationService<T> {
    /// Create a new session for `username` and store it on the client.
    ///
    /// Credentials are passed through unchecked; the service decides whether
    /// they are valid. Only a 200 response yields a session, and it replaces
    /// any session already stored. On every failure the stored session is
    /// left untouched.
    pub async fn acquire_session_cookie(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        let client = self.client()?;
        let mut slot = client.session.lock().await;

        let body = json!({ "username": username, "password": password });
        let request = client.prepare(slot.as_ref(), Method::POST, SESSION_ENDPOINT, Some(body))?;

        debug!(username, "Acquiring session cookie");
        let response = client
            .transport
            .execute(request)
            .await
            .map_err(|source| AuthError::Transport {
                method: Method::POST,
                path: SESSION_ENDPOINT.to_string(),
                source,
            })?;

        let cookies = response.cookies.clone();
        if response.status != LOGIN_OK {
            let status = response.status;
            let body = response.text().await.unwrap_or_default();
            warn!(username, status, "Authentication rejected");
            return Err(AuthError::authentication_failed(status, &body, cookies));
        }

        let mut session: Session = read_json(response).await?;
        session.cookies = cookies;
        info!(
            username,
            cookies = session.cookies.len(),
            login_count = session.login_info.login_count,
            "Session acquired"
        );
        *slot = Some(session);

        Ok(true)
    }

    /// Whether the client currently holds a session. No network traffic.
    pub async fn authenticated(&self) -> bool {
        match self.client {
            Some(ref client) => client.session.lock().await.is_some(),
            None => false,
        }
    }

    /// Log the current user out and drop the session once the service
    /// confirms with 204. Any other outcome keeps the session, since the
    /// server side may still be live.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let client = self.client()?;
        let mut slot = client.session.lock().await;
        let Some(session) = slot.as_ref() else {
            return Err(AuthError::NotAuthenticated);
        };

        let request = client.prepare(Some(session), Method::DELETE, SESSION_ENDPOINT, None)?;
        let response = client
            .transport
            .execute(request)
            .await
            .map_err(|source| AuthError::Transport {
                method: Method::DELETE,
                path: SESSION_ENDPOINT.to_string(),
                source,
            })?;

        if response.status != LOGOUT_OK {
            warn!(status = response.status, "Logout rejected, keeping session");
            return Err(AuthError::UnexpectedStatus {
                status: response.status,
            });
        }

        info!(username = session.username().unwrap_or_default(), "Session terminated");
        *slot = None;
        Ok(())
    }

    /// Fetch the current user's session details fresh from the service.
    ///
    /// The result reflects server-side state at call time (login counters
    /// included), never the cached session. The stored session is not changed.
    pub async fn current_user(&self) -> Result<Session, AuthError> {
        let client = self.client()?;
        let slot = client.session.lock().await;
        let Some(session) = slot.as_ref() else {
            return Err(AuthError::NotAuthenticated);
        };

        let request = client.prepare(Some(session), Method::GET, SESSION_ENDPOINT, None)?;
        let response = client
            .transport
            .execute(request)
            .await
            .map_err(|source| AuthError::Transport {
                method: Method::GET,
                path: SESSION_ENDPOINT.to_string(),
                source,
            })?;
        debug!(status = response.status, "Fetched current user");
        if !response.is_success() {
            return Err(AuthError::UnexpectedStatus {
                status: response.status,
            });
        }

        read_json(response).await
    }
}

/// Read the whole body, then decode it. The response is consumed either way.
async fn read_json<R: DeserializeOwned>(response: ApiResponse) -> Result<R, AuthError> {
    let body = response.read_body().await.map_err(AuthError::ResponseRead)?;
    Ok(serde_json::from_slice(&body)?)
}
