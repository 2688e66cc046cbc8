//! The client value: a transport plus the single session it carries.

use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::{ApiRequest, ApiResponse, AuthError, HttpTransport, Transport, TransportError};
use crate::auth::{AuthenticationService, Session};
use crate::config::Config;

/// State shared between a [`Client`] and the services handed out by it.
pub(crate) struct ClientInner<T> {
    pub(crate) transport: T,
    /// At most one session per client. Every operation that reads and then
    /// mutates it holds this lock for its whole request.
    pub(crate) session: Mutex<Option<Session>>,
}

impl<T: Transport> ClientInner<T> {
    /// Build a request and attach the cookies of `session`, if any.
    pub(crate) fn prepare(
        &self,
        session: Option<&Session>,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, AuthError> {
        let request = self
            .transport
            .build_request(method.clone(), path, body)
            .map_err(|source| AuthError::RequestConstruction {
                method,
                path: path.to_string(),
                source,
            })?;

        Ok(match session {
            Some(session) => request.with_cookies(&session.cookies),
            None => request,
        })
    }
}

/// A JIRA API client holding at most one cookie session.
/// Clone is cheap and clones share the same session.
pub struct Client<T = HttpTransport> {
    inner: Arc<ClientInner<T>>,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Client<HttpTransport> {
    /// Create a client for the instance at `base_url`
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Ok(Self::with_transport(HttpTransport::new(base_url)?))
    }

    /// Create a client from a loaded [`Config`]. A missing base URL is
    /// reported as an invalid request.
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        let base_url = config.base_url.as_deref().unwrap_or_default();
        let transport = HttpTransport::with_timeout(base_url, config.request_timeout())?;
        Ok(Self::with_transport(transport))
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                transport,
                session: Mutex::new(None),
            }),
        }
    }

    /// Session lifecycle operations bound to this client
    pub fn authentication(&self) -> AuthenticationService<T> {
        AuthenticationService::bound(Arc::clone(&self.inner))
    }

    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Snapshot of the stored session
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.lock().await.clone()
    }

    /// Send an arbitrary API request carrying the current session cookies.
    ///
    /// The response is returned whatever its status; callers decide what a
    /// failure status means for their endpoint.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, AuthError> {
        let session = self.inner.session.lock().await;
        let request = self.inner.prepare(session.as_ref(), method.clone(), path, body)?;
        debug!(%method, path, authenticated = session.is_some(), "Sending request");

        self.inner
            .transport
            .execute(request)
            .await
            .map_err(|source| AuthError::Transport {
                method,
                path: path.to_string(),
                source,
            })
    }
}
