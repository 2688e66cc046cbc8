use reqwest::Method;
use thiserror::Error;

use super::Cookie;

/// Failures raised by a [`Transport`](super::Transport) while building or
/// executing a request. These never carry a usable response.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Connection failed: {0}")]
    Connection(String),
}

/// Failures of the session lifecycle operations.
///
/// Every variant is recoverable; the stored session is left exactly as it was
/// before the failing call.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication service is not attached to a client")]
    NotConfigured,

    #[error("No user is authenticated yet")]
    NotAuthenticated,

    #[error("Failed to build {method} request for {path}: {source}")]
    RequestConstruction {
        method: Method,
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("{method} request to {path} failed: {source}")]
    Transport {
        method: Method,
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("Authentication failed with status {status}: {detail}")]
    AuthenticationFailed {
        status: u16,
        detail: String,
        /// Cookies the service sent alongside the rejection. Diagnostic only,
        /// never promoted to a session.
        cookies: Vec<Cookie>,
    },

    #[error("Unexpected response status {status}")]
    UnexpectedStatus { status: u16 },

    #[error("Failed to read response body: {0}")]
    ResponseRead(#[source] TransportError),

    #[error("Failed to decode session response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl AuthError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn authentication_failed(status: u16, body: &str, cookies: Vec<Cookie>) -> Self {
        let detail = if body.trim().is_empty() {
            "no response body".to_string()
        } else {
            Self::truncate_body(body.trim())
        };
        AuthError::AuthenticationFailed {
            status,
            detail,
            cookies,
        }
    }

    /// Status code observed on the wire, for the variants that have one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::AuthenticationFailed { status, .. }
            | AuthError::UnexpectedStatus { status } => Some(*status),
            _ => None,
        }
    }
}
