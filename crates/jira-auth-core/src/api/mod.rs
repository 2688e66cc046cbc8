//! Transport layer for the JIRA REST API.
//!
//! This module provides the [`Transport`] contract consumed by the session
//! manager, the reqwest-backed [`HttpTransport`], and a scripted
//! [`MockTransport`](mock::MockTransport) for tests.
//!
//! Authentication is cookie based: the cookies captured at login are replayed
//! on every request through [`ApiRequest::with_cookies`].

pub mod client;
pub mod cookie;
pub mod error;
pub mod mock;
pub mod transport;

pub use client::HttpTransport;
pub use cookie::{cookie_header, Cookie};
pub use error::{AuthError, TransportError};
pub use transport::{ApiRequest, ApiResponse, Transport};
