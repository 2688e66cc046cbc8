//! Authentication module for the JIRA cookie session.
//!
//! This module provides:
//! - `Session`: the session resource plus the cookies that identify it
//! - `AuthenticationService`: acquire, query and terminate the session
//! - `CredentialStore`: Secure OS-level credential storage via keyring
//!
//! A client holds at most one session; it lives only in memory.

pub mod credentials;
pub mod service;
pub mod session;

pub use credentials::CredentialStore;
pub use service::{AuthenticationService, SESSION_ENDPOINT};
pub use session::{LoginInfo, Session, SessionToken};
