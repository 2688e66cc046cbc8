//! Cookie-session authentication for the JIRA REST API.
//!
//! A [`Client`] owns a transport and at most one [`Session`]. The session is
//! created by logging in through [`AuthenticationService`], replayed as cookies
//! on every later request, and dropped on a confirmed logout.
//!
//! ```no_run
//! # async fn run() -> anyhow::Result<()> {
//! let client = jira_auth_core::Client::new("https://jira.example.com")?;
//! let auth = client.authentication();
//! auth.acquire_session_cookie("fred", "secret").await?;
//! let me = auth.current_user().await?;
//! println!("logged in {} times", me.login_info.login_count);
//! auth.logout().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;

pub use api::{ApiRequest, ApiResponse, AuthError, Cookie, HttpTransport, Transport, TransportError};
pub use auth::{AuthenticationService, CredentialStore, LoginInfo, Session, SessionToken};
pub use client::Client;
pub use config::Config;
