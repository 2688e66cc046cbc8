//! HTTP transport for communicating with a JIRA REST API.
//!
//! This module provides `HttpTransport`, the reqwest-backed [`Transport`]
//! used by [`Client`](crate::Client) outside of tests.

use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use reqwest::{header, Client, Method};
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{ApiRequest, ApiResponse, Cookie, Transport, TransportError};

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("jira-auth/", env!("CARGO_PKG_VERSION"));

/// Transport backed by a pooled reqwest client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
///
/// Reqwest's own cookie store stays disabled: session cookies are owned by the
/// client's session state and replayed from each [`ApiRequest`].
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
}

impl HttpTransport {
    /// Create a transport for the instance at `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_timeout(base_url, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Ensure the base URL ends with `/` so relative paths join beneath it
    /// instead of replacing its last segment (`https://host/jira` + `rest/..`).
    fn normalize_base_url(base_url: &str) -> Result<Url, TransportError> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            return Err(TransportError::InvalidRequest(
                "base URL is empty".to_string(),
            ));
        }
        let mut url = Url::parse(trimmed)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    fn headers(request: &ApiRequest) -> Result<header::HeaderMap, TransportError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));
        if let Some(cookies) = request.cookie_header() {
            headers.insert(header::COOKIE, header::HeaderValue::from_str(&cookies)?);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, TransportError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;
        Ok(ApiRequest::new(method, url, body))
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let headers = Self::headers(&request)?;
        let mut builder = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(headers);
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let cookies: Vec<Cookie> = response.cookies().map(Cookie::from).collect();
        debug!(
            method = %request.method,
            url = %request.url,
            status,
            cookies = cookies.len(),
            "Request completed"
        );

        let body = async move {
            let bytes = response.bytes().await?;
            Ok::<_, TransportError>(bytes.to_vec())
        }
        .boxed();

        Ok(ApiResponse::new(status, cookies, body))
    }
}
