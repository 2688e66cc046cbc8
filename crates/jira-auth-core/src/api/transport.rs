//! The request/response contract the session manager is written against.
//!
//! A [`Transport`] turns a method, a path relative to the service base URL and
//! an optional JSON body into an [`ApiRequest`], and executes that request into
//! an [`ApiResponse`]. Connection pooling, TLS and timeouts live behind it.

use std::fmt;

use async_trait::async_trait;
use futures::future::{self, BoxFuture, FutureExt};
use reqwest::Method;
use serde_json::Value;
use url::Url;

use super::{cookie_header, Cookie, TransportError};

/// A prepared request. Cookies are replayed verbatim in a `Cookie` header.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
    pub cookies: Vec<Cookie>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url, body: Option<Value>) -> Self {
        Self {
            method,
            url,
            body,
            cookies: Vec::new(),
        }
    }

    /// Replace the cookies sent with this request.
    pub fn with_cookies(mut self, cookies: &[Cookie]) -> Self {
        self.cookies = cookies.to_vec();
        self
    }

    pub fn cookie_header(&self) -> Option<String> {
        cookie_header(&self.cookies)
    }
}

/// Response descriptor returned by [`Transport::execute`].
///
/// The body is read lazily. Dropping an `ApiResponse` without reading it
/// releases the underlying connection.
pub struct ApiResponse {
    pub status: u16,
    pub cookies: Vec<Cookie>,
    body: BoxFuture<'static, Result<Vec<u8>, TransportError>>,
}

impl ApiResponse {
    pub fn new(
        status: u16,
        cookies: Vec<Cookie>,
        body: BoxFuture<'static, Result<Vec<u8>, TransportError>>,
    ) -> Self {
        Self {
            status,
            cookies,
            body,
        }
    }

    /// A response whose body is already in memory.
    pub fn from_bytes(status: u16, cookies: Vec<Cookie>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(status, cookies, future::ready(Ok(body.into())).boxed())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body, consuming the response.
    pub async fn read_body(self) -> Result<Vec<u8>, TransportError> {
        self.body.await
    }

    /// Read the body as text, replacing invalid UTF-8.
    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.read_body().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl fmt::Debug for ApiResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiResponse")
            .field("status", &self.status)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

/// Builds and executes requests against the service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Prepare a request for `path`, relative to the configured base URL.
    fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiRequest, TransportError>;

    /// Send the request. An `Err` means no usable response was received;
    /// any HTTP status, including 4xx/5xx, comes back as `Ok`.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_response_text_is_lossy() {
        let response = ApiResponse::from_bytes(200, Vec::new(), vec![b'o', b'k', 0xff]);
        assert!(response.is_success());
        assert_eq!(response.text().await.unwrap(), "ok\u{fffd}");
    }

    #[tokio::test]
    async fn test_response_body_error_surfaces_on_read() {
        let body = future::ready(Err(TransportError::Connection("reset by peer".into()))).boxed();
        let response = ApiResponse::new(200, Vec::new(), body);
        let err = response.read_body().await.unwrap_err();
        assert!(err.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_request_with_cookies_replaces() {
        let url = Url::parse("https://jira.example.com/rest/auth/1/session").unwrap();
        let request = ApiRequest::new(Method::GET, url, None)
            .with_cookies(&[Cookie::new("a", "1")])
            .with_cookies(&[Cookie::new("JSESSIONID", "abc")]);
        assert_eq!(request.cookie_header().as_deref(), Some("JSESSIONID=abc"));
    }
}
