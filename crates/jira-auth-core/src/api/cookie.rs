//! Cookies issued by the service through `Set-Cookie` headers.

/// A cookie captured from a response.
///
/// Only the attributes the session needs are kept; the value is what gets
/// replayed in the `Cookie` header of later requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name
    pub name: String,

    /// Cookie value
    pub value: String,

    /// Domain for the cookie
    pub domain: Option<String>,

    /// Path for the cookie
    pub path: Option<String>,

    /// Whether the cookie is HTTP-only
    pub http_only: bool,

    /// Whether the cookie requires HTTPS
    pub secure: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            http_only: false,
            secure: false,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// `name=value` as it appears inside a `Cookie` request header.
    pub fn header_pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }
}

impl From<reqwest::cookie::Cookie<'_>> for Cookie {
    fn from(cookie: reqwest::cookie::Cookie<'_>) -> Self {
        Self {
            name: cookie.name().to_string(),
            value: cookie.value().to_string(),
            domain: cookie.domain().map(str::to_string),
            path: cookie.path().map(str::to_string),
            http_only: cookie.http_only(),
            secure: cookie.secure(),
        }
    }
}

/// Join cookies into a single `Cookie` header value, preserving order.
/// Returns `None` when there is nothing to send.
pub fn cookie_header(cookies: &[Cookie]) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    Some(
        cookies
            .iter()
            .map(Cookie::header_pair)
            .collect::<Vec<_>>()
            .join("; "),
    )
}
