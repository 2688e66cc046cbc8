use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer};

use crate::api::Cookie;

/// Timestamp layout used by the session resource, e.g. `2024-03-01T09:15:02.123+0000`
const LOGIN_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// An authenticated session as reported by `rest/auth/1/session`.
///
/// The JSON fields describe the user; `cookies` are captured from the
/// `Set-Cookie` headers of the login response and are what actually identifies
/// the session on later requests.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Session {
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Only present on the login response; the current-user lookup omits it.
    #[serde(rename = "session", default)]
    pub token: Option<SessionToken>,

    #[serde(rename = "loginInfo", default, deserialize_with = "null_as_default")]
    pub login_info: LoginInfo,

    #[serde(skip)]
    pub cookies: Vec<Cookie>,
}

impl Session {
    /// Look up a captured cookie by name
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn username(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Name/value pair of the cookie the service designates as the session id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SessionToken {
    pub name: String,
    pub value: String,
}

/// Login statistics. Informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub failed_login_count: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub login_count: i64,
    #[serde(default)]
    pub last_failed_login_time: Option<String>,
    #[serde(default)]
    pub previous_login_time: Option<String>,
}

impl LoginInfo {
    pub fn previous_login_at(&self) -> Option<DateTime<FixedOffset>> {
        self.previous_login_time.as_deref().and_then(parse_login_time)
    }

    pub fn last_failed_login_at(&self) -> Option<DateTime<FixedOffset>> {
        self.last_failed_login_time.as_deref().and_then(parse_login_time)
    }
}

/// Read an explicit `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Parse a login timestamp, accepting both `+0000` and RFC 3339 `+00:00` offsets.
fn parse_login_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, LOGIN_TIME_FORMAT))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_login_response() {
        let json = r#"{
            "self": "https://jira.example.com/rest/api/latest/user?username=fred",
            "name": "fred",
            "session": {"name": "JSESSIONID", "value": "6E3487971234567896704A9EB4AE501F"},
            "loginInfo": {
                "failedLoginCount": 1,
                "loginCount": 2,
                "lastFailedLoginTime": "2013-11-27T09:43:28.839+0000",
                "previousLoginTime": "2013-12-04T07:54:59.824+0000"
            }
        }"#;

        let session: Session = serde_json::from_str(json).expect("Failed to parse session JSON");
        assert_eq!(session.username(), Some("fred"));
        assert_eq!(
            session.token,
            Some(SessionToken {
                name: "JSESSIONID".to_string(),
                value: "6E3487971234567896704A9EB4AE501F".to_string(),
            })
        );
        assert_eq!(session.login_info.failed_login_count, 1);
        assert_eq!(session.login_info.login_count, 2);
        assert!(session.cookies.is_empty());
    }

    #[test]
    fn test_parse_current_user_response_without_token() {
        let json = r#"{"self":"https://jira.example.com/rest/api/latest/user?username=fred","name":"fred","loginInfo":{"loginCount":7}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.token, None);
        assert_eq!(session.login_info.login_count, 7);
        assert_eq!(session.login_info.previous_login_time, None);
    }

    #[test]
    fn test_null_login_info_reads_as_default() {
        let json = r#"{"name":"fred","session":{"name":"JSESSIONID","value":"abc"},"loginInfo":null}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.username(), Some("fred"));
        assert_eq!(session.login_info, LoginInfo::default());
    }

    #[test]
    fn test_null_login_counts_read_as_zero() {
        let json = r#"{"loginInfo":{"failedLoginCount":null,"loginCount":3}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.login_info.failed_login_count, 0);
        assert_eq!(session.login_info.login_count, 3);

        let json = r#"{"loginInfo":{"failedLoginCount":2,"loginCount":null,"previousLoginTime":null}}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.login_info.failed_login_count, 2);
        assert_eq!(session.login_info.login_count, 0);
        assert_eq!(session.login_info.previous_login_time, None);
    }

    #[test]
    fn test_login_times() {
        let info = LoginInfo {
            previous_login_time: Some("2013-12-04T07:54:59.824+0000".to_string()),
            last_failed_login_time: Some("2013-11-27T09:43:28+01:00".to_string()),
            ..Default::default()
        };

        let previous = info.previous_login_at().expect("previous login time");
        assert_eq!((previous.year(), previous.month(), previous.day()), (2013, 12, 4));
        assert_eq!(previous.hour(), 7);

        let failed = info.last_failed_login_at().expect("last failed login time");
        assert_eq!(failed.offset().local_minus_utc(), 3600);
    }

    #[test]
    fn test_login_times_unparseable() {
        let info = LoginInfo {
            previous_login_time: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert_eq!(info.previous_login_at(), None);
        assert_eq!(info.last_failed_login_at(), None);
    }

    #[test]
    fn test_cookie_lookup() {
        let session = Session {
            cookies: vec![Cookie::new("JSESSIONID", "abc"), Cookie::new("seraph", "x")],
            ..Default::default()
        };
        assert_eq!(session.cookie("seraph").map(|c| c.value.as_str()), Some("x"));
        assert!(session.cookie("missing").is_none());
    }
}
