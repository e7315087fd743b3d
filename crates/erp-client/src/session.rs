//! ERP session state.
//!
//! The ERP authenticates with a `sid` cookie issued by `/login`. A sid is an
//! explicit value with an expiry, held behind a mutex by the client — never
//! ambient global state. Expired or rejected sids are refreshed at the call
//! site with a single retry.

use std::time::{Duration, Instant};

use serde::Deserialize;

/// Server-side sid validity is 30 minutes; refresh a little earlier.
const SID_TTL: Duration = Duration::from_secs(25 * 60);

#[derive(Debug, Clone)]
pub struct Session {
    sid: String,
    expires_at: Instant,
}

impl Session {
    pub fn new(sid: String) -> Self {
        Self {
            sid,
            expires_at: Instant::now() + SID_TTL,
        }
    }

    pub fn cookie(&self) -> String {
        format!("sid={}", self.sid)
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Extracts the sid from the login response's `set-cookie` headers.
pub fn sid_from_set_cookie<'a>(cookies: impl Iterator<Item = &'a str>) -> Option<String> {
    for cookie in cookies {
        if let Some(rest) = cookie.strip_prefix("sid=") {
            let sid = rest.split(';').next().unwrap_or(rest).trim();
            if !sid.is_empty() {
                return Some(sid.to_string());
            }
        }
    }
    None
}

/// The ERP's max-sessions login rejection, carrying the sessions that can be
/// killed to make room.
#[derive(Debug, Deserialize)]
pub struct LoginRejection {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub sessions: Vec<LoginSession>,
}

#[derive(Debug, Deserialize)]
pub struct LoginSession {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "sessionLastAccessedTime", default)]
    pub last_accessed: i64,
}

pub const LOGIN_ERROR_MAX_SESSIONS: &str = "LOGIN_ERROR_MAX_SESSIONS";

impl LoginRejection {
    /// The least recently used session, the one worth killing.
    pub fn oldest_session(&self) -> Option<&LoginSession> {
        self.sessions.iter().min_by_key(|s| s.last_accessed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sid_is_extracted_from_cookie_list() {
        let cookies = ["lang=pt; Path=/", "sid=abc123; Path=/; HttpOnly"];
        assert_eq!(
            sid_from_set_cookie(cookies.into_iter()),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn missing_sid_cookie_yields_none() {
        let cookies = ["lang=pt; Path=/"];
        assert_eq!(sid_from_set_cookie(cookies.into_iter()), None);
    }

    #[test]
    fn oldest_session_wins_the_kill() {
        let rejection: LoginRejection = serde_json::from_str(
            r#"{
                "type": "LOGIN_ERROR_MAX_SESSIONS",
                "sessions": [
                    {"sessionId": "new", "sessionLastAccessedTime": 200},
                    {"sessionId": "old", "sessionLastAccessedTime": 100}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(rejection.oldest_session().unwrap().session_id, "old");
    }
}
