//! Session token extraction and script session id derivation.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Cookie carrying the server session token.
pub const SESSION_COOKIE_NAME: &str = "DWRSESSIONID";

const TOKEN_ALPHABET: &[u8; 64] =
    b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ*$";

const MASK_63: u64 = (1 << 63) - 1;

static CALLBACK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"handleCallback\("\w+",\s*"\w+",\s*"(.+?)"\);"#)
        .expect("handleCallback pattern is valid")
});

/// Pulls the server session token out of a `generateId` reply body.
pub trait SessionTokenExtractor: Send + Sync {
    /// Return the token, or `None` if the body has no recognizable reply.
    fn extract<'a>(&self, body: &'a str) -> Option<&'a str>;
}

/// Takes the third quoted argument of the first
/// `handleCallback("..", "..", "<token>");` invocation in the body.
#[derive(Debug, Clone)]
pub struct CallbackTokenExtractor {
    pattern: Regex,
}

impl CallbackTokenExtractor {
    pub fn new() -> Self {
        Self {
            pattern: CALLBACK_PATTERN.clone(),
        }
    }

    /// Use a custom pattern. The token is read from its first capture group.
    pub fn with_pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }
}

impl Default for CallbackTokenExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionTokenExtractor for CallbackTokenExtractor {
    fn extract<'a>(&self, body: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(body)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Whether `token` can be sent verbatim as a cookie value
/// (RFC 6265 `cookie-octet`s, non-empty).
pub fn is_cookie_value(token: &str) -> bool {
    !token.is_empty()
        && token.bytes().all(|b| {
            matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
        })
}

/// Encode `number` with the 64-symbol page id alphabet, least significant
/// digit first. Zero encodes as the empty string.
pub fn tokenify(number: u64) -> String {
    let mut token = String::new();
    let mut remainder = number;
    while remainder > 0 {
        token.push(TOKEN_ALPHABET[(remainder & 0x3F) as usize] as char);
        remainder >>= 6;
    }
    token
}

/// `"<serverToken>/<pageId>"`, sent as `scriptSessionId` on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSessionId {
    server_token: String,
    page_id: String,
}

impl ScriptSessionId {
    /// Derive a fresh page id for `server_token` from the current time and
    /// a random value.
    pub fn generate(server_token: impl Into<String>) -> Self {
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let random = rand::random::<u64>();
        Self::from_parts(server_token, nanos as u64 & MASK_63, random & MASK_63)
    }

    /// Build from explicit entropy; both values are truncated to 63 bits.
    pub fn from_parts(server_token: impl Into<String>, timestamp: u64, random: u64) -> Self {
        Self {
            server_token: server_token.into(),
            page_id: format!(
                "{}-{}",
                tokenify(timestamp & MASK_63),
                tokenify(random & MASK_63)
            ),
        }
    }

    pub fn server_token(&self) -> &str {
        &self.server_token
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }
}

impl fmt::Display for ScriptSessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.server_token, self.page_id)
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
