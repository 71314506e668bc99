//! Cookie storage scoped by the public suffix list.

use cookie::Cookie;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::HeaderValue;
use tracing::debug;
use url::Url;

/// Cookie jar that refuses cookies whose `Domain` attribute is a public
/// suffix (`com`, `co.uk`, ...) unless it names the request host itself.
///
/// Accepted cookies are stored in a [`reqwest::cookie::Jar`].
#[derive(Debug, Default)]
pub struct PublicSuffixJar {
    inner: Jar,
}

impl PublicSuffixJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw `Set-Cookie` value as if it had been received from `url`.
    pub fn add_cookie_str(&self, cookie: &str, url: &Url) {
        if accepts(cookie, url) {
            self.inner.add_cookie_str(cookie, url);
        }
    }

    /// Store `cookie` as if it had been received from `url`.
    pub fn add_cookie(&self, cookie: &Cookie<'_>, url: &Url) {
        self.add_cookie_str(&cookie.to_string(), url);
    }
}

impl CookieStore for PublicSuffixJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let accepted: Vec<HeaderValue> = cookie_headers
            .filter(|header| header.to_str().is_ok_and(|value| accepts(value, url)))
            .cloned()
            .collect();
        self.inner.set_cookies(&mut accepted.iter(), url);
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.inner.cookies(url)
    }
}

fn accepts(set_cookie: &str, url: &Url) -> bool {
    let Ok(cookie) = Cookie::parse(set_cookie) else {
        return false;
    };
    let Some(domain) = cookie.domain() else {
        return true;
    };

    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    let is_public_suffix = psl::suffix_str(&domain) == Some(domain.as_str());
    if is_public_suffix && url.host_str() != Some(domain.as_str()) {
        debug!("Rejected cookie '{}' scoped to public suffix '{}'", cookie.name(), domain);
        return false;
    }
    true
}
