//! Session cookie storage.
//!
//! A plain name/value jar that logout drops wholesale. Domain and path
//! scoping are ignored: one client talks to one API host.

use std::collections::BTreeMap;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};

/// A parsed `Set-Cookie` header, reduced to what the client needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    /// Set when the header asked for removal (`Max-Age<=0` or a past `Expires`).
    pub expired: bool,
}

impl Cookie {
    /// Parse one `Set-Cookie` header value. Returns `None` for headers
    /// without a `name=value` pair.
    ///
    /// `Expires` is read in every date layout servers send, including the
    /// dashed `Thu, 01-Jan-1970 00:00:01 GMT` form used to delete cookies.
    pub fn parse(header: &str) -> Option<Self> {
        let parsed = cookie::Cookie::parse(header.trim()).ok()?;
        let max_age_elapsed = parsed.max_age().is_some_and(|age| age.whole_seconds() <= 0);
        let expires_passed = parsed
            .expires_datetime()
            .is_some_and(|at| at.unix_timestamp() <= Utc::now().timestamp());

        Some(Self {
            name: parsed.name().to_string(),
            value: parsed.value().trim_matches('"').to_string(),
            expired: max_age_elapsed || expires_passed,
        })
    }
}

/// Name → value cookie jar for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a cookie; expired or empty cookies are removed.
    pub fn store(&mut self, cookie: Cookie) {
        if cookie.expired || cookie.value.is_empty() {
            self.cookies.remove(&cookie.name);
        } else {
            self.cookies.insert(cookie.name, cookie.value);
        }
    }

    /// Apply every `Set-Cookie` header of a response. Returns how many
    /// headers were understood.
    pub fn store_from_headers(&mut self, headers: &HeaderMap) -> usize {
        let mut applied = 0;
        for value in headers.get_all(SET_COOKIE) {
            if let Some(cookie) = value.to_str().ok().and_then(Cookie::parse) {
                self.store(cookie);
                applied += 1;
            }
        }
        applied
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// The `Cookie` request header, or `None` when the jar is empty.
    pub fn header_value(&self) -> Option<HeaderValue> {
        if self.cookies.is_empty() {
            return None;
        }
        let joined = self
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        HeaderValue::from_str(&joined).ok()
    }
}
