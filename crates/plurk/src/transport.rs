//! One authenticated request/response cycle against the API.

use parking_lot::{Mutex, RwLock};
use reqwest::Client;
use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::PlurkConfig;
use crate::cookie::CookieJar;
use crate::endpoints::Endpoint;
use crate::error::{PlurkError, Result};
use crate::params::Params;
use crate::session::Session;
use crate::types::ApiErrorBody;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const ERROR_SNIPPET_CHARS: usize = 400;

/// Whether a call needs an established session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Auth {
    Required,
    Anonymous,
}

/// HTTP plumbing plus the mutable per-client state: cookies and the session.
///
/// Locks are only held to copy state in or out, never across an `.await`.
pub(crate) struct Transport {
    config: PlurkConfig,
    http: Client,
    cookies: Mutex<CookieJar>,
    session: RwLock<Option<Session>>,
}

impl Transport {
    pub(crate) fn new(config: PlurkConfig) -> Result<Self> {
        config.validate()?;
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(PlurkError::Network)?;
        Ok(Self {
            config,
            http,
            cookies: Mutex::new(CookieJar::new()),
            session: RwLock::new(None),
        })
    }

    pub(crate) fn config(&self) -> &PlurkConfig {
        &self.config
    }

    pub(crate) fn session(&self) -> Option<Session> {
        self.session.read().clone()
    }

    pub(crate) fn has_session(&self) -> bool {
        self.session.read().is_some()
    }

    pub(crate) fn set_session(&self, session: Session) {
        *self.session.write() = Some(session);
    }

    /// Drop the session and every cookie that came with it.
    pub(crate) fn clear_session(&self) {
        *self.session.write() = None;
        self.cookies.lock().clear();
    }

    pub(crate) fn cookies(&self) -> CookieJar {
        self.cookies.lock().clone()
    }

    /// POST `params` to `endpoint` and decode the JSON answer as `T`.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        mut params: Params,
        auth: Auth,
    ) -> Result<T> {
        if auth == Auth::Required && !self.has_session() {
            debug!(endpoint = endpoint.path(), "refusing call without a session");
            return Err(PlurkError::AuthRequired);
        }
        if let Some(key) = &self.config.api_key {
            params.insert("api_key", key.as_str());
        }

        let url = self.config.url(endpoint.path());
        let body = params.to_form()?;
        let cookie_header: Option<HeaderValue> = self.cookies.lock().header_value();

        let mut request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        if let Some(value) = cookie_header {
            request = request.header(COOKIE, value);
        }

        let response = request.send().await.map_err(|e| {
            warn!(endpoint = endpoint.path(), error = %e, "plurk request failed");
            PlurkError::Network(e)
        })?;

        let status = response.status();
        let updated = self.cookies.lock().store_from_headers(response.headers());
        debug!(
            endpoint = endpoint.path(),
            status = status.as_u16(),
            cookies_updated = updated,
            "plurk request complete"
        );

        let text = response.text().await.map_err(PlurkError::Network)?;
        let value: Option<serde_json::Value> = if text.trim().is_empty() {
            Some(serde_json::Value::Null)
        } else {
            serde_json::from_str(&text).ok()
        };

        if !status.is_success() {
            let message = value
                .and_then(|v| serde_json::from_value::<ApiErrorBody>(v).ok())
                .and_then(|b| b.error_text)
                .unwrap_or_else(|| snippet(&text, status.canonical_reason().unwrap_or("error")));
            return Err(self.remote_failure(endpoint, status.as_u16(), message));
        }

        let value = value.ok_or_else(|| PlurkError::Remote {
            status: status.as_u16(),
            message: format!(
                "error decoding {} response: not JSON: {}",
                endpoint.path(),
                snippet(&text, "")
            ),
        })?;
        if let Some(error_text) = value.get("error_text").and_then(|v| v.as_str()) {
            return Err(self.remote_failure(endpoint, status.as_u16(), error_text.to_string()));
        }

        serde_json::from_value(value).map_err(|e| PlurkError::Remote {
            status: status.as_u16(),
            message: format!("error decoding {} response: {e}", endpoint.path()),
        })
    }

    fn remote_failure(&self, endpoint: Endpoint, status: u16, message: String) -> PlurkError {
        let err = PlurkError::classify(status, message, endpoint.is_login());
        warn!(endpoint = endpoint.path(), status, error = %err, "plurk API error");
        if matches!(err, PlurkError::AuthRequired) && self.has_session() {
            // The service no longer honors our cookies; stop pretending we are logged in.
            self.clear_session();
        }
        err
    }
}

fn snippet(text: &str, fallback: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(ERROR_SNIPPET_CHARS).collect()
}
