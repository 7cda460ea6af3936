//! Client configuration and login credentials.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::error::{PlurkError, Result};

/// Default API host.
pub const DEFAULT_BASE_URL: &str = "https://www.plurk.com";
const CONNECT_TIMEOUT_SECS: u64 = 8;
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Options recognized by [`crate::PlurkClient`].
///
/// Build with [`PlurkConfig::new`] and the chained setters, or read the
/// `PLURK_*` environment variables with [`PlurkConfig::from_env`].
#[derive(Clone, PartialEq, Eq)]
pub struct PlurkConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Appended as `api_key` to every request when set.
    pub api_key: Option<String>,
}

impl Default for PlurkConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            user_agent: format!("plurk-rs/{}", env!("CARGO_PKG_VERSION")),
            api_key: None,
        }
    }
}

impl PlurkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the API host (staging, or a mock server in tests).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Deadline for one whole request; expiry surfaces as a network error.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Defaults overridden by `PLURK_BASE_URL`, `PLURK_API_KEY`,
    /// `PLURK_TIMEOUT_SECS` and `PLURK_USER_AGENT`. Empty variables are ignored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = var("PLURK_BASE_URL") {
            config.base_url = url;
        }
        if let Some(key) = var("PLURK_API_KEY") {
            config.api_key = Some(key);
        }
        if let Some(agent) = var("PLURK_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = var("PLURK_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| PlurkError::Config {
                message: format!("PLURK_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}"),
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check that the base URL is an absolute http(s) URL and the timeout is non-zero.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url).map_err(|e| PlurkError::Config {
            message: format!("invalid base URL {:?}: {e}", self.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(PlurkError::Config {
                message: format!("base URL must be http or https, got {:?}", self.base_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(PlurkError::Config {
                message: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

impl fmt::Debug for PlurkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlurkConfig")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Nick name and password for [`crate::PlurkClient::login`].
///
/// The client never stores these; they are sent once per login.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub nick_name: String,
    password: String,
}

impl Credentials {
    pub fn new(nick_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            nick_name: nick_name.into(),
            password: password.into(),
        }
    }

    /// Read `PLURK_NICK_NAME` and `PLURK_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PlurkError::Config {
                    message: format!("{key} is not set"),
                })
        };
        Ok(Self::new(require("PLURK_NICK_NAME")?, require("PLURK_PASSWORD")?))
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("nick_name", &self.nick_name)
            .field("password", &"<redacted>")
            .finish()
    }
}
