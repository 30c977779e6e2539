//! Client configuration gathered from defaults and the environment.
//!
//! [`ClientConfig`] holds the same settings as the client builders and can
//! produce either client. [`ClientConfig::from_env`] reads:
//!
//! | Variable | Setting |
//! |---|---|
//! | `FINTRACK_BASE_URL` | backend origin |
//! | `FINTRACK_API_ROOT` | API mount point |
//! | `FINTRACK_CSRF_TOKEN` | CSRF token |
//! | `FINTRACK_SESSION_COOKIE` | raw `Cookie` header |
//! | `FINTRACK_TIMEOUT_SECS` | per-request timeout |
//!
//! When no token is set but the session cookie carries `csrftoken`, the
//! token is taken from the cookie.

use core::time::Duration;

#[cfg(any(feature = "async", feature = "blocking", test))]
use secrecy::ExposeSecret as _;
use secrecy::SecretString;

use crate::client::{
    DEFAULT_API_ROOT, DEFAULT_BASE_URL, DEFAULT_CSRF_HEADER, DEFAULT_TIMEOUT, RetryPolicy,
};
use crate::credentials::{DEFAULT_CSRF_COOKIE, cookie_value};
use crate::error::{FintrackError, Result};

/// Environment variable holding the backend origin.
pub const ENV_BASE_URL: &str = "FINTRACK_BASE_URL";
/// Environment variable holding the API mount point.
pub const ENV_API_ROOT: &str = "FINTRACK_API_ROOT";
/// Environment variable holding the CSRF token.
pub const ENV_CSRF_TOKEN: &str = "FINTRACK_CSRF_TOKEN";
/// Environment variable holding the raw session cookie header.
pub const ENV_SESSION_COOKIE: &str = "FINTRACK_SESSION_COOKIE";
/// Environment variable holding the timeout in whole seconds.
pub const ENV_TIMEOUT_SECS: &str = "FINTRACK_TIMEOUT_SECS";

/// Settings for building an API client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin.
    pub base_url: String,
    /// API mount point.
    pub api_root: String,
    /// CSRF token, if any.
    pub csrf_token: Option<SecretString>,
    /// CSRF header name.
    pub csrf_header: String,
    /// Raw `Cookie` header, if any.
    pub session_cookie: Option<SecretString>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retry policy for `GET` requests.
    pub retry: RetryPolicy,
}

/// Applies a [`ClientConfig`] to a client builder.
macro_rules! configure_builder {
    ($config:expr, $builder:expr) => {{
        let config: &ClientConfig = $config;
        let mut builder = $builder
            .base_url(config.base_url.as_str())
            .api_root(config.api_root.as_str())
            .csrf_header(config.csrf_header.as_str())
            .timeout(config.timeout)
            .retry(config.retry);
        if let Some(token) = config.csrf_token.as_ref() {
            builder = builder.credentials(crate::credentials::StaticCredentials::new(
                token.expose_secret(),
            ));
        }
        if let Some(cookie) = config.session_cookie.as_ref() {
            builder = builder.session_cookie(cookie.expose_secret());
        }
        builder.build()
    }};
}

impl Default for ClientConfig {
    #[inline]
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            api_root: DEFAULT_API_ROOT.to_owned(),
            csrf_token: None,
            csrf_header: DEFAULT_CSRF_HEADER.to_owned(),
            session_cookie: None,
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::Config`] if `FINTRACK_TIMEOUT_SECS` is not
    /// a whole number.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable
    /// name to its value.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::Config`] if `FINTRACK_TIMEOUT_SECS` is not
    /// a whole number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();
        if let Some(url) = var(ENV_BASE_URL) {
            config.base_url = url;
        }
        if let Some(root) = var(ENV_API_ROOT) {
            config.api_root = root;
        }
        if let Some(raw) = var(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|err| {
                FintrackError::Config(format!("invalid {ENV_TIMEOUT_SECS} `{raw}`: {err}"))
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        let cookie = var(ENV_SESSION_COOKIE);
        config.csrf_token = var(ENV_CSRF_TOKEN)
            .or_else(|| {
                cookie
                    .as_deref()
                    .and_then(|raw| cookie_value(raw, DEFAULT_CSRF_COOKIE))
            })
            .map(SecretString::from);
        config.session_cookie = cookie.map(SecretString::from);
        tracing::debug!(
            base_url = %config.base_url,
            has_token = config.csrf_token.is_some(),
            has_cookie = config.session_cookie.is_some(),
            "configuration loaded"
        );
        Ok(config)
    }

    /// Sets the backend origin.
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the CSRF token.
    #[inline]
    #[must_use]
    pub fn csrf_token<T: Into<String>>(mut self, token: T) -> Self {
        self.csrf_token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the retry policy.
    #[inline]
    #[must_use]
    pub const fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Sets the per-request timeout.
    #[inline]
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builds an async [`crate::client::ApiClient`].
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::Config`] for an invalid base URL or header
    /// name, [`FintrackError::Network`] if the HTTP client fails to build.
    #[cfg(feature = "async")]
    #[inline]
    pub fn async_client(&self) -> Result<crate::client::ApiClient> {
        configure_builder!(self, crate::client::ApiClient::builder())
    }

    /// Builds a [`crate::client::BlockingApiClient`].
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::Config`] for an invalid base URL or header
    /// name, [`FintrackError::Network`] if the HTTP client fails to build.
    #[cfg(feature = "blocking")]
    #[inline]
    pub fn blocking_client(&self) -> Result<crate::client::BlockingApiClient> {
        configure_builder!(self, crate::client::BlockingApiClient::builder())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|&(key, value)| (key.to_owned(), value.to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = ClientConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.api_root, "/transactions/api");
        assert_eq!(config.csrf_header, "X-CSRF-Token");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.csrf_token.is_none());
        assert!(config.session_cookie.is_none());
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            (ENV_BASE_URL, "https://money.example"),
            (ENV_API_ROOT, "/api"),
            (ENV_CSRF_TOKEN, "tok"),
            (ENV_SESSION_COOKIE, "sessionid=abc"),
            (ENV_TIMEOUT_SECS, " 5 "),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://money.example");
        assert_eq!(config.api_root, "/api");
        assert_eq!(config.csrf_token.unwrap().expose_secret(), "tok");
        assert_eq!(
            config.session_cookie.unwrap().expose_secret(),
            "sessionid=abc"
        );
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    #[test]
    fn token_falls_back_to_cookie() {
        let config = ClientConfig::from_lookup(lookup_from(&[(
            ENV_SESSION_COOKIE,
            "sessionid=abc; csrftoken=from%20cookie",
        )]))
        .unwrap();
        assert_eq!(config.csrf_token.unwrap().expose_secret(), "from cookie");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config =
            ClientConfig::from_lookup(lookup_from(&[(ENV_BASE_URL, "  "), (ENV_CSRF_TOKEN, "")]))
                .unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.csrf_token.is_none());
    }

    #[test]
    fn bad_timeout_is_config_error() {
        let err =
            ClientConfig::from_lookup(lookup_from(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, FintrackError::Config(_)));
    }

    #[cfg(feature = "async")]
    #[test]
    fn builds_async_client() {
        let config = ClientConfig::default().base_url("http://127.0.0.1:9");
        let client = config.async_client().unwrap();
        assert_eq!(client.base_url().as_str(), "http://127.0.0.1:9/");
        assert_eq!(client.api_root(), "/transactions/api");
    }

    #[cfg(feature = "async")]
    #[test]
    fn invalid_base_url_is_rejected() {
        let config = ClientConfig::default().base_url("not a url");
        assert!(matches!(
            config.async_client().unwrap_err(),
            FintrackError::Config(_)
        ));
    }
}
