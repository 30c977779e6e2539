//! HTTP client for the finance tracker API.
//!
//! Provides both async and blocking client variants behind feature flags.
//! Every call carries the JSON content type and, when the credential
//! provider has one, the CSRF token header. Callers may override any
//! default header.

use core::time::Duration;
use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FintrackError, Result};

/// Base URL of a locally running backend.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Mount point of the REST API under the base URL.
pub const DEFAULT_API_ROOT: &str = "/transactions/api";

/// Header the CSRF token is sent in.
pub const DEFAULT_CSRF_HEADER: &str = "X-CSRF-Token";

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP verb of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Read.
    #[default]
    Get,
    /// Create.
    Post,
    /// Replace.
    Put,
    /// Remove.
    Delete,
}

impl Method {
    /// Returns the upper-case verb.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Whether a failed request with this verb may be sent again.
    #[inline]
    #[must_use]
    pub const fn is_retry_safe(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl core::fmt::Display for Method {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(any(feature = "async", feature = "blocking"))]
impl From<Method> for reqwest::Method {
    #[inline]
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

/// Verb, extra headers and body of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// HTTP verb.
    pub method: Method,
    /// Caller headers; they replace defaults with the same name.
    pub headers: BTreeMap<String, String>,
    /// Serialised JSON payload.
    pub body: Option<String>,
}

impl RequestOptions {
    /// Creates options for `method` with no headers and no body.
    #[inline]
    #[must_use]
    pub const fn new(method: Method) -> Self {
        Self {
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Adds a caller header.
    #[inline]
    #[must_use]
    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        drop(self.headers.insert(name.into(), value.into()));
        self
    }

    /// Serialises `body` as the JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`FintrackError::Serialization`] if `body` cannot be encoded.
    #[inline]
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_string(body)?);
        Ok(self)
    }
}

/// Exponential backoff for idempotent reads.
///
/// Only `GET` requests are retried, and only after transport failures,
/// `429` or a 5xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each following one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[inline]
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (zero-based).
    #[inline]
    #[must_use]
    pub const fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2_u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    #[inline]
    fn default() -> Self {
        Self::new(2, Duration::from_millis(200))
    }
}

/// Merges default headers with caller headers.
///
/// A caller header replaces every default whose name matches it
/// case-insensitively.
#[must_use]
pub fn merge_headers(
    defaults: Vec<(String, String)>,
    overrides: &BTreeMap<String, String>,
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .into_iter()
        .filter(|pair| {
            !overrides
                .keys()
                .any(|name| name.eq_ignore_ascii_case(&pair.0))
        })
        .collect();
    merged.extend(
        overrides
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    merged
}

/// Parses a success body; an empty body reads as JSON `null`.
fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Null).map_err(FintrackError::from)
    } else {
        serde_json::from_str(body).map_err(FintrackError::from)
    }
}

/// Normalises an API root to `/segment` form without a trailing slash.
fn normalize_root(root: &str) -> String {
    let trimmed = root.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

/// Generates an API client (async or blocking) with builder, methods, and tests.
#[cfg(any(feature = "async", feature = "blocking"))]
macro_rules! define_client {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_type: $http_type:ty,
        response_type: $resp_type:ty,
        sleep: $sleep:path,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
        $(send_bound: $send_bound:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder {
            /// Base URL override.
            base_url: Option<String>,
            /// API root override.
            api_root: Option<String>,
            /// CSRF token source.
            credentials: Option<Arc<dyn CredentialProvider>>,
            /// CSRF header name override.
            csrf_header: Option<String>,
            /// Raw `Cookie` header sent with every request.
            session_cookie: Option<SecretString>,
            /// Per-request timeout override.
            timeout: Option<Duration>,
            /// Retry policy override.
            retry: Option<RetryPolicy>,
        }

        impl $builder {
            /// Overrides the base URL (useful for testing with a mock server).
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Overrides the path the API is mounted under.
            #[inline]
            #[must_use]
            pub fn api_root<T: Into<String>>(mut self, root: T) -> Self {
                self.api_root = Some(root.into());
                self
            }

            /// Sets the CSRF token source.
            #[inline]
            #[must_use]
            pub fn credentials<C: CredentialProvider + 'static>(mut self, provider: C) -> Self {
                self.credentials = Some(Arc::new(provider));
                self
            }

            /// Sets a CSRF token source shared with other clients.
            #[inline]
            #[must_use]
            pub fn shared_credentials(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
                self.credentials = Some(provider);
                self
            }

            /// Overrides the CSRF header name.
            #[inline]
            #[must_use]
            pub fn csrf_header<T: Into<String>>(mut self, name: T) -> Self {
                self.csrf_header = Some(name.into());
                self
            }

            /// Sends a raw `Cookie` header, e.g. `sessionid=...; csrftoken=...`.
            #[inline]
            #[must_use]
            pub fn session_cookie<T: Into<String>>(mut self, cookie: T) -> Self {
                self.session_cookie = Some(SecretString::from(cookie.into()));
                self
            }

            /// Overrides the per-request timeout.
            #[inline]
            #[must_use]
            pub const fn timeout(mut self, timeout: Duration) -> Self {
                self.timeout = Some(timeout);
                self
            }

            /// Overrides the retry policy for `GET` requests.
            #[inline]
            #[must_use]
            pub const fn retry(mut self, policy: RetryPolicy) -> Self {
                self.retry = Some(policy);
                self
            }

            /// Builds the client.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Config`] if the base URL or CSRF
            /// header name is invalid.
            /// Returns [`FintrackError::Network`] if the HTTP client fails to build.
            #[inline]
            #[tracing::instrument(skip_all)]
            pub fn build(self) -> Result<$client> {
                let raw_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
                let base_url = Url::parse(raw_url).map_err(|err| {
                    FintrackError::Config(format!("invalid base URL `{raw_url}`: {err}"))
                })?;
                let header_name = self.csrf_header.as_deref().unwrap_or(DEFAULT_CSRF_HEADER);
                let csrf_header = HeaderName::from_bytes(header_name.as_bytes()).map_err(|err| {
                    FintrackError::Config(format!("invalid CSRF header `{header_name}`: {err}"))
                })?;
                let api_root = normalize_root(self.api_root.as_deref().unwrap_or(DEFAULT_API_ROOT));
                let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
                tracing::debug!(base_url = %base_url, api_root = %api_root, "building client");
                let http = <$http_type>::builder()
                    .cookie_store(true)
                    .timeout(timeout)
                    .build()?;

                Ok($client {
                    http,
                    base_url,
                    api_root,
                    credentials: self.credentials.unwrap_or_else(|| Arc::new(NoCredentials)),
                    csrf_header,
                    session_cookie: self.session_cookie,
                    retry: self.retry.unwrap_or_default(),
                })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client {
            /// Underlying HTTP client.
            http: $http_type,
            /// Backend origin.
            base_url: Url,
            /// API mount point, e.g. `/transactions/api`.
            api_root: String,
            /// CSRF token source.
            credentials: Arc<dyn CredentialProvider>,
            /// Header the CSRF token is written to.
            csrf_header: HeaderName,
            /// Raw `Cookie` header, if configured.
            session_cookie: Option<SecretString>,
            /// Retry policy for `GET` requests.
            retry: RetryPolicy,
        }

        impl $client {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder {
                $builder {
                    base_url: None,
                    api_root: None,
                    credentials: None,
                    csrf_header: None,
                    session_cookie: None,
                    timeout: None,
                    retry: None,
                }
            }

            /// Returns the backend origin.
            #[inline]
            #[must_use]
            pub const fn base_url(&self) -> &Url {
                &self.base_url
            }

            /// Returns the API mount point.
            #[inline]
            #[must_use]
            pub fn api_root(&self) -> &str {
                &self.api_root
            }

            /// Returns the retry policy.
            #[inline]
            #[must_use]
            pub const fn retry_policy(&self) -> RetryPolicy {
                self.retry
            }

            /// Resolves a path relative to the API root.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Config`] if the joined URL is invalid.
            #[inline]
            pub fn url_for(&self, path: &str) -> Result<Url> {
                self.absolute_url(&format!("{}{path}", self.api_root))
            }

            /// Resolves a path relative to the backend origin.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Config`] if the joined URL is invalid.
            #[inline]
            pub fn absolute_url(&self, path: &str) -> Result<Url> {
                self.base_url
                    .join(path)
                    .map_err(|err| FintrackError::Config(format!("invalid path `{path}`: {err}")))
            }

            /// Sends a request to a path under the API root and
            /// deserializes the JSON response.
            ///
            /// # Errors
            ///
            /// Returns [`FintrackError::Network`] if the request never
            /// completes, [`FintrackError::Http`] for a non-2xx status, or
            /// [`FintrackError::Serialization`] if the body does not match `T`.
            #[inline]
            #[tracing::instrument(skip_all, fields(method = %options.method, path = %path))]
            pub $($async_kw)? fn request<T: DeserializeOwned>(
                &self,
                path: &str,
                options: RequestOptions,
            ) -> Result<T> {
                let url = self.url_for(path)?;
                self.execute(url, &options) $( .$await_ext )?
            }

            /// Sends a request to a path outside the API root.
            ///
            /// # Errors
            ///
            /// Same as [`Self::request`].
            #[inline]
            #[tracing::instrument(skip_all, fields(method = %options.method, path = %path))]
            pub $($async_kw)? fn request_absolute<T: DeserializeOwned>(
                &self,
                path: &str,
                options: RequestOptions,
            ) -> Result<T> {
                let url = self.absolute_url(path)?;
                self.execute(url, &options) $( .$await_ext )?
            }

            /// Sends a JSON `POST` to a path outside the API root.
            ///
            /// # Errors
            ///
            /// Same as [`Self::request`].
            #[inline]
            pub $($async_kw)? fn post_absolute<
                B: Serialize $(+ $send_bound)?,
                T: DeserializeOwned,
            >(
                &self,
                path: &str,
                body: &B,
            ) -> Result<T> {
                let options = RequestOptions::new(Method::Post).json(body)?;
                self.request_absolute(path, options) $( .$await_ext )?
            }

            /// Headers every request starts from.
            fn default_headers(&self) -> Vec<(String, String)> {
                let mut headers = vec![(
                    CONTENT_TYPE.as_str().to_owned(),
                    "application/json".to_owned(),
                )];
                if let Some(token) = self.credentials.csrf_token() {
                    headers.push((
                        self.csrf_header.as_str().to_owned(),
                        token.expose_secret().to_owned(),
                    ));
                }
                if let Some(cookie) = self.session_cookie.as_ref() {
                    headers.push((COOKIE.as_str().to_owned(), cookie.expose_secret().to_owned()));
                }
                headers
            }

            /// Sends the request, retrying retry-safe verbs per the policy.
            $($async_kw)? fn execute<T: DeserializeOwned>(
                &self,
                url: Url,
                options: &RequestOptions,
            ) -> Result<T> {
                let mut attempt: u32 = 0;
                loop {
                    match self.send_once(&url, options) $( .$await_ext )? {
                        Ok(value) => return Ok(value),
                        Err(err)
                            if options.method.is_retry_safe()
                                && attempt < self.retry.max_retries
                                && err.is_retryable() =>
                        {
                            let delay = self.retry.delay_for(attempt);
                            tracing::warn!(
                                attempt = attempt + 1,
                                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                                error = %err,
                                "retrying request"
                            );
                            $sleep(delay) $( .$await_ext )?;
                            attempt += 1;
                        }
                        Err(err) => return Err(err),
                    }
                }
            }

            /// Sends the request once and interprets the response.
            $($async_kw)? fn send_once<T: DeserializeOwned>(
                &self,
                url: &Url,
                options: &RequestOptions,
            ) -> Result<T> {
                tracing::trace!(url = %url, "sending request");
                let mut request = self
                    .http
                    .request(reqwest::Method::from(options.method), url.clone());
                for (name, value) in merge_headers(self.default_headers(), &options.headers) {
                    request = request.header(name, value);
                }
                if let Some(body) = options.body.as_ref() {
                    tracing::trace!(body_len = body.len(), "attaching body");
                    request = request.body(body.clone());
                }
                let response: $resp_type = request.send() $( .$await_ext )? ?;

                let status = response.status();
                tracing::debug!(status = %status, "received response");
                if status.is_success() {
                    let body = response.text() $( .$await_ext )? ?;
                    tracing::trace!(body_len = body.len(), "parsing response body");
                    parse_body(&body)
                } else {
                    let message = response
                        .text()
                        $( .$await_ext )?
                        .unwrap_or_else(|_| "unknown error".to_owned());
                    tracing::debug!(status = status.as_u16(), message = %message, "API error");
                    Err(FintrackError::Http {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        }

    };
}

#[cfg(feature = "async")]
mod async_client {
    //! Async HTTP client for the finance tracker API.

    use core::time::Duration;
    use std::sync::Arc;

    use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderName};
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        DEFAULT_API_ROOT, DEFAULT_BASE_URL, DEFAULT_CSRF_HEADER, DEFAULT_TIMEOUT, Method,
        RequestOptions, RetryPolicy, merge_headers, normalize_root, parse_body,
    };
    use crate::credentials::{CredentialProvider, NoCredentials};
    use crate::error::{FintrackError, Result};

    define_client! {
        client_name: ApiClient,
        builder_name: ApiClientBuilder,
        http_type: reqwest::Client,
        response_type: reqwest::Response,
        sleep: tokio::time::sleep,
        client_doc: "Async client for the finance tracker API.\n\nUse [`ApiClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing an [`ApiClient`].",
        async_kw: async,
        await_kw: await,
        send_bound: Sync,
    }
}

#[cfg(feature = "blocking")]
mod blocking_client {
    //! Blocking (synchronous) HTTP client for the finance tracker API.

    use core::time::Duration;
    use std::sync::Arc;

    use reqwest::header::{CONTENT_TYPE, COOKIE, HeaderName};
    use secrecy::{ExposeSecret as _, SecretString};
    use serde::Serialize;
    use serde::de::DeserializeOwned;
    use url::Url;

    use super::{
        DEFAULT_API_ROOT, DEFAULT_BASE_URL, DEFAULT_CSRF_HEADER, DEFAULT_TIMEOUT, Method,
        RequestOptions, RetryPolicy, merge_headers, normalize_root, parse_body,
    };
    use crate::credentials::{CredentialProvider, NoCredentials};
    use crate::error::{FintrackError, Result};

    define_client! {
        client_name: BlockingApiClient,
        builder_name: BlockingApiClientBuilder,
        http_type: reqwest::blocking::Client,
        response_type: reqwest::blocking::Response,
        sleep: std::thread::sleep,
        client_doc: "Blocking (synchronous) client for the finance tracker API.\n\nUse [`BlockingApiClient::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`BlockingApiClient`].",
    }
}

#[cfg(feature = "async")]
pub use async_client::{ApiClient, ApiClientBuilder};
#[cfg(feature = "blocking")]
pub use blocking_client::{BlockingApiClient, BlockingApiClientBuilder};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles() {
        let policy = RetryPolicy::new(3, Duration::from_millis(200));
        assert_eq!(policy.delay_for(0), Duration::from_millis(200));
        assert_eq!(policy.delay_for(1), Duration::from_millis(400));
        assert_eq!(policy.delay_for(2), Duration::from_millis(800));
        assert_eq!(RetryPolicy::none().max_retries, 0);
    }

    #[test]
    fn only_get_is_retry_safe() {
        assert!(Method::Get.is_retry_safe());
        assert!(!Method::Post.is_retry_safe());
        assert!(!Method::Put.is_retry_safe());
        assert!(!Method::Delete.is_retry_safe());
    }

    #[test]
    fn caller_headers_win_case_insensitively() {
        let defaults = vec![
            ("Content-Type".to_owned(), "application/json".to_owned()),
            ("X-CSRF-Token".to_owned(), "cookie-token".to_owned()),
        ];
        let options = RequestOptions::new(Method::Post)
            .header("x-csrf-token", "override")
            .header("X-Trace", "1");
        let merged = merge_headers(defaults, &options.headers);
        assert_eq!(
            merged,
            vec![
                ("Content-Type".to_owned(), "application/json".to_owned()),
                ("X-Trace".to_owned(), "1".to_owned()),
                ("x-csrf-token".to_owned(), "override".to_owned()),
            ]
        );
    }

    #[test]
    fn options_json_serialises_body() {
        let options = RequestOptions::new(Method::Post)
            .json(&serde_json::json!({"message": "hi"}))
            .unwrap();
        assert_eq!(options.body.as_deref(), Some(r#"{"message":"hi"}"#));
        assert_eq!(RequestOptions::default().method, Method::Get);
    }

    #[test]
    fn empty_body_parses_as_null() {
        parse_body::<()>("").unwrap();
        assert_eq!(parse_body::<Option<u32>>("  ").unwrap(), None);
        assert_eq!(parse_body::<u32>("7").unwrap(), 7);
    }

    #[test]
    fn api_root_is_normalised() {
        assert_eq!(normalize_root("/transactions/api/"), "/transactions/api");
        assert_eq!(normalize_root("api"), "/api");
        assert_eq!(normalize_root(""), "");
    }
}
