//! CSRF token lookup.
//!
//! The backend protects unsafe methods with a CSRF token that the browser
//! keeps in a cookie. A [`CredentialProvider`] hands the current token to
//! the HTTP client, which writes it into the CSRF header of every request.

use percent_encoding::percent_decode_str;
use secrecy::{ExposeSecret as _, SecretString};

/// Cookie name the backend stores its CSRF token under.
pub const DEFAULT_CSRF_COOKIE: &str = "csrftoken";

/// Source of the CSRF token attached to outgoing requests.
pub trait CredentialProvider: core::fmt::Debug + Send + Sync {
    /// Returns the current token, or `None` when there is none.
    fn csrf_token(&self) -> Option<SecretString>;
}

/// Reads the token out of a raw `Cookie` header string.
///
/// # Examples
///
/// ```
/// use fintrack_rs::credentials::{CookieCredentials, CredentialProvider};
/// use secrecy::ExposeSecret;
///
/// let creds = CookieCredentials::new("theme=dark; csrftoken=abc%3D%3D");
/// let token = creds.csrf_token().unwrap();
/// assert_eq!(token.expose_secret(), "abc==");
/// ```
#[derive(Debug)]
pub struct CookieCredentials {
    /// Raw cookie string, `name=value` pairs joined by `;`.
    cookies: SecretString,
    /// Name of the cookie holding the token.
    name: String,
}

impl CookieCredentials {
    /// Creates a provider looking up [`DEFAULT_CSRF_COOKIE`].
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(cookies: T) -> Self {
        Self::with_name(cookies, DEFAULT_CSRF_COOKIE)
    }

    /// Creates a provider looking up the cookie called `name`.
    #[inline]
    #[must_use]
    pub fn with_name<T: Into<String>, N: Into<String>>(cookies: T, name: N) -> Self {
        Self {
            cookies: SecretString::from(cookies.into()),
            name: name.into(),
        }
    }
}

impl CredentialProvider for CookieCredentials {
    #[inline]
    fn csrf_token(&self) -> Option<SecretString> {
        cookie_value(self.cookies.expose_secret(), &self.name)
            .map(SecretString::from)
    }
}

/// Returns the percent-decoded value of the first cookie called `name`.
///
/// Each pair is trimmed, then must start with exactly `name=`; a space
/// before the `=` does not match. A `+` is kept as-is, not turned into a
/// space.
#[must_use]
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    if cookies.is_empty() {
        return None;
    }
    cookies.split(';').find_map(|pair| {
        let value = pair.trim().strip_prefix(name)?.strip_prefix('=')?;
        Some(percent_decode_str(value).decode_utf8_lossy().into_owned())
    })
}

/// A fixed token, for scripts and tests.
#[derive(Debug)]
pub struct StaticCredentials {
    /// The token.
    token: SecretString,
}

impl StaticCredentials {
    /// Wraps `token`.
    #[inline]
    #[must_use]
    pub fn new<T: Into<String>>(token: T) -> Self {
        Self {
            token: SecretString::from(token.into()),
        }
    }
}

impl CredentialProvider for StaticCredentials {
    #[inline]
    fn csrf_token(&self) -> Option<SecretString> {
        Some(SecretString::from(self.token.expose_secret().to_owned()))
    }
}

/// Provider that never has a token; the CSRF header is then omitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    #[inline]
    fn csrf_token(&self) -> Option<SecretString> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exposed(provider: &dyn CredentialProvider) -> Option<String> {
        provider
            .csrf_token()
            .map(|token| token.expose_secret().to_owned())
    }

    #[test]
    fn finds_token_among_other_cookies() {
        let creds = CookieCredentials::new("sessionid=xyz; csrftoken=abc123; theme=dark");
        assert_eq!(exposed(&creds).as_deref(), Some("abc123"));
    }

    #[test]
    fn empty_cookie_string_yields_none() {
        assert_eq!(exposed(&CookieCredentials::new("")), None);
    }

    #[test]
    fn missing_cookie_yields_none() {
        assert_eq!(exposed(&CookieCredentials::new("sessionid=xyz")), None);
    }

    #[test]
    fn name_must_match_exactly() {
        let creds = CookieCredentials::new("xcsrftoken=wrong; csrftokens=wrong");
        assert_eq!(exposed(&creds), None);
    }

    #[test]
    fn space_before_equals_does_not_match() {
        assert_eq!(cookie_value("csrftoken =abc", "csrftoken"), None);
        assert_eq!(
            cookie_value("csrftoken =abc;  csrftoken=real", "csrftoken").as_deref(),
            Some("real")
        );
    }

    #[test]
    fn value_is_percent_decoded_but_plus_is_kept() {
        assert_eq!(
            cookie_value("csrftoken=a%20b+c", "csrftoken").as_deref(),
            Some("a b+c")
        );
    }

    #[test]
    fn first_match_wins() {
        assert_eq!(
            cookie_value("csrftoken=first; csrftoken=second", "csrftoken").as_deref(),
            Some("first")
        );
    }

    #[test]
    fn custom_cookie_name() {
        let creds = CookieCredentials::with_name("XSRF-TOKEN=t0k", "XSRF-TOKEN");
        assert_eq!(exposed(&creds).as_deref(), Some("t0k"));
    }

    #[test]
    fn value_may_contain_equals() {
        assert_eq!(cookie_value("csrftoken=a=b", "csrftoken").as_deref(), Some("a=b"));
    }

    #[test]
    fn static_and_none_providers() {
        assert_eq!(exposed(&StaticCredentials::new("fixed")).as_deref(), Some("fixed"));
        assert_eq!(exposed(&NoCredentials), None);
    }

    #[test]
    fn debug_does_not_leak_token() {
        let creds = StaticCredentials::new("super-secret");
        assert!(!format!("{creds:?}").contains("super-secret"));
    }
}
