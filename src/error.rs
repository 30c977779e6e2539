//! Error types for the finance tracker client library.

/// All errors that can occur when using the finance tracker client.
#[derive(Debug, thiserror::Error)]
pub enum FintrackError {
    /// The request never reached the server, was aborted, or timed out.
    #[cfg(any(feature = "async", feature = "blocking"))]
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("HTTP error {status}: {message}")]
    Http {
        /// Numeric HTTP status code.
        status: u16,
        /// Response body, or a placeholder when it could not be read.
        message: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An expected UI region is not present on the surface.
    #[error("region `{region}` is not present")]
    DomMissing {
        /// Identifier of the missing region.
        region: &'static str,
    },

    /// Client or environment configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The chart backend failed to construct a chart.
    #[error("chart error: {0}")]
    Chart(String),
}

impl FintrackError {
    /// Returns the HTTP status if the server answered with a failure.
    #[inline]
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match *self {
            Self::Http { status, .. } => Some(status),
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Network(_) => None,
            Self::Serialization(_) | Self::DomMissing { .. } | Self::Config(_) | Self::Chart(_) => {
                None
            }
        }
    }

    /// Returns `true` for failures worth retrying on an idempotent request:
    /// transport errors, `429 Too Many Requests` and any 5xx status.
    #[inline]
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match *self {
            #[cfg(any(feature = "async", feature = "blocking"))]
            Self::Network(_) => true,
            Self::Http { status, .. } => status == 429 || status >= 500,
            Self::Serialization(_) | Self::DomMissing { .. } | Self::Config(_) | Self::Chart(_) => {
                false
            }
        }
    }
}

/// Convenience alias for `Result<T, FintrackError>`.
pub type Result<T> = core::result::Result<T, FintrackError>;
