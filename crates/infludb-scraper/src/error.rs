use thiserror::Error;

use infludb_core::ParseError;

/// Why a follower count could not be extracted.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("profile not found: {reference}")]
    NotFound { reference: String },

    #[error("rate limited by {service}: {detail}")]
    RateLimited { service: String, detail: String },

    #[error("could not locate follower count: {detail}")]
    ParseFailure { detail: String },

    #[error("timed out loading {url}")]
    Timeout { url: String },

    #[error("navigation to {url} failed: {detail}")]
    Navigation { url: String, detail: String },
}

/// Coarse classification of an [`ExtractionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    NotFound,
    RateLimited,
    ParseFailure,
    Timeout,
    Navigation,
}

impl ExtractionErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionErrorKind::NotFound => "not_found",
            ExtractionErrorKind::RateLimited => "rate_limited",
            ExtractionErrorKind::ParseFailure => "parse_failure",
            ExtractionErrorKind::Timeout => "timeout",
            ExtractionErrorKind::Navigation => "navigation",
        }
    }
}

impl ExtractionError {
    #[must_use]
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            ExtractionError::NotFound { .. } => ExtractionErrorKind::NotFound,
            ExtractionError::RateLimited { .. } => ExtractionErrorKind::RateLimited,
            ExtractionError::ParseFailure { .. } => ExtractionErrorKind::ParseFailure,
            ExtractionError::Timeout { .. } => ExtractionErrorKind::Timeout,
            ExtractionError::Navigation { .. } => ExtractionErrorKind::Navigation,
        }
    }

    /// Navigation and timeout failures are worth another fresh attempt.
    #[must_use]
    pub fn is_transient_load_failure(&self) -> bool {
        matches!(
            self,
            ExtractionError::Timeout { .. } | ExtractionError::Navigation { .. }
        )
    }

    pub(crate) fn parse_failure(detail: impl Into<String>) -> Self {
        ExtractionError::ParseFailure {
            detail: detail.into(),
        }
    }

    /// Map a transport error for `url` onto the taxonomy.
    pub(crate) fn from_http(url: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            ExtractionError::Timeout {
                url: url.to_string(),
            }
        } else {
            ExtractionError::Navigation {
                url: url.to_string(),
                detail: err.to_string(),
            }
        }
    }
}

impl From<ParseError> for ExtractionError {
    fn from(err: ParseError) -> Self {
        ExtractionError::ParseFailure {
            detail: err.to_string(),
        }
    }
}
