//! Error types for category fetching and lot extraction.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ScrapeError {
    #[error("HTTP request failed for {url}: {reason}")]
    RequestFailed { url: String, reason: String },

    #[error("HTTP error {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("invalid CSS selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("no usable selectors in chain '{chain}'")]
    EmptySelectorChain { chain: String },

    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl ScrapeError {
    pub fn request_failed(url: &str, reason: impl ToString) -> Self {
        Self::RequestFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn http_status(status: u16, url: &str) -> Self {
        Self::HttpStatus {
            status,
            url: url.to_string(),
        }
    }

    /// Transport-level failures are worth retrying; configuration
    /// mistakes are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed { .. } | Self::EmptyBody { .. } => true,
            Self::HttpStatus { status, .. } => {
                matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
            }
            Self::InvalidSelector { .. }
            | Self::EmptySelectorChain { .. }
            | Self::InvalidUrl { .. } => false,
        }
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;
