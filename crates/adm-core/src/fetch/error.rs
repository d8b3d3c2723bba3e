//! Fetch error type for per-URL failure reporting.

use std::fmt;

/// Error returned by a single GET (curl failure or HTTP error).
#[derive(Debug)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, bad URL, etc.).
    Curl(curl::Error),
    /// HTTP response had a non-2xx status.
    Http(u32),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Curl(e) => write!(f, "{}", e),
            FetchError::Http(code) => write!(f, "HTTP {}", code),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Curl(e) => Some(e),
            FetchError::Http(_) => None,
        }
    }
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Curl(e)
    }
}

impl FetchError {
    /// True when the request timed out (connect or total).
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Curl(e) if e.is_operation_timedout())
    }
}
