//! Outbound fetch of one URL into memory.
//!
//! One attempt per URL, no retry. Uses the curl crate (libcurl); runs in the
//! current thread, so call from `spawn_blocking` if used from async code.

mod error;

pub use error::FetchError;

use std::time::Duration;

use crate::config::FetchConfig;

/// Fetches the body of a URL. Abstracted so the builder can be driven without
/// a network in tests.
pub trait Fetch: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// libcurl-backed GET with connect and total timeouts.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    timeout: Duration,
    connect_timeout: Duration,
    max_redirections: u32,
}

impl CurlFetcher {
    pub fn new(cfg: &FetchConfig) -> Self {
        Self {
            timeout: cfg.timeout(),
            connect_timeout: cfg.connect_timeout(),
            max_redirections: cfg.max_redirections,
        }
    }
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self::new(&FetchConfig::default())
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let mut body = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Http(code));
        }
        Ok(body)
    }
}
