//! Feed retrieval.
//!
//! [`FeedSource`] is the seam between the ingester and the network:
//! [`HttpSource`] performs one blocking HTTPS request, tests substitute an
//! in-memory source. There are no retries; a failed attempt is final.

use crate::config::FeedSectionConfig;
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::time::Duration;
use thiserror::Error;

/// Feed retrieval errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no feed URL configured")]
    NoUrl,

    #[error("`{0}` is not an http(s) URL")]
    Scheme(String),

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("request to `{url}` failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Something that can produce the raw text of a feed.
pub trait FeedSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Check that a feed URL parses and uses `http` or `https`.
///
/// # Examples
/// ```ignore
/// is_http_url("https://example.com/feed") -> true
/// is_http_url("ftp://example.com/feed")   -> false
/// is_http_url("invalid")                  -> false
/// ```
pub fn is_http_url(url_str: &str) -> bool {
    reqwest::Url::parse(url_str).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// Blocking HTTP client with a fixed timeout and bounded redirects.
///
/// The client is built on fetch, so setup problems degrade like any other
/// failed request.
pub struct HttpSource {
    timeout: Duration,
    max_redirects: usize,
    user_agent: String,
}

impl HttpSource {
    pub fn new(config: &FeedSectionConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout),
            max_redirects: config.max_redirects,
            user_agent: config.user_agent.clone(),
        }
    }

    fn client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .timeout(self.timeout)
            .redirect(Policy::limited(self.max_redirects))
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(FetchError::Client)
    }
}

impl FeedSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(FetchError::NoUrl);
        }
        if !is_http_url(url) {
            return Err(FetchError::Scheme(url.to_string()));
        }

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self.client()?.get(url).send().map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(transport)
    }
}
