//! HTTP fetcher shared by every strategy.
//!
//! Sends browser-like headers, follows redirects and enforces a per-request
//! timeout. There is no retry at this layer: a failed fetch fails the scrape.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, Url};

use crate::error::ScraperError;

/// Maximum number of redirects followed before giving up.
const MAX_REDIRECTS: usize = 10;

/// Headers a desktop Chrome sends on a top-level navigation.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "max-age=0"),
    ("upgrade-insecure-requests", "1"),
    (
        "sec-ch-ua",
        "\"Google Chrome\";v=\"124\", \"Not:A-Brand\";v=\"8\", \"Chromium\";v=\"124\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
];

/// A fetched response body with its final status and URL.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    pub body: String,
}

impl FetchedPage {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx page into [`ScraperError::UnexpectedStatus`].
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::UnexpectedStatus`] carrying `url` when the
    /// status is outside 200..300.
    pub fn require_success(self, url: &str) -> Result<Self, ScraperError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScraperError::UnexpectedStatus {
                status: self.status,
                url: url.to_string(),
            })
        }
    }
}

/// Browser-fingerprinted HTTP client. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds a fetcher with the given timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .default_headers(headers)
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client })
    }

    /// Issues a GET request and returns the status and body, whatever the status.
    ///
    /// `extra_headers` are added on top of the browser defaults.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::InvalidUrl`] — `url` is not an absolute URL.
    /// - [`ScraperError::Client`] — an extra header name or value is invalid.
    /// - [`ScraperError::Http`] — network, TLS, timeout or body decode failure.
    pub async fn fetch(
        &self,
        url: &str,
        extra_headers: &[(&str, &str)],
    ) -> Result<FetchedPage, ScraperError> {
        let target = Url::parse(url).map_err(|e| ScraperError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        let mut request = self.client.get(target);
        for &(name, value) in extra_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ScraperError::Client(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ScraperError::Client(format!("invalid header value: {e}")))?;
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        tracing::debug!(url, status, final_url = %final_url, bytes = body.len(), "fetched");

        Ok(FetchedPage {
            status,
            final_url,
            body,
        })
    }
}
