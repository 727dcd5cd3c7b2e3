//! HTTP client for fetching source pages.
//!
//! Wraps `reqwest` with per-request timeouts, tracing and a browser-like
//! user agent. Redirects are followed.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use crate::error::HttpError;

/// Browser-like user agent; some vendor sites reject unknown agents.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// HTTP Client
// ============================================================================

/// HTTP client wrapper with tracing.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Fails if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, HttpError> {
        let inner = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { inner })
    }

    /// Parses and checks an absolute HTTP(S) URL.
    fn parse_url(url: &str) -> Result<Url, HttpError> {
        let parsed = Url::parse(url.trim()).map_err(|e| HttpError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" if parsed.host_str().is_some() => Ok(parsed),
            _ => Err(HttpError::InvalidUrl(format!("not an http(s) URL: {url}"))),
        }
    }

    /// Performs a HEAD request and returns the final status code.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn head_status(&self, url: &str, timeout: Duration) -> Result<u16, HttpError> {
        let parsed = Self::parse_url(url)?;
        debug!("HEAD request");

        let response = self.inner.head(parsed).timeout(timeout).send().await?;
        let status = response.status().as_u16();
        debug!(status, "Response received");
        Ok(status)
    }

    /// Performs a GET request and returns at most `max_chars` characters
    /// of the body.
    ///
    /// Statuses of 400 and above are [`HttpError::Status`].
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(
        &self,
        url: &str,
        timeout: Duration,
        max_chars: usize,
    ) -> Result<String, HttpError> {
        let parsed = Self::parse_url(url)?;
        debug!("GET request");

        let response = self.inner.get(parsed).timeout(timeout).send().await?;
        let status = response.status();
        debug!(status = %status, "Response received");

        if status.as_u16() >= 400 {
            return Err(HttpError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        Ok(truncate_chars(&body, max_chars).to_string())
    }

    /// Returns the inner reqwest client for advanced operations.
    pub fn inner(&self) -> &Client {
        &self.inner
    }
}

/// Returns the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
