// src/fetch/http.rs
// =============================================================================
// The reqwest-backed Fetcher.
//
// Key functionality:
// - One Client for the whole run (connection pooling), cloned into every
//   domain task
// - Descriptive User-Agent header and a fixed per-request timeout
// - Transport failures are categorized (timeout, DNS, TLS...) so the logs
//   say something more useful than "error"
// =============================================================================

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use std::time::Duration;

use super::{FetchedPage, Fetcher};
use crate::error::{CrawlError, TransportKind};

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher that sends `user_agent` on every request and gives up
    /// after `timeout`
    pub fn new(user_agent: &str, timeout: Duration) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(user_agent)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| categorize_error(url, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| categorize_error(url, e))?;

        Ok(FetchedPage { status, body })
    }
}

// Maps a reqwest error onto our transport taxonomy
fn categorize_error(url: &str, error: reqwest::Error) -> CrawlError {
    let detail = error.to_string();

    let kind = if error.is_timeout() {
        TransportKind::Timeout
    } else if error.is_redirect() {
        TransportKind::TooManyRedirects
    } else if error.is_connect() {
        if detail.contains("dns") {
            TransportKind::Dns
        } else {
            TransportKind::Connect
        }
    } else if detail.contains("certificate") || detail.contains("ssl") {
        TransportKind::Tls
    } else {
        TransportKind::Other
    };

    CrawlError::Transport {
        url: url.to_string(),
        kind,
        detail,
    }
}
