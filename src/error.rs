// src/error.rs
// =============================================================================
// Error types for the crawl core.
//
// None of these are fatal to a run. The crawler turns each of them into a
// "skip this URL and carry on" decision; they exist so that the reason can
// be logged and tested precisely.
//
// The binary edges (main, config loading and validation, writing the
// report) use anyhow and attach context there.
// =============================================================================

use thiserror::Error;

/// Why a single fetch failed at the transport level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Timeout,
    TooManyRedirects,
    Dns,
    Connect,
    Tls,
    Other,
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            TransportKind::Timeout => "request timed out",
            TransportKind::TooManyRedirects => "too many redirects",
            TransportKind::Dns => "could not resolve hostname",
            TransportKind::Connect => "connection failed",
            TransportKind::Tls => "TLS certificate error",
            TransportKind::Other => "request failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Error)]
pub enum CrawlError {
    /// robots.txt could not be fetched or parsed; callers treat the site as deny-all
    #[error("robots.txt unavailable for {site}: {reason}")]
    PolitenessUnavailable { site: String, reason: String },

    /// The page answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    HttpStatus { url: String, status: u16 },

    /// The request never produced a response
    #[error("{kind} fetching {url}: {detail}")]
    Transport {
        url: String,
        kind: TransportKind,
        detail: String,
    },

    #[error("invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("invalid product pattern for {host}: {source}")]
    InvalidPattern {
        host: String,
        #[source]
        source: regex::Error,
    },
}
