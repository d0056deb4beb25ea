// src/fetch/mod.rs
// =============================================================================
// This module is the crawler's only door to the network.
//
// Submodules:
// - http: the real implementation, backed by a shared reqwest Client
//
// The rest of the crawler talks to the `Fetcher` trait, never to reqwest
// directly. That keeps the crawl loop and the robots.txt cache testable with
// an in-memory fetcher (see `testing` below).
// =============================================================================

mod http;

pub use http::HttpFetcher;

use async_trait::async_trait;

use crate::error::CrawlError;

/// A raw HTTP answer: status code plus the decoded body
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl FetchedPage {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch capability used by the crawler
///
/// Implementations return `Ok` for every response that arrived, whatever its
/// status. Only transport failures (timeouts, DNS, TLS...) are `Err`. Callers
/// decide what a non-2xx status means for them: robots.txt and pages treat
/// them differently.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError>;
}

#[cfg(test)]
pub mod testing {
    //! In-memory fetcher for crawl tests.

    use super::*;
    use crate::error::TransportKind;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct StaticFetcher {
        responses: HashMap<String, Result<(u16, String), TransportKind>>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.responses
                .insert(url.to_string(), Ok((200, body.to_string())));
            self
        }

        pub fn status(mut self, url: &str, status: u16) -> Self {
            self.responses
                .insert(url.to_string(), Ok((status, String::new())));
            self
        }

        pub fn failing(mut self, url: &str, kind: TransportKind) -> Self {
            self.responses.insert(url.to_string(), Err(kind));
            self
        }

        /// Every URL requested so far, in request order
        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        /// Requests excluding robots.txt lookups
        pub fn page_requests(&self) -> Vec<String> {
            self.requests()
                .into_iter()
                .filter(|url| !url.ends_with("/robots.txt"))
                .collect()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch(&self, url: &str) -> Result<FetchedPage, CrawlError> {
            self.requests.lock().unwrap().push(url.to_string());

            match self.responses.get(url) {
                Some(Ok((status, body))) => Ok(FetchedPage {
                    status: *status,
                    body: body.clone(),
                }),
                Some(Err(kind)) => Err(CrawlError::Transport {
                    url: url.to_string(),
                    kind: *kind,
                    detail: "simulated".to_string(),
                }),
                None => Ok(FetchedPage {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }
}
