// src/crawl/normalize.rs
// =============================================================================
// URL identity for the crawler.
//
// Two links that only differ in their query string or fragment point at the
// same product page as far as we are concerned:
//
//   https://x.com/p/1?ref=2#sec  ->  https://x.com/p/1
//
// `NormalizedUrl` is the key used by the frontier, the visited set and the
// product set, so they can never disagree about what "the same URL" means.
// =============================================================================

use std::fmt;
use url::Url;

use crate::error::CrawlError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// Parses an absolute URL and strips its query and fragment
    pub fn parse(input: &str) -> Result<Self, CrawlError> {
        let url = Url::parse(input).map_err(|e| CrawlError::InvalidUrl {
            input: input.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_url(url))
    }

    pub fn from_url(mut url: Url) -> Self {
        url.set_query(None);
        url.set_fragment(None);
        Self(url)
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Host without a leading "www.", the key used by the pattern table
    pub fn bare_host(&self) -> Option<&str> {
        bare_host(&self.0)
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

pub fn bare_host(url: &Url) -> Option<&str> {
    url.host_str()
        .map(|host| host.strip_prefix("www.").unwrap_or(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(input: &str) -> Result<String, CrawlError> {
        NormalizedUrl::parse(input).map(|url| url.to_string())
    }

    #[test]
    fn test_strips_query_and_fragment() {
        assert_eq!(
            normalize("https://x.com/p/1?ref=2#sec").unwrap(),
            "https://x.com/p/1"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let inputs = [
            "https://x.com/p/1?ref=2#sec",
            "https://shop.example/",
            "http://www.shop.example/products/widget-a#reviews",
            "https://shop.example:8443/a/b/?q",
        ];
        for input in inputs {
            let once = normalize(input).unwrap();
            let twice = normalize(&once).unwrap();
            assert_eq!(once, twice, "normalize not idempotent for {}", input);
        }
    }

    #[test]
    fn test_query_variants_are_equal() {
        let a = NormalizedUrl::parse("https://shop.example/products/a?color=red").unwrap();
        let b = NormalizedUrl::parse("https://shop.example/products/a#top").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_bare_host_strips_www() {
        let url = NormalizedUrl::parse("https://www.amazon.in/dp/B08XYZ1234").unwrap();
        assert_eq!(url.bare_host(), Some("amazon.in"));

        let url = NormalizedUrl::parse("https://shop.example/").unwrap();
        assert_eq!(url.bare_host(), Some("shop.example"));
    }

    #[test]
    fn test_relative_input_is_rejected() {
        assert!(matches!(
            NormalizedUrl::parse("/products/widget"),
            Err(CrawlError::InvalidUrl { .. })
        ));
    }
}
