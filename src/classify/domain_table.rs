// src/classify/domain_table.rs
// =============================================================================
// Per-site product URL patterns.
//
// Each known store gets one regex that its product pages' paths match. A
// link can then be classified from its URL alone, without downloading it.
//
// Hosts are stored without a leading "www.", so "www.amazon.in" and
// "amazon.in" share an entry. Unknown hosts abstain: not a product, no error.
// =============================================================================

use regex::Regex;
use std::collections::HashMap;
use url::Url;

use super::Verdict;
use crate::crawl::bare_host;
use crate::error::CrawlError;

// host -> product path pattern
const BUILTIN_PATTERNS: &[(&str, &str)] = &[
    // /products/baybee-cradle-for-baby
    ("pyarababy.com", r"(?i)/products/[a-z0-9-]+"),
    // /foundation/orgatre/orgatre-mood-bliss-foundation/32280543/buy
    ("myntra.com", r"(?i)/[^/]+/[^/]+/[^/]+/\d+/buy"),
    // /momisy/momisy-regular-length-socks-pack-of-5/13196960/product-detail
    ("firstcry.com", r"/[^/]+/[^/]+/\d+/product-detail"),
    // /dp/B08XYZ1234
    ("amazon.in", r"/dp/[A-Z0-9]{10}"),
    // /p/itachi-blood-premium-glass-cover-for-apple-iphone-15-plus
    ("bewakoof.com", r"(?i)/p/[a-zA-Z0-9-]+(?:-for-)?[a-zA-Z0-9-]+"),
    ("thesouledstore.com", r"(?i)/product/[a-zA-Z0-9-]+(?:\?[a-zA-Z0-9=&]+)?"),
];

#[derive(Debug, Clone, Default)]
pub struct DomainPatternTable {
    patterns: HashMap<String, Regex>,
}

impl DomainPatternTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table of stores we know out of the box
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (host, pattern) in BUILTIN_PATTERNS {
            table
                .insert(host, pattern)
                .expect("built-in product patterns compile");
        }
        table
    }

    /// Adds or replaces the pattern for `host` ("www." is ignored)
    pub fn insert(&mut self, host: &str, pattern: &str) -> Result<(), CrawlError> {
        let host = host.trim().to_ascii_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host).to_string();

        let regex = Regex::new(pattern).map_err(|source| CrawlError::InvalidPattern {
            host: host.clone(),
            source,
        })?;

        self.patterns.insert(host, regex);
        Ok(())
    }

    /// Merges user-supplied patterns over the current ones
    pub fn extend<'a>(
        &mut self,
        entries: impl IntoIterator<Item = (&'a String, &'a String)>,
    ) -> Result<(), CrawlError> {
        for (host, pattern) in entries {
            self.insert(host, pattern)?;
        }
        Ok(())
    }

    pub fn pattern_for(&self, host: &str) -> Option<&Regex> {
        self.patterns.get(host)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn classify(&self, url: &Url) -> Verdict {
        let is_product = bare_host(url)
            .and_then(|host| self.pattern_for(host))
            .map(|pattern| pattern.is_match(url.path()))
            .unwrap_or(false);

        Verdict {
            is_product,
            score: if is_product { 1.0 } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(table: &DomainPatternTable, url: &str) -> bool {
        table.classify(&Url::parse(url).unwrap()).is_product
    }

    #[test]
    fn test_builtin_entries() {
        let table = DomainPatternTable::builtin();
        assert_eq!(table.len(), BUILTIN_PATTERNS.len());

        assert!(classify(&table, "https://www.amazon.in/dp/B08XYZ1234"));
        assert!(classify(&table, "https://www.pyarababy.com/products/baybee-cradle-for-baby"));
        assert!(classify(
            &table,
            "https://www.firstcry.com/momisy/momisy-socks/13196960/product-detail"
        ));
        assert!(classify(
            &table,
            "https://www.bewakoof.com/p/itachi-blood-premium-glass-cover-for-apple-iphone-15-plus"
        ));
        assert!(!classify(&table, "https://www.amazon.in/gp/help"));
        assert!(!classify(&table, "https://www.bewakoof.com/men-clothing"));
    }

    #[test]
    fn test_unknown_host_abstains() {
        let table = DomainPatternTable::builtin();
        let verdict = table.classify(&Url::parse("https://unknown.example/products/a").unwrap());
        assert!(!verdict.is_product);
        assert_eq!(verdict.score, 0.0);
    }

    #[test]
    fn test_only_path_is_matched() {
        let mut table = DomainPatternTable::empty();
        table.insert("shop.example", r"^/products/").unwrap();

        assert!(classify(&table, "https://shop.example/products/widget-a"));
        assert!(!classify(&table, "https://shop.example/search?next=/products/widget-a"));
    }

    #[test]
    fn test_www_prefix_is_ignored_on_both_sides() {
        let mut table = DomainPatternTable::empty();
        table.insert("www.Shop.Example", r"/item/").unwrap();

        assert!(table.pattern_for("shop.example").is_some());
        assert!(classify(&table, "https://www.shop.example/item/1"));
        assert!(classify(&table, "https://shop.example/item/1"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let mut table = DomainPatternTable::empty();
        let err = table.insert("shop.example", r"/products/(").unwrap_err();
        assert!(matches!(err, CrawlError::InvalidPattern { ref host, .. } if host == "shop.example"));
    }

    #[test]
    fn test_extend_overrides_builtin() {
        let mut table = DomainPatternTable::builtin();
        let overrides: HashMap<String, String> =
            [("amazon.in".to_string(), r"/gp/product/".to_string())].into();
        table.extend(&overrides).unwrap();

        assert!(classify(&table, "https://amazon.in/gp/product/B08XYZ1234"));
        assert!(!classify(&table, "https://amazon.in/dp/B08XYZ1234"));
    }
}
