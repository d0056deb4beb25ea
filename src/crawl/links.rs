// src/crawl/links.rs
// =============================================================================
// This module extracts links from HTML pages.
//
// We use the `scraper` crate to find every <a href> in the document, and the
// `url` crate to:
// - Resolve relative links against the page they were found on
// - Drop query strings and fragments (see normalize.rs)
//
// No same-site restriction happens here. Cross-domain links come back like
// any other; whether to follow them is the crawl loop's decision.
//
// Each Link also carries the absolute URL as written, query string and all.
// The heuristic classifier scores that one ("/item?product_id=42" matters).
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::normalize::NormalizedUrl;

/// A link found on a page
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    /// Identity used for dedup, fetching and the report
    pub url: NormalizedUrl,
    /// The resolved URL before normalization
    pub raw: Url,
}

// Extracts all followable links from a parsed document
//
// Parameters:
//   document: the parsed page
//   page_url: the URL the page was fetched from (base for relative links)
//
// Returns: links in document order, without duplicates. When two hrefs
// normalize to the same URL, the first one's raw form is kept.
//
// Example:
//   page_url = "https://shop.example/catalog/"
//   <a href="../products/a?ref=nav">  ->  "https://shop.example/products/a"
pub fn extract_links(document: &Html, page_url: &Url) -> Vec<Link> {
    let selector = Selector::parse("a[href]").expect("static selector");

    // Normalized URLs already returned, for dedup
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        // The selector guarantees href exists, but attr() still returns Option
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(link) = resolve_link(page_url, href) {
            // insert() returns false for a URL we've already seen
            if seen.insert(link.url.clone()) {
                links.push(link);
            }
        }
    }

    links
}

// Resolves an href (possibly relative) to a normalized absolute URL
//
// Anything that doesn't end up as http(s) is not a page we can crawl:
//   "#reviews"             -> None
//   "mailto:a@b.com"       -> None
//   "javascript:void(0)"   -> None
fn resolve_link(base: &Url, href: &str) -> Option<Link> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    // join() handles "/a", "../a", "a" and absolute URLs alike
    let absolute = base.join(href).ok()?;
    if !is_crawlable(&absolute) {
        return None;
    }

    Some(Link {
        url: NormalizedUrl::from_url(absolute.clone()),
        raw: absolute,
    })
}

fn is_crawlable(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https") && url.host_str().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links_of(html: &str, page: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        let base = Url::parse(page).unwrap();
        extract_links(&document, &base)
            .into_iter()
            .map(|link| link.url.to_string())
            .collect()
    }

    #[test]
    fn test_resolve_relative_link() {
        let links = links_of(r#"<a href="/docs">Docs</a>"#, "https://example.com/page");
        assert_eq!(links, vec!["https://example.com/docs"]);
    }

    #[test]
    fn test_links_are_normalized() {
        let links = links_of(
            r#"<a href="../products/a?ref=nav#top">A</a>"#,
            "https://shop.example/catalog/shoes/",
        );
        assert_eq!(links, vec!["https://shop.example/catalog/products/a"]);
    }

    #[test]
    fn test_cross_domain_links_are_kept() {
        let links = links_of(
            r#"<a href="https://other.example/products/x">X</a>"#,
            "https://shop.example/",
        );
        assert_eq!(links, vec!["https://other.example/products/x"]);
    }

    #[test]
    fn test_skip_unresolvable_hrefs() {
        let html = r##"
            <a href="mailto:test@example.com">Email</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="#section">Jump</a>
            <a>No href</a>
            <a href="">Empty</a>
        "##;
        assert!(links_of(html, "https://shop.example/").is_empty());
    }

    #[test]
    fn test_raw_url_keeps_query() {
        let document = Html::parse_document(
            r#"<a href="/item?product_id=42#specs">A</a> <a href="/item?product_id=43">B</a>"#,
        );
        let base = Url::parse("https://shop.example/").unwrap();
        let links = extract_links(&document, &base);

        // Both hrefs are the same page; the first raw form survives
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url.as_str(), "https://shop.example/item");
        assert_eq!(links[0].raw.as_str(), "https://shop.example/item?product_id=42#specs");
    }

    #[test]
    fn test_duplicates_collapse_in_document_order() {
        let html = r#"
            <a href="/products/b">B</a>
            <a href="/products/a?color=red">A red</a>
            <a href="/products/a?color=blue">A blue</a>
            <a href="/products/b#reviews">B reviews</a>
        "#;
        let links = links_of(html, "https://shop.example/");
        assert_eq!(
            links,
            vec![
                "https://shop.example/products/b",
                "https://shop.example/products/a",
            ]
        );
    }
}
