// src/classify/heuristic.rs
// =============================================================================
// Generic product-page scoring from URL shape and page content.
//
// Signals and weights (in tenths, so sums are exact):
//   URL looks like a product path ............ 3   (first matching pattern)
//   text contains "add to cart" ............... 3
//   an element has a class matching "price" ... 3
//   description-ish keywords in the text ...... 3
//   JSON-LD block with "@type": "Product" ..... 8
//
// A page is a product when the total reaches 7: a product URL plus two
// content signals, or schema.org Product markup on its own.
//
// The URL is matched as written, query string included, so callers pass the
// pre-normalization URL ("?product_id=" lives in the query).
// =============================================================================

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;
use url::Url;

use super::Verdict;

const URL_PATTERN_WEIGHT: u32 = 3;
const CONTENT_SIGNAL_WEIGHT: u32 = 3;
const STRUCTURED_DATA_WEIGHT: u32 = 8;
const PRODUCT_THRESHOLD: u32 = 7;

static PRODUCT_URL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"/product/",
        r"/products/",
        r"/p/",
        r"/prod/",
        r"/item/",
        r"\?product_id=",
        r"/dp/",
        r"(?i)/products/[a-z0-9-]+",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("built-in URL pattern"))
    .collect()
});

static ADD_TO_CART: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)add to cart").expect("static regex"));

static PRICE_CLASS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)price").expect("static regex"));

static DESCRIPTION_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)product description|details|features|specifications").expect("static regex")
});

/// Which signals fired for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreBreakdown {
    pub url_pattern: bool,
    pub add_to_cart: bool,
    pub price_element: bool,
    pub description_keywords: bool,
    pub structured_product: bool,
}

impl ScoreBreakdown {
    fn tenths(&self) -> u32 {
        let mut total = 0;
        if self.url_pattern {
            total += URL_PATTERN_WEIGHT;
        }
        for signal in [self.add_to_cart, self.price_element, self.description_keywords] {
            if signal {
                total += CONTENT_SIGNAL_WEIGHT;
            }
        }
        if self.structured_product {
            total += STRUCTURED_DATA_WEIGHT;
        }
        total
    }

    pub fn score(&self) -> f64 {
        f64::from(self.tenths()) / 10.0
    }

    pub fn verdict(&self) -> Verdict {
        Verdict {
            is_product: self.tenths() >= PRODUCT_THRESHOLD,
            score: self.score(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Scores `url` and, when available, the parsed page behind it
    pub fn breakdown(&self, url: &Url, page: Option<&Html>) -> ScoreBreakdown {
        let mut breakdown = ScoreBreakdown {
            url_pattern: matches_product_url(url.as_str()),
            ..Default::default()
        };

        if let Some(document) = page {
            breakdown.add_to_cart = has_add_to_cart(document);
            breakdown.price_element = has_price_element(document);
            breakdown.description_keywords = has_description_keywords(document);
            breakdown.structured_product = has_structured_product(document);
        }

        breakdown
    }

    pub fn classify(&self, url: &Url, page: Option<&Html>) -> Verdict {
        self.breakdown(url, page).verdict()
    }
}

fn matches_product_url(url: &str) -> bool {
    PRODUCT_URL_PATTERNS.iter().any(|pattern| pattern.is_match(url))
}

// Looks at text nodes one by one, like a button label would appear
fn has_add_to_cart(document: &Html) -> bool {
    document
        .root_element()
        .text()
        .any(|text| ADD_TO_CART.is_match(text))
}

fn has_price_element(document: &Html) -> bool {
    let selector = Selector::parse("[class]").expect("static selector");
    document
        .select(&selector)
        .any(|element| element.value().classes().any(|class| PRICE_CLASS.is_match(class)))
}

fn has_description_keywords(document: &Html) -> bool {
    let text: String = document.root_element().text().collect();
    DESCRIPTION_KEYWORDS.is_match(&text)
}

// Only the first JSON-LD block counts. Malformed JSON, a non-object, or a
// missing "@type" simply scores nothing.
fn has_structured_product(document: &Html) -> bool {
    let selector =
        Selector::parse(r#"script[type="application/ld+json"]"#).expect("static selector");

    let Some(script) = document.select(&selector).next() else {
        return false;
    };

    let raw: String = script.text().collect();
    match serde_json::from_str::<Value>(&raw) {
        Ok(data) => data.get("@type").and_then(Value::as_str) == Some("Product"),
        Err(_) => false,
    }
}
