// src/classify/mod.rs
// =============================================================================
// This module decides whether a URL is a product-detail page.
//
// Submodules:
// - heuristic: scores URL shape plus page content (needs the page)
// - domain_table: per-store regex on the URL path (URL only, no download)
//
// The crawler holds one `Classifier` and doesn't care which strategy is
// inside; the strategy is picked from the command line or config file.
// =============================================================================

mod domain_table;
mod heuristic;

pub use domain_table::DomainPatternTable;
pub use heuristic::{HeuristicClassifier, ScoreBreakdown};

use scraper::Html;
use serde::Deserialize;
use url::Url;

/// Outcome of classifying one URL
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_product: bool,
    pub score: f64,
}

/// Strategy names accepted by `--strategy` and the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Per-store URL patterns, applied to every extracted link
    #[default]
    DomainTable,
    /// Content scoring, applied to every fetched page
    Heuristic,
}

#[derive(Debug, Clone)]
pub enum Classifier {
    Heuristic(HeuristicClassifier),
    DomainTable(DomainPatternTable),
}

impl Classifier {
    pub fn strategy(&self) -> Strategy {
        match self {
            Classifier::Heuristic(_) => Strategy::Heuristic,
            Classifier::DomainTable(_) => Strategy::DomainTable,
        }
    }

    /// Whether this strategy needs the page itself.
    ///
    /// Strategies that don't are run on every extracted link; those that do
    /// are run on each fetched page.
    pub fn needs_page(&self) -> bool {
        matches!(self, Classifier::Heuristic(_))
    }

    pub fn classify(&self, url: &Url, page: Option<&Html>) -> Verdict {
        match self {
            Classifier::Heuristic(scorer) => scorer.classify(url, page),
            Classifier::DomainTable(table) => table.classify(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategies_are_interchangeable() {
        let url = Url::parse("https://www.amazon.in/dp/B08XYZ1234").unwrap();

        let table = Classifier::DomainTable(DomainPatternTable::builtin());
        assert!(!table.needs_page());
        assert!(table.classify(&url, None).is_product);

        let heuristic = Classifier::Heuristic(HeuristicClassifier::new());
        assert!(heuristic.needs_page());
        // URL shape alone never reaches the threshold
        assert!(!heuristic.classify(&url, None).is_product);
    }

    #[test]
    fn test_strategy_names_deserialize() {
        let strategy: Strategy = serde_json::from_str("\"domain-table\"").unwrap();
        assert_eq!(strategy, Strategy::DomainTable);
        let strategy: Strategy = serde_json::from_str("\"heuristic\"").unwrap();
        assert_eq!(strategy, Strategy::Heuristic);
    }
}
