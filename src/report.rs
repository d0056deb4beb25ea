// src/report.rs
// =============================================================================
// Collects every seed's crawl into the final report.
//
// `crawl_all` launches one task per seed and waits for all of them. A seed
// that fails outright (bad URL, panicked task) still gets an entry, with no
// products, so the report always has one key per seed.
//
// Output format (seed order preserved, product URLs sorted):
//   {
//     "https://www.bewakoof.com/": [
//       "https://www.bewakoof.com/p/itachi-blood-premium-glass-cover"
//     ],
//     "https://www.pyarababy.com/": []
//   }
// =============================================================================

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::path::Path;
use std::sync::Arc;
use tracing::{error, info};

use crate::crawl::{CrawlOutcome, Crawler};

#[derive(Debug, Clone)]
pub struct CrawlReport {
    outcomes: Vec<CrawlOutcome>,
}

// Crawls every seed concurrently and gathers the outcomes in seed order
pub async fn crawl_all(crawler: Arc<Crawler>, seeds: &[String]) -> CrawlReport {
    let tasks = seeds.iter().map(|seed| {
        let crawler = Arc::clone(&crawler);
        let seed = seed.clone();
        tokio::spawn(async move { crawler.crawl(&seed).await })
    });

    let results = join_all(tasks).await;

    let outcomes = seeds
        .iter()
        .zip(results)
        .map(|(seed, result)| match result {
            Ok(Ok(outcome)) => {
                info!(seed = %seed, products = outcome.products.len(), "found product URLs");
                outcome
            }
            Ok(Err(e)) => {
                error!(seed = %seed, error = %e, "crawl could not start");
                CrawlOutcome::empty(seed)
            }
            Err(e) => {
                error!(seed = %seed, error = %e, "crawl task failed");
                CrawlOutcome::empty(seed)
            }
        })
        .collect();

    CrawlReport::new(outcomes)
}

impl CrawlReport {
    pub fn new(outcomes: Vec<CrawlOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[CrawlOutcome] {
        &self.outcomes
    }

    pub fn total_products(&self) -> usize {
        self.outcomes().iter().map(|o| o.products.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Writes the JSON report, creating parent directories as needed
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating output directory {}", parent.display()))?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;

        info!(path = %path.display(), "report written");
        Ok(())
    }

    // Prints a human-readable summary table
    pub fn print_table(&self) {
        println!("{:<50} {:>8} {:>10} {:>10}", "SEED", "PAGES", "PRODUCTS", "SECONDS");
        println!("{}", "=".repeat(81));

        for outcome in self.outcomes() {
            let seed_display = if outcome.seed.chars().count() > 47 {
                let head: String = outcome.seed.chars().take(47).collect();
                format!("{}...", head)
            } else {
                outcome.seed.clone()
            };

            println!(
                "{:<50} {:>8} {:>10} {:>10.1}",
                seed_display,
                outcome.stats.pages_fetched,
                outcome.products.len(),
                outcome.elapsed.as_secs_f64()
            );
        }

        println!();
        println!("📊 Summary:");
        println!("   🌐 Seeds: {}", self.outcomes.len());
        println!("   🛒 Product URLs: {}", self.total_products());
    }
}

impl Serialize for CrawlReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.outcomes.len()))?;
        for outcome in &self.outcomes {
            map.serialize_entry(&outcome.seed, &outcome.products)?;
        }
        map.end()
    }
}
