// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - crawl: crawl one or more seed sites and write the product URL report
// - classify: score a single page, to see why it is (or isn't) a product
//
// Options left unset on the command line fall back to the config file
// (--config), then to built-in defaults. See config.rs.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::classify::Strategy;

#[derive(Parser, Debug)]
#[command(
    name = "product-crawler",
    version = "0.1.0",
    about = "Crawls e-commerce sites and collects product-detail page URLs",
    long_about = "product-crawler walks each seed site breadth-first, honoring robots.txt \
                  and crawl delays, and classifies every discovered link as a product page or not. \
                  All seeds are crawled concurrently; the result is one JSON file mapping each seed \
                  to its product URLs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl seed sites for product URLs
    ///
    /// Example: product-crawler crawl https://www.bewakoof.com/ --max-pages 50
    Crawl(CrawlArgs),

    /// Fetch one page and show how each strategy classifies it
    ///
    /// Example: product-crawler classify https://www.amazon.in/dp/B08XYZ1234
    Classify {
        /// Page URL to classify
        url: String,

        /// User-Agent header sent with the request
        #[arg(long)]
        user_agent: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout: u64,

        /// JSON file of extra host -> regex product patterns
        #[arg(long)]
        patterns: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct CrawlArgs {
    /// Seed URLs, one crawl per seed (e.g., https://www.pyarababy.com/)
    pub seeds: Vec<String>,

    /// Maximum pages fetched per seed [default: 100]
    #[arg(long)]
    pub max_pages: Option<usize>,

    /// User-Agent header sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Agent name matched against robots.txt rules [default: ProductCrawler]
    #[arg(long)]
    pub robots_agent: Option<String>,

    /// Request timeout in seconds [default: 10]
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Classification strategy [default: domain-table]
    #[arg(long, value_enum)]
    pub strategy: Option<Strategy>,

    /// Only follow links on each seed's own host
    #[arg(long, overrides_with = "no_same_site")]
    pub same_site: bool,

    /// Follow links to any host, even if the config file says same_site
    #[arg(long, overrides_with = "same_site")]
    pub no_same_site: bool,

    /// JSON file of extra host -> regex product patterns
    #[arg(long)]
    pub patterns: Option<PathBuf>,

    /// JSON config file (CLI flags take precedence)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where to write the report [default: output/product_urls.json]
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Also print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl CrawlArgs {
    /// The same-site choice made on the command line, if any
    ///
    /// Both flags override each other, so at most one of them is set.
    pub fn same_site(&self) -> Option<bool> {
        match (self.same_site, self.no_same_site) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
