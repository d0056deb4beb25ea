// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Set up logging (RUST_LOG, default product_crawler=info, to stderr)
// 2. Parse command-line arguments using clap
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
// =============================================================================

mod classify;      // src/classify/ - product page classification strategies
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - run configuration layers
mod crawl;         // src/crawl/ - frontier, robots.txt, the crawl loop
mod error;         // src/error.rs - crawl error taxonomy
mod fetch;         // src/fetch/ - HTTP fetching behind a trait
mod report;        // src/report.rs - per-seed results and JSON output

use anyhow::{Context, Result};
use clap::Parser;
use scraper::Html;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

use classify::{DomainPatternTable, HeuristicClassifier};
use cli::{Cli, Commands, CrawlArgs};
use config::{load_patterns, CrawlConfig, DEFAULT_USER_AGENT};
use crawl::{Crawler, NormalizedUrl};
use fetch::{Fetcher, HttpFetcher};

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays clean
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "product_crawler=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Crawl(args) => handle_crawl(args).await,
        Commands::Classify {
            url,
            user_agent,
            timeout,
            patterns,
        } => handle_classify(&url, user_agent, timeout, patterns).await,
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(args: CrawlArgs) -> Result<i32> {
    let config = CrawlConfig::from_args(&args)?;
    let classifier = config.classifier()?;

    info!(
        seeds = config.seeds.len(),
        max_pages = config.max_pages,
        strategy = ?classifier.strategy(),
        same_site = config.same_site,
        "starting crawl run"
    );

    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config.user_agent, config.timeout())?);
    let crawler = Arc::new(Crawler::new(fetcher, Arc::new(classifier), config.settings()));

    let report = report::crawl_all(crawler, &config.seeds).await;
    report.write_json(&config.output)?;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        report.print_table();
        println!("   📄 Report: {}", config.output.display());
    }

    Ok(0)
}

// Handles the 'classify' subcommand
async fn handle_classify(
    url: &str,
    user_agent: Option<String>,
    timeout: u64,
    patterns: Option<PathBuf>,
) -> Result<i32> {
    let parsed = Url::parse(url).with_context(|| format!("invalid URL '{}'", url))?;

    let mut table = DomainPatternTable::builtin();
    if let Some(path) = patterns {
        table.extend(&load_patterns(&path)?)?;
    }

    let user_agent = user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
    let fetcher = HttpFetcher::new(&user_agent, Duration::from_secs(timeout.max(1)))?;

    println!("🔍 Classifying: {}", url);

    let page = fetcher.fetch(url).await?;
    if !page.is_success() {
        println!("⚠️  HTTP {}: scoring the URL alone", page.status);
    }

    let document = page.is_success().then(|| Html::parse_document(&page.body));
    let breakdown = HeuristicClassifier::new().breakdown(&parsed, document.as_ref());
    let heuristic = breakdown.verdict();

    let normalized = NormalizedUrl::from_url(parsed);
    let table_verdict = table.classify(normalized.as_url());

    println!();
    println!("Heuristic score: {:.1} -> {}", heuristic.score, yes_no(heuristic.is_product));
    println!("   URL pattern ........... {}", mark(breakdown.url_pattern));
    println!("   \"add to cart\" ......... {}", mark(breakdown.add_to_cart));
    println!("   price element ......... {}", mark(breakdown.price_element));
    println!("   description keywords .. {}", mark(breakdown.description_keywords));
    println!("   JSON-LD Product ....... {}", mark(breakdown.structured_product));
    println!();

    let host = normalized.bare_host().unwrap_or("");
    if table.pattern_for(host).is_some() {
        println!("Domain table ({}): {}", host, yes_no(table_verdict.is_product));
    } else {
        println!("Domain table: no pattern for {} (not a product)", host);
    }

    Ok(0)
}

fn yes_no(is_product: bool) -> &'static str {
    if is_product {
        "✅ product"
    } else {
        "❌ not a product"
    }
}

fn mark(signal: bool) -> &'static str {
    if signal {
        "✅"
    } else {
        "·"
    }
}
