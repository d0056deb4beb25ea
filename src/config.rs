// src/config.rs
// =============================================================================
// Run configuration.
//
// Values come from three layers, highest priority first:
// 1. Command-line flags
// 2. An optional JSON config file (--config)
// 3. Built-in defaults
//
// Example config file:
//   {
//     "seeds": ["https://www.bewakoof.com/", "https://www.pyarababy.com/"],
//     "max_pages": 100,
//     "strategy": "domain-table",
//     "patterns": { "shop.example": "^/products/[a-z0-9-]+" }
//   }
//
// The configuration is fixed once the crawl starts.
// =============================================================================

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

use crate::classify::{Classifier, DomainPatternTable, HeuristicClassifier, Strategy};
use crate::cli::CrawlArgs;
use crate::crawl::{CrawlSettings, NormalizedUrl};
use crate::error::CrawlError;

pub const DEFAULT_MAX_PAGES: usize = 100;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; ProductCrawler/1.0)";
pub const DEFAULT_ROBOTS_AGENT: &str = "ProductCrawler";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_OUTPUT: &str = "output/product_urls.json";

/// Shape of the --config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub seeds: Vec<String>,
    pub max_pages: Option<usize>,
    pub user_agent: Option<String>,
    pub robots_agent: Option<String>,
    pub timeout_secs: Option<u64>,
    pub output: Option<PathBuf>,
    pub strategy: Option<Strategy>,
    pub same_site: Option<bool>,
    pub patterns: HashMap<String, String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Reads a host -> regex JSON object
pub fn load_patterns(path: &Path) -> Result<HashMap<String, String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading patterns file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing patterns file {}", path.display()))
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seeds: Vec<String>,
    pub max_pages: usize,
    pub user_agent: String,
    pub robots_agent: String,
    pub timeout_secs: u64,
    pub output: PathBuf,
    pub strategy: Strategy,
    pub same_site: bool,
    pub patterns: HashMap<String, String>,
}

impl CrawlConfig {
    /// Builds and validates the config for a `crawl` invocation
    pub fn from_args(args: &CrawlArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut config = Self::merge(file, args);
        if let Some(path) = &args.patterns {
            config.patterns.extend(load_patterns(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    fn merge(file: FileConfig, args: &CrawlArgs) -> Self {
        let seeds = if args.seeds.is_empty() {
            file.seeds
        } else {
            args.seeds.clone()
        };

        // The report is keyed by seed, so each seed is crawled once
        let mut unique_seeds: Vec<String> = Vec::new();
        for seed in seeds {
            if !unique_seeds.contains(&seed) {
                unique_seeds.push(seed);
            }
        }

        Self {
            seeds: unique_seeds,
            max_pages: args.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES),
            user_agent: args
                .user_agent
                .clone()
                .or(file.user_agent)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            robots_agent: args
                .robots_agent
                .clone()
                .or(file.robots_agent)
                .unwrap_or_else(|| DEFAULT_ROBOTS_AGENT.to_string()),
            timeout_secs: args.timeout.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS),
            output: args
                .output
                .clone()
                .or(file.output)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            strategy: args.strategy.or(file.strategy).unwrap_or_default(),
            same_site: args.same_site().or(file.same_site).unwrap_or(false),
            patterns: file.patterns,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.seeds.is_empty() {
            bail!("no seed URLs given (pass them as arguments or in the config file)");
        }

        for seed in &self.seeds {
            let url = NormalizedUrl::parse(seed)?;
            if !matches!(url.as_url().scheme(), "http" | "https") {
                bail!("seed '{}' is not an http(s) URL", seed);
            }
        }

        if self.max_pages == 0 {
            bail!("--max-pages must be at least 1");
        }
        if self.timeout_secs == 0 {
            bail!("--timeout must be at least 1 second");
        }

        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            max_pages: self.max_pages,
            robots_agent: self.robots_agent.clone(),
            same_site: self.same_site,
        }
    }

    /// The classifier selected by `strategy`, with custom patterns merged in
    pub fn classifier(&self) -> Result<Classifier, CrawlError> {
        match self.strategy {
            Strategy::DomainTable => {
                let mut table = DomainPatternTable::builtin();
                table.extend(&self.patterns)?;
                debug!(hosts = table.len(), "product pattern table ready");
                Ok(Classifier::DomainTable(table))
            }
            Strategy::Heuristic => {
                // The heuristic has no per-host table to put them in
                if !self.patterns.is_empty() {
                    warn!(
                        hosts = self.patterns.len(),
                        "custom product patterns are ignored by the heuristic strategy"
                    );
                }
                Ok(Classifier::Heuristic(HeuristicClassifier::new()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn args(seeds: &[&str]) -> CrawlArgs {
        CrawlArgs {
            seeds: seeds.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("product-crawler-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = CrawlConfig::from_args(&args(&["https://www.bewakoof.com/"])).unwrap();

        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.robots_agent, DEFAULT_ROBOTS_AGENT);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.strategy, Strategy::DomainTable);
        assert!(!config.same_site);
    }

    #[test]
    fn test_cli_overrides_file() {
        let path = temp_file(
            "override.json",
            r#"{
                "seeds": ["https://file.example/"],
                "max_pages": 7,
                "timeout_secs": 30,
                "strategy": "heuristic",
                "same_site": true
            }"#,
        );

        let mut cli = args(&[]);
        cli.config = Some(path.clone());
        cli.max_pages = Some(3);

        let config = CrawlConfig::from_args(&cli).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.seeds, vec!["https://file.example/"]);
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.strategy, Strategy::Heuristic);
        assert!(config.same_site);
    }

    #[test]
    fn test_cli_can_turn_off_file_same_site() {
        let path = temp_file(
            "same-site.json",
            r#"{"seeds": ["https://file.example/"], "same_site": true}"#,
        );

        let mut cli = args(&[]);
        cli.config = Some(path.clone());
        let from_file = CrawlConfig::from_args(&cli).unwrap();

        cli.no_same_site = true;
        let overridden = CrawlConfig::from_args(&cli).unwrap();
        std::fs::remove_file(path).ok();

        assert!(from_file.same_site);
        assert!(!overridden.same_site);
    }

    #[test]
    fn test_heuristic_ignores_patterns() {
        let mut config = CrawlConfig::from_args(&args(&["https://shop.example/"])).unwrap();
        config.strategy = Strategy::Heuristic;
        config.patterns.insert("shop.example".to_string(), "(".to_string());

        // Not compiled at all, so even a bad pattern is no error here
        let classifier = config.classifier().unwrap();
        assert_eq!(classifier.strategy(), Strategy::Heuristic);
    }

    #[test]
    fn test_duplicate_seeds_collapse() {
        let config = CrawlConfig::from_args(&args(&[
            "https://shop.example/",
            "https://other.example/",
            "https://shop.example/",
        ]))
        .unwrap();
        assert_eq!(config.seeds, vec!["https://shop.example/", "https://other.example/"]);
    }

    #[test]
    fn test_validation_errors() {
        assert!(CrawlConfig::from_args(&args(&[])).is_err());
        assert!(CrawlConfig::from_args(&args(&["shop.example"])).is_err());
        assert!(CrawlConfig::from_args(&args(&["ftp://shop.example/"])).is_err());

        let mut zero_pages = args(&["https://shop.example/"]);
        zero_pages.max_pages = Some(0);
        assert!(CrawlConfig::from_args(&zero_pages).is_err());
    }

    #[test]
    fn test_unknown_config_fields_are_rejected() {
        let path = temp_file("unknown.json", r#"{"seeds": [], "max_depth": 3}"#);
        let mut cli = args(&["https://shop.example/"]);
        cli.config = Some(path.clone());

        let result = CrawlConfig::from_args(&cli);
        std::fs::remove_file(path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_patterns_file_feeds_domain_table() {
        let path = temp_file("patterns.json", r#"{"shop.example": "^/products/"}"#);
        let mut cli = args(&["https://shop.example/"]);
        cli.patterns = Some(path.clone());

        let config = CrawlConfig::from_args(&cli).unwrap();
        std::fs::remove_file(path).ok();

        let classifier = config.classifier().unwrap();
        let url = url::Url::parse("https://www.shop.example/products/widget-a").unwrap();
        assert!(classifier.classify(&url, None).is_product);
    }

    #[test]
    fn test_bad_pattern_fails_classifier_build() {
        let mut config = CrawlConfig::from_args(&args(&["https://shop.example/"])).unwrap();
        config.patterns.insert("shop.example".to_string(), "(".to_string());
        assert!(matches!(
            config.classifier(),
            Err(CrawlError::InvalidPattern { .. })
        ));
    }
}
