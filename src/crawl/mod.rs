// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Features:
// - Breadth-first crawling from a seed URL, bounded by a page budget
// - robots.txt compliance and crawl-delay pacing
// - Query/fragment-insensitive dedup of every URL
// - Link classification as pages are discovered
//
// Submodules:
// - normalize: URL identity (NormalizedUrl)
// - links: <a href> extraction
// - frontier: FIFO queue + visited set
// - robots: the politeness gate
// - job: the crawl loop itself
// =============================================================================

mod frontier;
mod job;
mod links;
mod normalize;
mod robots;

pub use job::{CrawlOutcome, CrawlSettings, Crawler};
pub use normalize::{bare_host, NormalizedUrl};
