// src/crawl/job.rs
// =============================================================================
// This module drives one seed domain's crawl, breadth-first.
//
// How it works, one iteration at a time:
// 1. Stop if the frontier is empty or the page budget is spent
// 2. Pop the oldest pending URL
// 3. Ask the politeness gate; denied URLs are skipped (not visited, free)
// 4. Mark visited and fetch; a failed fetch still used up a page
// 5. Extract links, classify, enqueue new ones, record product verdicts
// 6. Sleep for the site's crawl delay
//
// The CrawlJob (frontier, visited set, products) is owned by the task
// running the loop. Link classification fans out through a buffered stream
// and the results come back to that one task, which does all the mutation.
//
// Rust concepts:
// - &mut CrawlJob: only the loop touches job state, so no Mutex
// - Arc<dyn Fetcher>: one HTTP client shared by every seed's task
// - Html is !Send: it lives inside a sync fn and never crosses an .await
// - stream::iter(..).buffered(n): bounded, order-preserving fan-out
// =============================================================================

use futures::stream::{self, StreamExt};
use scraper::Html;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use super::frontier::Frontier;
use super::links::{extract_links, Link};
use super::normalize::NormalizedUrl;
use super::robots::PolitenessGate;
use crate::classify::{Classifier, Verdict};
use crate::error::CrawlError;
use crate::fetch::Fetcher;

/// How many link classifications may be in flight for one page
const CLASSIFY_CONCURRENCY: usize = 32;

/// Knobs shared by every job in a run
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Most pages fetched per seed
    pub max_pages: usize,
    /// Agent name matched against robots.txt groups
    pub robots_agent: String,
    /// Only follow links on the seed's own host
    pub same_site: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Running,
    Done,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub fetch_failures: usize,
    pub robots_denied: usize,
    pub links_seen: usize,
}

/// What a finished job hands to the report
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// The seed exactly as the user gave it
    pub seed: String,
    /// Product URLs, sorted
    pub products: Vec<String>,
    /// Fetched URLs in visit order
    pub visited: Vec<String>,
    pub stats: CrawlStats,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    /// Outcome for a seed that could not be crawled at all
    pub fn empty(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            products: Vec::new(),
            visited: Vec::new(),
            stats: CrawlStats::default(),
            elapsed: Duration::ZERO,
        }
    }
}

// One seed's mutable crawl state
struct CrawlJob {
    seed: NormalizedUrl,
    budget: usize,
    frontier: Frontier,
    // Pre-normalization URL of each pending entry, for page scoring
    raw_urls: HashMap<NormalizedUrl, Url>,
    products: BTreeSet<NormalizedUrl>,
    stats: CrawlStats,
}

impl CrawlJob {
    // Enqueues a link and remembers how it was written
    fn enqueue(&mut self, link: Link) {
        if self.frontier.enqueue(link.url.clone()) {
            self.raw_urls.insert(link.url, link.raw);
        }
    }

    // Pops the next URL along with its raw form
    fn dequeue(&mut self) -> Option<(NormalizedUrl, Url)> {
        let url = self.frontier.dequeue()?;
        // Every enqueue() records a raw form; fall back to the normalized
        // URL rather than trusting that
        let raw = self
            .raw_urls
            .remove(&url)
            .unwrap_or_else(|| url.as_url().clone());
        Some((url, raw))
    }
}

// Result of parsing one fetched page, produced without holding the DOM
// across an await point
struct PageAnalysis {
    links: Vec<Link>,
    page_verdict: Option<Verdict>,
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<Classifier>,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, classifier: Arc<Classifier>, settings: CrawlSettings) -> Self {
        Self {
            fetcher,
            classifier,
            settings,
        }
    }

    // Crawls a site starting from `seed_input`
    //
    // Returns: the product URLs found plus visit statistics. Only an
    // unparseable seed is an error; everything after that degrades to
    // skipping individual URLs.
    pub async fn crawl(&self, seed_input: &str) -> Result<CrawlOutcome, CrawlError> {
        let started = Instant::now();

        // Parse and normalize the seed; this is the one fatal error
        let seed = NormalizedUrl::parse(seed_input)?;
        let raw_seed = Url::parse(seed_input).unwrap_or_else(|_| seed.as_url().clone());

        let mut job = CrawlJob {
            seed: seed.clone(),
            budget: self.settings.max_pages,
            frontier: Frontier::new(),
            raw_urls: HashMap::new(),
            products: BTreeSet::new(),
            stats: CrawlStats::default(),
        };
        job.enqueue(Link {
            url: seed,
            raw: raw_seed,
        });

        // robots.txt policies are cached per job, so sites are never shared
        // between seeds' tasks
        let mut gate = PolitenessGate::new(Arc::clone(&self.fetcher), &self.settings.robots_agent);

        info!(seed = seed_input, budget = job.budget, "starting crawl");

        // Run until step() reports Done
        let mut state = JobState::Running;
        while state == JobState::Running {
            state = self.step(&mut job, &mut gate).await;
        }

        let elapsed = started.elapsed();
        info!(
            seed = seed_input,
            pages = job.stats.pages_fetched,
            failures = job.stats.fetch_failures,
            denied = job.stats.robots_denied,
            links = job.stats.links_seen,
            products = job.products.len(),
            pending = job.frontier.pending_count(),
            robots_sites = gate.cached_sites(),
            elapsed_secs = elapsed.as_secs_f64(),
            "crawl finished"
        );

        // BTreeSet iterates sorted, so the product list comes out sorted
        Ok(CrawlOutcome {
            seed: seed_input.to_string(),
            products: job.products.iter().map(|u| u.to_string()).collect(),
            visited: job.frontier.visited().iter().map(|u| u.to_string()).collect(),
            stats: job.stats,
            elapsed,
        })
    }

    // One pass of the crawl loop
    async fn step(&self, job: &mut CrawlJob, gate: &mut PolitenessGate) -> JobState {
        // Budget is checked before dequeuing, so it can never be exceeded
        if job.frontier.is_exhausted() || job.frontier.visited_count() >= job.budget {
            return JobState::Done;
        }

        let Some((url, raw)) = job.dequeue() else {
            return JobState::Done;
        };

        // Enqueue rejects visited URLs, but a URL may be visited after it
        // was queued
        if job.frontier.is_visited(&url) {
            return JobState::Running;
        }

        // Denied URLs cost nothing: not visited, not fetched, no delay
        if !gate.is_allowed(url.as_url()).await {
            info!(%url, "skipping, disallowed by robots.txt");
            job.stats.robots_denied += 1;
            return JobState::Running;
        }

        // From here on the URL counts against the budget, success or not
        job.frontier.mark_visited(url.clone());
        job.stats.pages_fetched += 1;
        info!(%url, visited = job.frontier.visited_count(), "crawling");

        match self.fetch_and_analyze(&url, &raw).await {
            Ok(analysis) => self.absorb(job, &url, analysis).await,
            Err(e) => {
                // No retries; the page simply contributes no links
                warn!(error = %e, "fetch failed, no links from this page");
                job.stats.fetch_failures += 1;
            }
        }

        // A request was made either way, so the site gets its pause
        let delay = gate.crawl_delay(url.as_url()).await;
        debug!(delay_secs = delay.as_secs_f64(), "waiting before next request");
        tokio::time::sleep(delay).await;

        JobState::Running
    }

    async fn fetch_and_analyze(&self, url: &NormalizedUrl, raw: &Url) -> Result<PageAnalysis, CrawlError> {
        // The normalized URL is what gets fetched
        let page = self.fetcher.fetch(url.as_str()).await?;

        // A 404 or 500 body is an error page, not content
        if !page.is_success() {
            return Err(CrawlError::HttpStatus {
                url: url.to_string(),
                status: page.status,
            });
        }

        Ok(self.analyze(url, raw, &page.body))
    }

    // Parses the page once: links for the frontier, and the page's own
    // verdict when the strategy needs content. The verdict is computed on
    // the raw URL so query-string product patterns can still match.
    fn analyze(&self, url: &NormalizedUrl, raw: &Url, body: &str) -> PageAnalysis {
        let document = Html::parse_document(body);
        let links = extract_links(&document, url.as_url());

        let page_verdict = self
            .classifier
            .needs_page()
            .then(|| self.classifier.classify(raw, Some(&document)));

        // `document` is dropped here, before any await
        PageAnalysis { links, page_verdict }
    }

    async fn absorb(&self, job: &mut CrawlJob, url: &NormalizedUrl, analysis: PageAnalysis) {
        // The fetched page's own verdict (heuristic mode only)
        if let Some(verdict) = analysis.page_verdict {
            debug!(%url, score = verdict.score, product = verdict.is_product, "page scored");
            if verdict.is_product {
                job.products.insert(url.clone());
            }
        }

        // Off-site links are dropped entirely when same_site is on
        let links: Vec<Link> = analysis
            .links
            .into_iter()
            .filter(|link| !self.settings.same_site || same_site(&job.seed, &link.url))
            .collect();
        job.stats.links_seen += links.len();
        debug!(%url, links = links.len(), "links extracted");

        // Heuristic mode scores pages once they are fetched, not links
        if self.classifier.needs_page() {
            for link in links {
                job.enqueue(link);
            }
            return;
        }

        // Fan out classification, fan results back in document order
        let classifier = &self.classifier;
        let verdicts: Vec<(Link, Verdict)> = stream::iter(links)
            .map(|link| async move {
                let verdict = classifier.classify(link.url.as_url(), None);
                (link, verdict)
            })
            .buffered(CLASSIFY_CONCURRENCY)
            .collect()
            .await;

        // Single writer: only this task touches the products and frontier
        for (link, verdict) in verdicts {
            if verdict.is_product {
                job.products.insert(link.url.clone());
            }
            job.enqueue(link);
        }
    }
}

// Same bare host ("www." ignored) as the seed
fn same_site(seed: &NormalizedUrl, link: &NormalizedUrl) -> bool {
    seed.bare_host().is_some() && seed.bare_host() == link.bare_host()
}
