// src/crawl/robots.rs
// =============================================================================
// The politeness gate: robots.txt permissions and crawl-delay pacing.
//
// How it works:
// 1. The first time a site (scheme + host + port) shows up, fetch
//    <site>/robots.txt and turn the answer into a RobotsPolicy
// 2. Cache that policy for the rest of the crawl job; it is never re-fetched
// 3. Answer "may I fetch this URL?" and "how long do I wait?" from the cache
//
// Status handling:
//   2xx            -> parse the rules
//   401 / 403      -> the site forbids crawlers: deny everything
//   other 4xx      -> no robots.txt: allow everything
//   5xx / network  -> policy unknown: deny everything (fail closed)
//
// Crawl-delay comes from the robots.txt body and is clamped to
// MAX_CRAWL_DELAY (5 minutes).
//
// Rust concepts:
// - enum with data: RobotsPolicy::Rules carries the body it was parsed from
// - HashMap cache behind &mut self: one owner, no locks needed
// - Arc<dyn Fetcher>: the same fetcher is shared with the crawl job
// - let-else: bail out of a loop iteration when a line doesn't parse
// =============================================================================

use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::CrawlError;
use crate::fetch::{FetchedPage, Fetcher};

/// Delay used when robots.txt doesn't declare one
pub const DEFAULT_CRAWL_DELAY: Duration = Duration::from_secs(1);

/// Longest delay we will honor between two requests to one site
pub const MAX_CRAWL_DELAY: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq)]
pub enum RobotsPolicy {
    AllowAll,
    DenyAll,
    Rules { body: String },
}

impl RobotsPolicy {
    /// Interprets a robots.txt response
    pub fn from_response(site: &str, page: &FetchedPage) -> Result<Self, CrawlError> {
        // Order matters: 401/403 must be matched before the general 4xx arm
        match page.status {
            200..=299 => Ok(RobotsPolicy::Rules {
                body: page.body.clone(),
            }),
            401 | 403 => Ok(RobotsPolicy::DenyAll),
            400..=499 => Ok(RobotsPolicy::AllowAll),
            status => Err(CrawlError::PolitenessUnavailable {
                site: site.to_string(),
                reason: format!("HTTP {}", status),
            }),
        }
    }

    pub fn allows(&self, agent: &str, url: &Url) -> bool {
        match self {
            RobotsPolicy::AllowAll => true,
            RobotsPolicy::DenyAll => false,
            RobotsPolicy::Rules { body } => {
                // The matcher keeps state between calls, so each check gets a fresh one
                let mut matcher = DefaultMatcher::default();
                matcher.one_agent_allowed_by_robots(body, agent, url.as_str())
            }
        }
    }

    /// The declared Crawl-delay for `agent`, if any, capped at MAX_CRAWL_DELAY
    pub fn crawl_delay(&self, agent: &str) -> Option<Duration> {
        match self {
            RobotsPolicy::Rules { body } => {
                // Clamp in f64 first: from_secs_f64 panics on values like 1e20
                let secs = parse_crawl_delay(body, agent)?.min(MAX_CRAWL_DELAY.as_secs_f64());
                Duration::try_from_secs_f64(secs).ok()
            }
            // No body, nothing declared: the caller falls back to the default
            _ => None,
        }
    }
}

/// Per-job cache of robots.txt policies
///
/// Owned by a single crawl job, so there is no locking: `&mut self` is the
/// single-writer guarantee.
pub struct PolitenessGate {
    fetcher: Arc<dyn Fetcher>,
    agent: String,
    policies: HashMap<String, RobotsPolicy>,
}

impl PolitenessGate {
    pub fn new(fetcher: Arc<dyn Fetcher>, agent: impl Into<String>) -> Self {
        Self {
            fetcher,
            agent: agent.into(),
            policies: HashMap::new(),
        }
    }

    /// May `url` be fetched? Fetches the site's robots.txt on first use.
    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        // Cloned up front: policy_for() borrows self mutably
        let agent = self.agent.clone();
        self.policy_for(url).await.allows(&agent, url)
    }

    /// How long to wait after fetching from `url`'s site
    pub async fn crawl_delay(&mut self, url: &Url) -> Duration {
        let agent = self.agent.clone();
        self.policy_for(url)
            .await
            .crawl_delay(&agent)
            .unwrap_or(DEFAULT_CRAWL_DELAY)
    }

    /// Number of sites whose policy has been resolved
    pub fn cached_sites(&self) -> usize {
        self.policies.len()
    }

    async fn policy_for(&mut self, url: &Url) -> &RobotsPolicy {
        // "https://shop.example:8443" - scheme, host and port make up a site
        let site = url.origin().ascii_serialization();

        // First visit to this site: fetch and remember its policy.
        // The entry API can't be used here because loading is async.
        if !self.policies.contains_key(&site) {
            let policy = self.load_policy(&site).await;
            self.policies.insert(site.clone(), policy);
        }

        &self.policies[&site]
    }

    async fn load_policy(&self, site: &str) -> RobotsPolicy {
        // Opaque origins serialize as "null" and have no robots.txt to ask
        if site == "null" {
            warn!(site, "no origin to derive robots.txt from, denying");
            return RobotsPolicy::DenyAll;
        }

        let robots_url = format!("{}/robots.txt", site);
        debug!(%robots_url, "fetching robots.txt");

        // A transport error and an unusable status both end up in Err
        let result = self
            .fetcher
            .fetch(&robots_url)
            .await
            .and_then(|page| RobotsPolicy::from_response(site, &page));

        match result {
            Ok(policy) => policy,
            Err(e) => {
                // Fail closed: without rules we don't crawl the site at all
                warn!(error = %e, "robots.txt unavailable, denying site");
                RobotsPolicy::DenyAll
            }
        }
    }
}

// Finds the Crawl-delay that applies to `agent`
//
// A group naming our agent wins over the "*" group. Agent names compare
// case-insensitively on the product token ("ProductCrawler/1.0" ->
// "productcrawler"), and a group matches if its name is contained in ours.
fn parse_crawl_delay(body: &str, agent: &str) -> Option<f64> {
    // "ProductCrawler/1.0" -> "productcrawler"
    let our_name = agent
        .split('/')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    // First delay seen for our own agent, and for "*"
    let mut specific = None;
    let mut fallback = None;

    // User-agent lines of the group we are currently inside
    let mut group_agents: Vec<String> = Vec::new();
    // Set once the group has a rule line; the next User-agent starts a new group
    let mut group_has_rules = false;

    for raw in body.lines() {
        // Drop comments, then split "Key: value"
        let line = raw.split('#').next().unwrap_or_default().trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();

        // Keys are case-insensitive ("crawl-delay", "Crawl-Delay", ...)
        match key.trim().to_ascii_lowercase().as_str() {
            "user-agent" => {
                // A User-agent after rules opens a new group
                if group_has_rules {
                    group_agents.clear();
                    group_has_rules = false;
                }
                if !value.is_empty() {
                    group_agents.push(value.to_ascii_lowercase());
                }
            }
            "crawl-delay" => {
                group_has_rules = true;
                // "soon", "" and friends are ignored
                let Ok(delay) = value.parse::<f64>() else {
                    continue;
                };
                // NaN, inf and negatives are not delays. Large values are
                // clamped by the caller.
                if !delay.is_finite() || delay < 0.0 {
                    continue;
                }
                // The first matching line wins within each bucket
                for name in &group_agents {
                    if name == "*" {
                        fallback.get_or_insert(delay);
                    } else if our_name.contains(name.as_str()) {
                        specific.get_or_insert(delay);
                    }
                }
            }
            // Allow, Disallow, Sitemap, ... all count as rules
            _ => group_has_rules = true,
        }
    }

    // Our own group beats the wildcard group
    specific.or(fallback)
}
