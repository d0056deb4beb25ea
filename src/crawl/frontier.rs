// src/crawl/frontier.rs
// =============================================================================
// The BFS frontier: a FIFO queue of pending URLs plus the visited set.
//
// Guarantees:
// - URLs come out in the order they were first enqueued (breadth-first)
// - A URL is pending at most once and visited at most once
// - Enqueueing something already pending or visited is a no-op
//
// The frontier is bounded only by dedup. A site with many distinct links
// grows it without limit even though only `max_pages` of them are fetched;
// fine for crawls of a few hundred pages, not for whole-web crawls.
//
// Rust concepts:
// - VecDeque: push_back/pop_front make a FIFO queue
// - HashSet: O(1) "have we seen this?" checks
// - NormalizedUrl derives Hash + Eq, so it can be a set key directly
// =============================================================================

use std::collections::{HashSet, VecDeque};

use super::normalize::NormalizedUrl;

#[derive(Debug, Default)]
pub struct Frontier {
    // Waiting to be fetched, oldest first
    pending: VecDeque<NormalizedUrl>,
    // Same URLs as `pending`, for fast membership checks
    pending_set: HashSet<NormalizedUrl>,
    // Everything ever marked visited
    visited: HashSet<NormalizedUrl>,
    // Visit order, for reporting
    visit_log: Vec<NormalizedUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url` to the back of the queue unless it is already known.
    /// Returns whether it was added.
    pub fn enqueue(&mut self, url: NormalizedUrl) -> bool {
        // Already fetched or already waiting: nothing to do
        if self.visited.contains(&url) || self.pending_set.contains(&url) {
            return false;
        }
        // Keep the queue and its set in step
        self.pending_set.insert(url.clone());
        self.pending.push_back(url);
        true
    }

    /// Pops the oldest pending URL
    pub fn dequeue(&mut self) -> Option<NormalizedUrl> {
        // `?` returns None when the queue is empty
        let url = self.pending.pop_front()?;
        self.pending_set.remove(&url);
        Some(url)
    }

    /// Records `url` as visited. Returns false if it already was.
    pub fn mark_visited(&mut self, url: NormalizedUrl) -> bool {
        // insert() returns false if the URL was already there
        if !self.visited.insert(url.clone()) {
            return false;
        }
        self.visit_log.push(url);
        true
    }

    pub fn is_visited(&self, url: &NormalizedUrl) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Nothing left to fetch
    pub fn is_exhausted(&self) -> bool {
        self.pending.is_empty()
    }

    /// Visited URLs in the order they were marked
    pub fn visited(&self) -> &[NormalizedUrl] {
        &self.visit_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> NormalizedUrl {
        NormalizedUrl::parse(&format!("https://shop.example{}", path)).unwrap()
    }

    #[test]
    fn test_fifo_order() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/a"));
        frontier.enqueue(url("/b"));
        frontier.enqueue(url("/c"));

        assert_eq!(frontier.dequeue(), Some(url("/a")));
        assert_eq!(frontier.dequeue(), Some(url("/b")));
        assert_eq!(frontier.dequeue(), Some(url("/c")));
        assert_eq!(frontier.dequeue(), None);
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_duplicate_enqueue_is_noop() {
        let mut frontier = Frontier::new();
        assert!(frontier.enqueue(url("/a")));
        assert!(!frontier.enqueue(url("/a")));
        // Same page once query and fragment are gone
        let variant = NormalizedUrl::parse("https://shop.example/a?ref=1#x").unwrap();
        assert!(!frontier.enqueue(variant));

        assert_eq!(frontier.pending_count(), 1);
    }

    #[test]
    fn test_visited_urls_are_not_requeued() {
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/a"));
        let a = frontier.dequeue().unwrap();
        frontier.mark_visited(a);

        assert!(!frontier.enqueue(url("/a")));
        assert!(frontier.is_exhausted());
    }

    #[test]
    fn test_mark_visited_is_idempotent() {
        let mut frontier = Frontier::new();
        assert!(frontier.mark_visited(url("/a")));
        assert!(!frontier.mark_visited(url("/a")));
        assert_eq!(frontier.visited_count(), 1);
        assert_eq!(frontier.visited(), &[url("/a")]);
    }

    #[test]
    fn test_dequeued_url_can_come_back_if_never_visited() {
        // A robots-denied URL is dropped without being visited
        let mut frontier = Frontier::new();
        frontier.enqueue(url("/private"));
        frontier.dequeue();

        assert!(frontier.is_exhausted());
        assert!(frontier.enqueue(url("/private")));
    }
}
