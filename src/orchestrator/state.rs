//! Per-site crawl state (spec §3 "Crawl state").

use crate::error::CrawlError;
use crate::index_store::PageRecord;
use crate::page_url::PageUrl;
use std::collections::HashSet;

/// Owned entirely by one site's orchestrator loop; no external mutation.
pub struct CrawlState {
    /// URLs actually fetched.
    pub visited: HashSet<String>,
    /// URLs ever enqueued or already known from the existing index.
    pub seen: HashSet<String>,
    /// LIFO of (url, depth).
    pub stack: Vec<(PageUrl, u32)>,
    pub pages: Vec<PageRecord>,
    pub errors: Vec<(String, CrawlError)>,
    pub max_pages: usize,
}

impl CrawlState {
    pub fn new(max_pages: usize) -> Self {
        Self {
            visited: HashSet::new(),
            seen: HashSet::new(),
            stack: Vec::new(),
            pages: Vec::new(),
            errors: Vec::new(),
            max_pages,
        }
    }

    pub fn has_capacity(&self) -> bool {
        self.pages.len() < self.max_pages
    }

    pub fn is_known(&self, url: &PageUrl) -> bool {
        self.seen.contains(url.as_str())
    }

    /// Push `(url, depth)` if not already `seen`, and mark it seen.
    pub fn enqueue_if_new(&mut self, url: PageUrl, depth: u32) {
        if self.seen.insert(url.as_str().to_string()) {
            self.stack.push((url, depth));
        }
    }

    pub fn mark_visited(&mut self, url: &PageUrl) {
        self.visited.insert(url.as_str().to_string());
    }

    pub fn was_visited(&self, url: &PageUrl) -> bool {
        self.visited.contains(url.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enqueue_if_new_dedupes_against_seen() {
        let mut state = CrawlState::new(10);
        let url = PageUrl::parse("https://docs.example.test/a").unwrap();
        state.enqueue_if_new(url.clone(), 1);
        state.enqueue_if_new(url.clone(), 1);
        assert_eq!(state.stack.len(), 1);
    }

    #[test]
    fn capacity_reflects_max_pages() {
        let mut state = CrawlState::new(1);
        assert!(state.has_capacity());
        state.pages.push(crate::index_store::PageRecord {
            url: "https://docs.example.test/a".to_string(),
            title: "A".to_string(),
            description: "desc".to_string(),
            estimated_words: 50,
            last_modified: chrono::Utc::now(),
            breadcrumbs: vec![],
            site_key: "docs".to_string(),
            site_name: "Docs".to_string(),
            depth: 0,
            crawled_at: chrono::Utc::now(),
        });
        assert!(!state.has_capacity());
    }
}
