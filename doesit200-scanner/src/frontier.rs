use crate::visited::VisitedLedger;
use std::collections::HashSet;

/// Next-level URLs discovered on one page, in anchor order.
#[derive(Debug, Default, Clone)]
pub struct Frontier {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url` unless it is empty, already queued here, or already visited.
    pub fn push(&mut self, url: String, visited: &VisitedLedger) -> bool {
        if url.is_empty() || visited.is_visited(&url) || self.seen.contains(&url) {
            return false;
        }
        self.seen.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}
