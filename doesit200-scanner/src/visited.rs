use std::collections::HashSet;

/// URLs already scheduled for navigation in this run. Never shrinks.
#[derive(Debug, Default, Clone)]
pub struct VisitedLedger {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl VisitedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the URL was not yet recorded.
    pub fn mark_visited(&mut self, url: &str) -> bool {
        if self.seen.contains(url) {
            return false;
        }
        self.seen.insert(url.to_string());
        self.order.push(url.to_string());
        true
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Visited URLs in first-visit order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.order
    }
}
