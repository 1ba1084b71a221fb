use crate::network::NetworkLedger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationFailure {
    pub url: String,
    pub depth: u8,
    pub error: String,
}

/// Everything a finished (or interrupted) crawl produced.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub root_url: String,
    pub max_depth: u8,
    pub ledger: NetworkLedger,
    /// Navigated URLs in visit order.
    pub visited: Vec<String>,
    pub failures: Vec<NavigationFailure>,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    pub fn navigations(&self) -> usize {
        self.visited.len()
    }

    pub fn successful_navigations(&self) -> usize {
        self.visited.len().saturating_sub(self.failures.len())
    }
}
