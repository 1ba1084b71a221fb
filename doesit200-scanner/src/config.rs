use crate::scope::ScopePolicy;
use std::time::Duration;
use url::Url;

pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Immutable parameters for one crawl run.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    root_url: Url,
    sleep: Duration,
    max_depth: u8,
    include_domain_wildcards: Vec<String>,
    scope: ScopePolicy,
    navigation_timeout: Duration,
}

impl CrawlConfig {
    pub fn new(root_url: Url) -> Self {
        Self {
            root_url,
            sleep: Duration::ZERO,
            max_depth: 1,
            include_domain_wildcards: Vec::new(),
            scope: ScopePolicy::FollowAll,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
        }
    }

    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_include_domain_wildcards(mut self, wildcards: Vec<String>) -> Self {
        self.include_domain_wildcards = wildcards;
        self
    }

    pub fn with_scope(mut self, scope: ScopePolicy) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    pub fn root_url(&self) -> &Url {
        &self.root_url
    }

    pub fn sleep(&self) -> Duration {
        self.sleep
    }

    pub fn max_depth(&self) -> u8 {
        self.max_depth
    }

    pub fn include_domain_wildcards(&self) -> &[String] {
        &self.include_domain_wildcards
    }

    pub fn scope(&self) -> ScopePolicy {
        self.scope
    }

    pub fn navigation_timeout(&self) -> Duration {
        self.navigation_timeout
    }
}
