use serde::{Deserialize, Serialize};
use url::Url;

/// Which discovered links may be followed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// Follow every link regardless of host.
    #[default]
    FollowAll,
    /// Only follow links whose host matches one of the include wildcards.
    /// With no wildcards configured this falls back to the root URL's host.
    Restrict,
}

/// A single host wildcard such as `*`, `*.example.com` or `example.com`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainPattern {
    Any,
    /// Matches the apex domain and any subdomain of it.
    Suffix(String),
    Exact(String),
}

impl DomainPattern {
    /// Returns `None` for anything that is not one of the three forms, so a
    /// malformed wildcard never widens the scope.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim().to_ascii_lowercase();
        if pattern == "*" {
            return Some(DomainPattern::Any);
        }
        if let Some(rest) = pattern.strip_prefix("*.") {
            let base = rest.trim_end_matches('.');
            if base.is_empty() || base.contains('*') {
                return None;
            }
            return Some(DomainPattern::Suffix(base.to_string()));
        }
        let exact = pattern.trim_end_matches('.');
        if exact.is_empty() || exact.contains('*') {
            return None;
        }
        Some(DomainPattern::Exact(exact.to_string()))
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        match self {
            DomainPattern::Any => true,
            DomainPattern::Suffix(base) => {
                host == *base || host.ends_with(&format!(".{}", base))
            }
            DomainPattern::Exact(exact) => host == *exact,
        }
    }
}

/// Resolved link filter for one crawl run.
#[derive(Debug, Clone)]
pub struct LinkScope {
    patterns: Option<Vec<DomainPattern>>,
}

impl LinkScope {
    pub fn new(policy: ScopePolicy, wildcards: &[String], root: &Url) -> Self {
        let patterns = match policy {
            ScopePolicy::FollowAll => None,
            ScopePolicy::Restrict => {
                let mut patterns: Vec<DomainPattern> = wildcards
                    .iter()
                    .filter_map(|w| {
                        let parsed = DomainPattern::parse(w);
                        if parsed.is_none() {
                            tracing::warn!("Ignoring unusable domain wildcard '{}'", w);
                        }
                        parsed
                    })
                    .collect();
                if patterns.is_empty()
                    && let Some(host) = root.host_str()
                {
                    patterns.push(DomainPattern::Exact(host.to_ascii_lowercase()));
                }
                Some(patterns)
            }
        };
        Self { patterns }
    }

    pub fn allows(&self, url: &str) -> bool {
        let Some(patterns) = &self.patterns else {
            return true;
        };
        match Url::parse(url).ok().as_ref().and_then(|u| u.host_str()) {
            Some(host) => patterns.iter().any(|p| p.matches(host)),
            None => false,
        }
    }
}
