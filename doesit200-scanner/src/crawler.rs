use crate::config::CrawlConfig;
use crate::engine::PageEngine;
use crate::error::{Result, ScanError};
use crate::frontier::Frontier;
use crate::link::{self, Origin};
use crate::network::NetworkObserver;
use crate::result::{CrawlOutcome, NavigationFailure};
use crate::scope::LinkScope;
use crate::visited::VisitedLedger;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};
use url::Url;

const SETTLE_ROUNDS: usize = 32;

/// Called with `(depth, url)` right before each navigation.
pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// Cooperative stop signal shared between the crawler and whoever handles
/// Ctrl-C.
#[derive(Debug, Default)]
pub struct Shutdown {
    requested: AtomicBool,
    notify: Notify,
}

impl Shutdown {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn trigger(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once `trigger` has been called, including before this call.
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_requested() {
            return;
        }
        notified.await;
    }
}

/// Depth-first, depth-bounded crawl over a single page engine.
pub struct Crawler<E: PageEngine> {
    engine: E,
    config: CrawlConfig,
    scope: LinkScope,
    observer: NetworkObserver,
    visited: VisitedLedger,
    failures: Vec<NavigationFailure>,
    shutdown: Arc<Shutdown>,
    progress_callback: Option<ProgressCallback>,
}

impl<E: PageEngine> Crawler<E> {
    /// `observer` must be the one whose sink `engine` reports to.
    pub fn new(engine: E, observer: NetworkObserver, config: CrawlConfig) -> Self {
        let scope = LinkScope::new(
            config.scope(),
            config.include_domain_wildcards(),
            config.root_url(),
        );
        Self {
            engine,
            config,
            scope,
            observer,
            visited: VisitedLedger::new(),
            failures: Vec::new(),
            shutdown: Shutdown::new(),
            progress_callback: None,
        }
    }

    pub fn with_shutdown(mut self, shutdown: Arc<Shutdown>) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub async fn crawl(&mut self) -> Result<CrawlOutcome> {
        let started_at = Utc::now();
        // Discovered links are compared without fragments, so the root is too.
        let mut root_url = self.config.root_url().clone();
        root_url.set_fragment(None);
        let root = root_url.to_string();
        info!(
            "Starting crawl of {} (max depth {}, sleep {}s)",
            root,
            self.config.max_depth(),
            self.config.sleep().as_secs()
        );

        // LIFO so a page's whole subtree is handled before its next sibling.
        let mut worklist: Vec<(String, u8)> = vec![(root.clone(), 0)];
        let mut cancelled = false;

        while let Some((url, depth)) = worklist.pop() {
            if self.shutdown.is_requested() {
                cancelled = true;
                break;
            }
            self.observer.drain();

            if url.is_empty() {
                continue;
            }
            if self.visited.is_visited(&url) || self.observer.ledger().has_request(&url) {
                debug!("Skipping already scanned URL: {}", url);
                continue;
            }

            self.visited.mark_visited(&url);
            if let Some(ref callback) = self.progress_callback {
                callback(depth, &url);
            }

            if let Err(e) = self.navigate(&url).await {
                if self.shutdown.is_requested() {
                    cancelled = true;
                    break;
                }
                if e.is_fatal() {
                    error!("Aborting crawl at {}: {}", url, e);
                    return Err(e);
                }
                // Usually a download response rather than a page load.
                warn!("Error launching URL or initiated download response {}: {}", url, e);
                self.failures.push(NavigationFailure {
                    url: url.clone(),
                    depth,
                    error: e.to_string(),
                });
                continue;
            }

            if !self.config.sleep().is_zero() && self.pause().await {
                cancelled = true;
                break;
            }
            self.settle().await;

            if depth >= self.config.max_depth() {
                debug!("Depth {} reached at {}, not expanding", depth, url);
                continue;
            }

            let frontier = self.expand(&url).await?;
            info!(
                "Found {} child links for {} (depth {})",
                frontier.len(),
                url,
                depth
            );
            debug!("Child links: {:?}", frontier.as_slice());

            let next_depth = depth + 1;
            for child in frontier.into_vec().into_iter().rev() {
                worklist.push((child, next_depth));
            }
        }

        if cancelled {
            warn!("Crawl cancelled with {} URLs left in the worklist", worklist.len());
        }
        self.settle().await;

        let outcome = CrawlOutcome {
            root_url: root,
            max_depth: self.config.max_depth(),
            ledger: self.observer.ledger().clone(),
            visited: self.visited.iter().map(str::to_string).collect(),
            failures: self.failures.clone(),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            "Crawl complete. Visited {} pages, observed {} requests",
            outcome.navigations(),
            outcome.ledger.request_count()
        );
        Ok(outcome)
    }

    async fn navigate(&mut self, url: &str) -> Result<()> {
        let timeout = self.config.navigation_timeout();
        let shutdown = Arc::clone(&self.shutdown);
        tokio::select! {
            result = tokio::time::timeout(timeout, self.engine.navigate(url)) => match result {
                Ok(navigated) => navigated,
                Err(_) => Err(ScanError::Timeout {
                    url: url.to_string(),
                    secs: timeout.as_secs(),
                }),
            },
            _ = shutdown.wait() => {
                Err(ScanError::Other(format!("navigation to {} cancelled", url)))
            }
        }
    }

    /// Fold in events the engine forwards from its own tasks, yielding until
    /// the channel stays quiet.
    async fn settle(&mut self) {
        for _ in 0..SETTLE_ROUNDS {
            tokio::task::yield_now().await;
            if self.observer.drain() == 0 {
                break;
            }
        }
    }

    /// Courtesy delay between navigations. Returns `true` if shutdown cut it short.
    async fn pause(&self) -> bool {
        let sleep = self.config.sleep();
        debug!("Sleeping for {} seconds...", sleep.as_secs_f64());
        tokio::select! {
            _ = tokio::time::sleep(sleep) => false,
            _ = self.shutdown.wait() => true,
        }
    }

    /// Collect the current page's links into a frontier. Only fatal engine
    /// errors escape; everything else skips the anchor or the page.
    async fn expand(&mut self, page: &str) -> Result<Frontier> {
        let anchors = match self.engine.anchors().await {
            Ok(anchors) => anchors,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!("Could not get links on {}: {}", page, e);
                return Ok(Frontier::new());
            }
        };

        let page_url = match self.engine.current_url().await {
            Ok(current) => Url::parse(&current).ok(),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                debug!("Could not read current URL of {}: {}", page, e);
                None
            }
        }
        .or_else(|| Url::parse(page).ok());

        let mut origin: Option<Origin> = None;
        let mut frontier = Frontier::new();

        for anchor in anchors {
            let href = match anchor.href {
                Ok(Some(href)) => href,
                Ok(None) => {
                    debug!("Anchor without href on {}", page);
                    continue;
                }
                Err(reason) => {
                    warn!("Could not get href attribute on {}: {}", page, reason);
                    continue;
                }
            };

            if origin.is_none() && link::is_root_relative(&href) {
                origin = Some(match self.engine.evaluate_origin().await {
                    Ok(value) => Origin::from_evaluated(&value),
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => Origin::Unavailable(e.to_string()),
                });
            }

            match link::normalize_href(&href, page_url.as_ref(), origin.as_ref()) {
                Ok(url) => {
                    if !self.scope.allows(&url) {
                        debug!("Out of scope, not following {}", url);
                        continue;
                    }
                    frontier.push(url, &self.visited);
                }
                Err(rejection) if rejection.is_anomaly() => {
                    warn!("Skipping href '{}' on {}: {}", href, page, rejection);
                }
                Err(rejection) => {
                    debug!("Skipping href '{}' on {}: {}", href, page, rejection);
                }
            }
        }

        Ok(frontier)
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Hand back the engine and the observer, e.g. to shut the engine down
    /// first and read the final ledger afterwards.
    pub fn into_parts(self) -> (E, NetworkObserver) {
        (self.engine, self.observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_wait_after_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger();
        tokio::time::timeout(Duration::from_millis(100), shutdown.wait())
            .await
            .expect("wait should resolve immediately");
        assert!(shutdown.is_requested());
    }

    #[tokio::test]
    async fn test_shutdown_wakes_waiter() {
        let shutdown = Shutdown::new();
        let waiter = {
            let shutdown = Arc::clone(&shutdown);
            tokio::spawn(async move { shutdown.wait().await })
        };
        tokio::task::yield_now().await;
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }
}
