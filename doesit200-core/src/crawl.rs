use crate::report::RunReport;
use doesit200_scanner::{
    ChromiumEngine, CrawlConfig, CrawlOutcome, Crawler, EngineOptions, NetworkObserver,
    PageEngine, ProgressCallback, ScanError, Shutdown,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub config: CrawlConfig,
    pub engine: EngineOptions,
    pub show_progress_bars: bool,
}

/// Extract the path component from a URL
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Starting crawl...");
    pb
}

/// Launch Chromium, crawl, close the browser and summarize the run.
pub async fn execute_crawl(
    options: CrawlOptions,
    shutdown: Arc<Shutdown>,
) -> Result<RunReport, ScanError> {
    let CrawlOptions {
        config,
        engine,
        show_progress_bars,
    } = options;

    let observer = NetworkObserver::new();
    let engine = ChromiumEngine::launch(observer.sink(), engine).await?;

    let (result, engine, observer) =
        crawl_with_engine(engine, observer, config, shutdown, show_progress_bars).await;

    if let Err(e) = engine.close().await {
        warn!("Browser shutdown failed: {}", e);
    }

    result.map(|outcome| finalize(outcome, observer))
}

/// Build the report from the observer's final ledger. Call this only once
/// the engine has stopped forwarding network events.
pub fn finalize(mut outcome: CrawlOutcome, observer: NetworkObserver) -> RunReport {
    outcome.ledger = observer.into_ledger();
    RunReport::from_outcome(&outcome)
}

/// Run one crawl on an already constructed engine and hand the engine and
/// the observer back so the caller can shut the engine down before reading
/// the final ledger.
pub async fn crawl_with_engine<E: PageEngine>(
    engine: E,
    observer: NetworkObserver,
    config: CrawlConfig,
    shutdown: Arc<Shutdown>,
    show_progress_bars: bool,
) -> (Result<CrawlOutcome, ScanError>, E, NetworkObserver) {
    let progress_bar = show_progress_bars.then(spinner);
    let processed_count = Arc::new(AtomicUsize::new(0));

    let mut crawler = Crawler::new(engine, observer, config).with_shutdown(shutdown);
    if let Some(ref pb) = progress_bar {
        let pb_clone = pb.clone();
        let count_clone = Arc::clone(&processed_count);
        let callback: ProgressCallback = Arc::new(move |depth: u8, url: &str| {
            let count = count_clone.fetch_add(1, Ordering::Relaxed) + 1;
            pb_clone.set_message(format!(
                "[{}] depth {} {}",
                count,
                depth,
                extract_url_path(url)
            ));
        });
        crawler = crawler.with_progress_callback(callback);
    }

    let result = crawler.crawl().await;

    if let Some(pb) = progress_bar {
        let total = processed_count.load(Ordering::Relaxed);
        pb.finish_with_message(format!("Crawl complete! {} pages visited", total));
    }

    let (engine, observer) = crawler.into_parts();
    (result, engine, observer)
}
