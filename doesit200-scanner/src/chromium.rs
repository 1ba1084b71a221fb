//! Headless Chromium page engine built on chromiumoxide.

use crate::engine::{Anchor, PageEngine};
use crate::error::{Result, ScanError};
use crate::network::NetworkEventSink;
use async_trait::async_trait;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventRequestWillBeSent, EventResponseReceived,
};
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

const LISTENER_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    /// Timeout for individual CDP requests.
    pub request_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_executable: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// One browser, one page, reused for the whole crawl.
pub struct ChromiumEngine {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    listener_tasks: Vec<JoinHandle<()>>,
}

impl ChromiumEngine {
    pub async fn launch(sink: NetworkEventSink, options: EngineOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder().request_timeout(options.request_timeout);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(path) = options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(ScanError::EngineLaunch)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ScanError::EngineLaunch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {}", e);
                }
            }
            debug!("Browser handler finished");
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(ScanError::EngineLaunch(format!("could not create page: {}", e)));
            }
        };

        let listener_tasks = match Self::subscribe(&page, sink).await {
            Ok(tasks) => tasks,
            Err(e) => {
                let _ = browser.close().await;
                handler_task.abort();
                return Err(e);
            }
        };

        info!("Browser launched");
        Ok(Self {
            browser,
            page,
            handler_task,
            listener_tasks,
        })
    }

    async fn subscribe(page: &Page, sink: NetworkEventSink) -> Result<Vec<JoinHandle<()>>> {
        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| ScanError::EngineLaunch(format!("request listener: {}", e)))?;
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| ScanError::EngineLaunch(format!("response listener: {}", e)))?;

        let request_sink = sink.clone();
        let request_task = tokio::spawn(async move {
            while let Some(event) = requests.next().await {
                request_sink.on_request(event.request.url.clone());
            }
        });

        let response_task = tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                let status = u16::try_from(event.response.status).unwrap_or_else(|_| {
                    warn!(
                        "Status {} for {} does not fit a u16",
                        event.response.status, event.response.url
                    );
                    0
                });
                sink.on_response(event.response.url.clone(), status);
            }
        });

        Ok(vec![request_task, response_task])
    }

    /// Classify a failed call: if the page no longer answers, the browser is gone.
    async fn classify(&self, err: ScanError) -> ScanError {
        match self.page.url().await {
            Ok(_) => err,
            Err(e) => ScanError::EngineClosed(format!("{} ({})", err, e)),
        }
    }

    /// Shut the browser down. Returns once the network listeners have
    /// forwarded everything they received, so the observer can be read
    /// afterwards without losing the tail of the last page load.
    pub async fn close(mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            warn!("Could not close browser cleanly: {}", e);
        }
        match tokio::time::timeout(Duration::from_secs(5), &mut self.handler_task).await {
            Ok(joined) => joined?,
            Err(_) => {
                debug!("Browser handler did not stop in time, aborting");
                self.handler_task.abort();
            }
        }
        // The event streams end with the handler.
        for mut task in self.listener_tasks.drain(..) {
            if tokio::time::timeout(LISTENER_GRACE, &mut task).await.is_err() {
                debug!("Network listener still busy after close, aborting");
                task.abort();
            }
        }
        info!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl PageEngine for ChromiumEngine {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if let Err(e) = self.page.goto(url).await {
            let err = ScanError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            };
            return Err(self.classify(err).await);
        }
        if let Err(e) = self.page.wait_for_navigation().await {
            let err = ScanError::Navigation {
                url: url.to_string(),
                reason: format!("waiting for load: {}", e),
            };
            return Err(self.classify(err).await);
        }
        debug!("Launched URL: {}", url);
        Ok(())
    }

    async fn anchors(&mut self) -> Result<Vec<Anchor>> {
        let elements = match self.page.find_elements("a").await {
            Ok(elements) => elements,
            Err(e) => {
                let err = ScanError::Other(format!("could not query anchors: {}", e));
                return Err(self.classify(err).await);
            }
        };

        let mut anchors = Vec::with_capacity(elements.len());
        for element in elements {
            let anchor = match element.attribute("href").await {
                Ok(href) => Anchor { href: Ok(href) },
                Err(e) => Anchor::unreadable(e.to_string()),
            };
            anchors.push(anchor);
        }
        Ok(anchors)
    }

    async fn current_url(&mut self) -> Result<String> {
        match self.page.url().await {
            Ok(Some(url)) => Ok(url),
            Ok(None) => Err(ScanError::Other("page has no URL".to_string())),
            Err(e) => Err(ScanError::EngineClosed(e.to_string())),
        }
    }

    async fn evaluate_origin(&mut self) -> Result<String> {
        let result = match self.page.evaluate("window.location.origin").await {
            Ok(result) => result,
            Err(e) => {
                let err = ScanError::Evaluation(e.to_string());
                return Err(self.classify(err).await);
            }
        };
        result
            .into_value::<String>()
            .map_err(|e| ScanError::Evaluation(format!("origin is not a string: {}", e)))
    }
}
