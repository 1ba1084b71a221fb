// In-memory page engine for driving the crawler without a browser.

#![allow(dead_code)]

use async_trait::async_trait;
use doesit200_scanner::error::Result;
use doesit200_scanner::{Anchor, NetworkEventSink, PageEngine, ScanError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    /// Recoverable navigation error, like a download response.
    Navigation,
    /// The browser went away.
    Fatal,
    /// Never finishes loading.
    Hang,
}

#[derive(Debug, Clone)]
pub struct ScriptedPage {
    pub anchors: Vec<Anchor>,
    pub status: u16,
    pub subresources: Vec<(String, u16)>,
    pub failure: Option<Failure>,
    pub origin_fails: bool,
    /// Where the page ends up after redirects.
    pub final_url: Option<String>,
    /// Report network traffic from a separate task, after `navigate` returns.
    pub deferred_events: bool,
}

impl ScriptedPage {
    pub fn links(hrefs: &[&str]) -> Self {
        Self {
            anchors: hrefs.iter().map(|h| Anchor::new(*h)).collect(),
            status: 200,
            subresources: Vec::new(),
            failure: None,
            origin_fails: false,
            final_url: None,
            deferred_events: false,
        }
    }

    pub fn empty() -> Self {
        Self::links(&[])
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_subresource(mut self, url: &str, status: u16) -> Self {
        self.subresources.push((url.to_string(), status));
        self
    }

    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchors.push(anchor);
        self
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn without_origin(mut self) -> Self {
        self.origin_fails = true;
        self
    }

    pub fn redirected_to(mut self, url: &str) -> Self {
        self.final_url = Some(url.to_string());
        self
    }

    pub fn with_deferred_events(mut self) -> Self {
        self.deferred_events = true;
        self
    }
}

#[derive(Debug, Default)]
pub struct EngineLog {
    pub navigations: Vec<String>,
    pub origin_calls: usize,
}

pub struct ScriptedEngine {
    pages: HashMap<String, ScriptedPage>,
    sink: NetworkEventSink,
    current: Option<String>,
    log: Arc<Mutex<EngineLog>>,
}

impl ScriptedEngine {
    pub fn new(sink: NetworkEventSink) -> Self {
        Self {
            pages: HashMap::new(),
            sink,
            current: None,
            log: Arc::new(Mutex::new(EngineLog::default())),
        }
    }

    pub fn page(mut self, url: &str, page: ScriptedPage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }

    pub fn log(&self) -> Arc<Mutex<EngineLog>> {
        Arc::clone(&self.log)
    }

    fn current_page(&self) -> Option<&ScriptedPage> {
        self.current.as_ref().and_then(|url| self.pages.get(url))
    }
}

#[async_trait]
impl PageEngine for ScriptedEngine {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        self.log.lock().unwrap().navigations.push(url.to_string());

        let Some(page) = self.pages.get(url).cloned() else {
            // Browsers render error pages, so an unknown URL still loads.
            self.sink.on_request(url);
            self.sink.on_response(url, 404);
            self.current = Some(url.to_string());
            return Ok(());
        };

        match page.failure {
            Some(Failure::Navigation) => {
                self.sink.on_request(url);
                return Err(ScanError::Navigation {
                    url: url.to_string(),
                    reason: "net::ERR_ABORTED".to_string(),
                });
            }
            Some(Failure::Fatal) => {
                return Err(ScanError::EngineClosed("browser crashed".to_string()));
            }
            Some(Failure::Hang) => {
                std::future::pending::<()>().await;
            }
            None => {}
        }

        let mut traffic = vec![(url.to_string(), page.status)];
        traffic.extend(page.subresources.iter().cloned());
        if page.deferred_events {
            let sink = self.sink.clone();
            tokio::spawn(async move {
                for (resource, status) in traffic {
                    sink.on_request(resource.clone());
                    sink.on_response(resource, status);
                }
            });
        } else {
            for (resource, status) in traffic {
                self.sink.on_request(resource.clone());
                self.sink.on_response(resource, status);
            }
        }
        self.current = Some(url.to_string());
        Ok(())
    }

    async fn anchors(&mut self) -> Result<Vec<Anchor>> {
        Ok(self
            .current_page()
            .map(|page| page.anchors.clone())
            .unwrap_or_default())
    }

    async fn current_url(&mut self) -> Result<String> {
        let current = self
            .current
            .clone()
            .ok_or_else(|| ScanError::Other("nothing loaded".to_string()))?;
        Ok(self
            .current_page()
            .and_then(|page| page.final_url.clone())
            .unwrap_or(current))
    }

    async fn evaluate_origin(&mut self) -> Result<String> {
        self.log.lock().unwrap().origin_calls += 1;
        if self.current_page().is_some_and(|page| page.origin_fails) {
            return Err(ScanError::Evaluation("execution context destroyed".to_string()));
        }
        let current = self.current_url().await?;
        let url = Url::parse(&current).map_err(|e| ScanError::Evaluation(e.to_string()))?;
        Ok(url.origin().ascii_serialization())
    }
}
