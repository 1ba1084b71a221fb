//! Passive record of the network traffic a page load triggers.
//!
//! The page engine pushes events through a [`NetworkEventSink`] from its own
//! tasks; the crawler owns the [`NetworkObserver`] and is the only consumer,
//! folding queued events into the [`NetworkLedger`] whenever it drains.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Request { url: String },
    Response { url: String, status: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub url: String,
    pub status: u16,
}

/// Deduplicated request URLs and first-seen response statuses.
#[derive(Debug, Default, Clone)]
pub struct NetworkLedger {
    requests: Vec<String>,
    request_index: HashSet<String>,
    responses: Vec<ResponseRecord>,
    response_index: HashMap<String, u16>,
}

impl NetworkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, url: &str) -> bool {
        if url.is_empty() || self.request_index.contains(url) {
            return false;
        }
        self.request_index.insert(url.to_string());
        self.requests.push(url.to_string());
        true
    }

    /// A response URL seen twice keeps its first status.
    pub fn record_response(&mut self, url: &str, status: u16) -> bool {
        if url.is_empty() || self.response_index.contains_key(url) {
            return false;
        }
        if !(100..=599).contains(&status) {
            warn!("Response for {} carried unusual status {}", url, status);
        }
        self.response_index.insert(url.to_string(), status);
        self.responses.push(ResponseRecord {
            url: url.to_string(),
            status,
        });
        true
    }

    pub fn apply(&mut self, event: NetworkEvent) {
        match event {
            NetworkEvent::Request { url } => {
                self.record_request(&url);
            }
            NetworkEvent::Response { url, status } => {
                self.record_response(&url, status);
            }
        }
    }

    pub fn requests(&self) -> &[String] {
        &self.requests
    }

    pub fn responses(&self) -> &[ResponseRecord] {
        &self.responses
    }

    pub fn has_request(&self, url: &str) -> bool {
        self.request_index.contains(url)
    }

    pub fn status_of(&self, url: &str) -> Option<u16> {
        self.response_index.get(url).copied()
    }

    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }
}

/// Sending half handed to the page engine. Cheap to clone; never fails
/// towards the caller.
#[derive(Debug, Clone)]
pub struct NetworkEventSink {
    tx: UnboundedSender<NetworkEvent>,
}

impl NetworkEventSink {
    pub fn on_request(&self, url: impl Into<String>) {
        self.send(NetworkEvent::Request { url: url.into() });
    }

    pub fn on_response(&self, url: impl Into<String>, status: u16) {
        self.send(NetworkEvent::Response {
            url: url.into(),
            status,
        });
    }

    fn send(&self, event: NetworkEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("Network observer gone, dropping event {:?}", e.0);
        }
    }
}

pub struct NetworkObserver {
    rx: UnboundedReceiver<NetworkEvent>,
    sink: NetworkEventSink,
    ledger: NetworkLedger,
}

impl NetworkObserver {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            rx,
            sink: NetworkEventSink { tx },
            ledger: NetworkLedger::new(),
        }
    }

    pub fn sink(&self) -> NetworkEventSink {
        self.sink.clone()
    }

    /// Fold every queued event into the ledger. Returns how many events were
    /// consumed.
    pub fn drain(&mut self) -> usize {
        let mut consumed = 0;
        while let Ok(event) = self.rx.try_recv() {
            self.ledger.apply(event);
            consumed += 1;
        }
        consumed
    }

    pub fn ledger(&self) -> &NetworkLedger {
        &self.ledger
    }

    pub fn into_ledger(mut self) -> NetworkLedger {
        self.drain();
        self.ledger
    }
}

impl Default for NetworkObserver {
    fn default() -> Self {
        Self::new()
    }
}
