pub mod chromium;
pub mod config;
pub mod crawler;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod link;
pub mod network;
pub mod result;
pub mod scope;
pub mod visited;

pub use chromium::{ChromiumEngine, EngineOptions};
pub use config::CrawlConfig;
pub use crawler::{Crawler, ProgressCallback, Shutdown};
pub use engine::{Anchor, PageEngine};
pub use error::ScanError;
pub use network::{NetworkEventSink, NetworkLedger, NetworkObserver, ResponseRecord};
pub use result::{CrawlOutcome, NavigationFailure};
pub use scope::ScopePolicy;
