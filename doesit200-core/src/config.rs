//! Crawl configuration: JSON config files holding a list of selectable
//! entries, and the conversion of an entry into a scanner `CrawlConfig`.

use doesit200_scanner::{CrawlConfig, ScopePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

pub const DEFAULT_SLEEP_SECONDS: u16 = 15;
pub const DEFAULT_MAX_DEPTH: u8 = 1;
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not decode config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file {0} contains no entries")]
    Empty(PathBuf),

    #[error("invalid choice: {choice} (expected 1-{available})")]
    InvalidChoice { choice: usize, available: usize },

    #[error("no URL to crawl was provided")]
    MissingUrl,

    #[error("invalid URL {0}")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

fn default_sleep() -> u16 {
    DEFAULT_SLEEP_SECONDS
}

fn default_depth() -> u8 {
    DEFAULT_MAX_DEPTH
}

/// One selectable crawl setup, as stored in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub url: String,
    /// Seconds to wait after each navigation.
    #[serde(default = "default_sleep")]
    pub sleep: u16,
    #[serde(default = "default_depth")]
    pub depth: u8,
    #[serde(default)]
    pub include_domain_wildcards: Vec<String>,
    #[serde(default)]
    pub enforce_domain_wildcards: bool,
}

impl ConfigEntry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sleep: DEFAULT_SLEEP_SECONDS,
            depth: DEFAULT_MAX_DEPTH,
            include_domain_wildcards: Vec::new(),
            enforce_domain_wildcards: false,
        }
    }

    pub fn scope(&self) -> ScopePolicy {
        if self.enforce_domain_wildcards {
            ScopePolicy::Restrict
        } else {
            ScopePolicy::FollowAll
        }
    }

    pub fn into_crawl_config(self) -> Result<CrawlConfig> {
        let root = parse_root_url(&self.url)?;
        let scope = self.scope();
        Ok(CrawlConfig::new(root)
            .with_sleep(Duration::from_secs(u64::from(self.sleep)))
            .with_max_depth(self.depth)
            .with_include_domain_wildcards(self.include_domain_wildcards)
            .with_scope(scope))
    }
}

/// Parse the root URL of a crawl. Bare hosts such as `example.com` get an
/// `https://` scheme; a fragment is dropped.
pub fn parse_root_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::MissingUrl);
    }

    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = Url::parse(&candidate)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", raw, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': only http and https URLs can be crawled",
            raw
        )));
    }
    url.set_fragment(None);
    Ok(url)
}

/// Load every entry of a JSON config file. `~` in the path is expanded.
pub fn load_entries(path: &Path) -> Result<Vec<ConfigEntry>> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    debug!("Loading crawl configurations from {}", path.display());

    let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let entries: Vec<ConfigEntry> =
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.clone(),
            source,
        })?;

    if entries.is_empty() {
        return Err(ConfigError::Empty(path));
    }
    Ok(entries)
}

/// Pick an entry by its 1-based position.
pub fn select_entry(entries: &[ConfigEntry], choice: usize) -> Result<ConfigEntry> {
    if choice == 0 || choice > entries.len() {
        return Err(ConfigError::InvalidChoice {
            choice,
            available: entries.len(),
        });
    }
    Ok(entries[choice - 1].clone())
}

/// Numbered listing shown before asking for a selection.
pub fn describe_entries(entries: &[ConfigEntry]) -> Vec<String> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "{}: URL: {}, Sleep: {} seconds, Depth: {}",
                i + 1,
                entry.url,
                entry.sleep,
                entry.depth
            )
        })
        .collect()
}
