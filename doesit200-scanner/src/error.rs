use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Could not launch browser engine: {0}")]
    EngineLaunch(String),

    #[error("Browser engine is no longer available: {0}")]
    EngineClosed(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Navigation to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Script evaluation failed: {0}")]
    Evaluation(String),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

impl ScanError {
    /// Fatal errors abort the whole crawl; everything else only costs the URL
    /// or anchor it concerns.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScanError::EngineLaunch(_) | ScanError::EngineClosed(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
