//! Crate-wide error taxonomy.
//!
//! Mirrors the error classes a run can produce: configuration and index
//! persistence failures are fatal (propagated to `main` and exit 1); fetch,
//! extraction and validation failures are isolated per page and recorded in
//! a site's `errors` list instead of bubbling out (see `orchestrator`).

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CrawlError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("fetch error for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("page not found: {0}")]
    NotFound(String),

    #[error("extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    #[error("validation failed for {url}: {reason}")]
    Validation { url: String, reason: String },

    #[error("index store error: {0}")]
    IndexIo(String),

    #[error("run cancelled")]
    Cancelled,
}

pub type CrawlResult<T> = Result<T, CrawlError>;

impl From<std::io::Error> for CrawlError {
    fn from(err: std::io::Error) -> Self {
        Self::IndexIo(err.to_string())
    }
}

impl From<serde_json::Error> for CrawlError {
    fn from(err: serde_json::Error) -> Self {
        Self::IndexIo(err.to_string())
    }
}
