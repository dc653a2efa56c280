//! Index Store: the persisted structural page index (spec §3, §4.10, §6).

use crate::cli::EnvFlags;
use crate::config::ConfigFingerprint;
use crate::error::{CrawlError, CrawlResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "estimatedWords")]
    pub estimated_words: usize,
    #[serde(rename = "lastModified")]
    pub last_modified: DateTime<Utc>,
    pub breadcrumbs: Vec<String>,
    #[serde(rename = "siteKey")]
    pub site_key: String,
    #[serde(rename = "siteName")]
    pub site_name: String,
    pub depth: u32,
    #[serde(rename = "crawledAt")]
    pub crawled_at: DateTime<Utc>,
}

impl PageRecord {
    /// Build the `description` field: the first ~200 characters of
    /// extracted text plus an ellipsis (spec §3).
    pub fn synthesize_description(content: &str) -> String {
        let trimmed = content.trim();
        let truncated: String = trimmed.chars().take(200).collect();
        if trimmed.chars().count() > 200 {
            format!("{truncated}…")
        } else {
            truncated
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteStats {
    #[serde(rename = "totalPages")]
    pub total_pages: usize,
    #[serde(rename = "averageWords")]
    pub average_words: f64,
    pub duration: f64,
    #[serde(rename = "requestCount")]
    pub request_count: u64,
    #[serde(rename = "averageResponseTime")]
    pub average_response_time: f64,
    #[serde(rename = "pagesPerSecond")]
    pub pages_per_second: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteIndexEntry {
    pub name: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    pub pages: Vec<PageRecord>,
    #[serde(rename = "lastCrawled")]
    pub last_crawled: DateTime<Utc>,
    pub stats: SiteStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Index {
    pub generated: DateTime<Utc>,
    #[serde(rename = "configHash")]
    pub config_hash: ConfigFingerprint,
    pub sites: HashMap<String, SiteIndexEntry>,
}

impl Index {
    pub fn empty(config_hash: ConfigFingerprint) -> Self {
        Self {
            generated: Utc::now(),
            config_hash,
            sites: HashMap::new(),
        }
    }
}

/// Load the index at `path`. If the stored `configHash` differs from
/// `expected_hash`, the result is treated as an empty-sites structure (the
/// current hash is preserved for the caller to write back).
pub async fn load(path: &Path, expected_hash: &ConfigFingerprint) -> CrawlResult<Index> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(Index::empty(expected_hash.clone()));
        }
        Err(e) => return Err(e.into()),
    };

    let index: Index = serde_json::from_str(&contents)?;
    if &index.config_hash != expected_hash {
        return Ok(Index::empty(expected_hash.clone()));
    }
    Ok(index)
}

/// Persist `index` to `path`. Writes to a `NamedTempFile` in the same
/// directory and persists (renames) it into place outside of CI; in CI
/// writes the canonical path directly (spec §4.10). `env` supplies the
/// already-computed `CI`/compact-mode flags rather than re-reading the
/// environment here.
pub async fn save(path: &Path, index: &Index, env: &EnvFlags) -> CrawlResult<()> {
    let rendered = if env.compact_index {
        serde_json::to_string(index)?
    } else {
        serde_json::to_string_pretty(index)?
    };

    if env.ci {
        tokio::fs::write(path, rendered).await?;
        return Ok(());
    }

    let dir = path.parent().unwrap_or_else(|| Path::new(".")).to_path_buf();
    tokio::fs::create_dir_all(&dir).await?;

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_via_temp_file(&dir, &path, &rendered))
        .await
        .map_err(|e| CrawlError::IndexIo(format!("index write task panicked: {e}")))?
}

/// Write `rendered` to a `NamedTempFile` inside `dir` and atomically rename
/// it onto `path`. Runs on a blocking thread since `tempfile`'s file
/// operations are synchronous.
fn write_via_temp_file(dir: &Path, path: &Path, rendered: &str) -> CrawlResult<()> {
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| CrawlError::IndexIo(format!("create temp file in {dir:?}: {e}")))?;
    tmp.write_all(rendered.as_bytes())
        .map_err(|e| CrawlError::IndexIo(format!("write temp file: {e}")))?;
    tmp.persist(path)
        .map_err(|e| CrawlError::IndexIo(format!("persist {path:?}: {e}")))?;
    Ok(())
}
