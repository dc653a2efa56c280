//! Loads and validates the run configuration document (spec §6, §7).
//!
//! Missing file, malformed JSON, a missing `baseUrl`, or an invalid
//! `excludePatterns` regex is a fatal `CrawlError::Config` — per spec §7
//! these are the only page-orchestration-adjacent errors that abort the run
//! rather than being isolated to a site or page.

use super::types::RunConfig;
use crate::error::{CrawlError, CrawlResult};
use regex::{Regex, RegexBuilder};
use std::path::Path;

/// `/body/flags` pattern strings, restricted to the portable flag subset
/// `g i m u y` (spec §6, §9). `g`, `u` and `y` have no meaning for the Rust
/// `regex` crate beyond what it already does, so they are accepted and
/// ignored; `i` and `m` map to `RegexBuilder` options.
pub fn compile_exclude_pattern(spec: &str) -> CrawlResult<Regex> {
    let (body, flags) = split_pattern(spec);
    for c in flags.chars() {
        if !"gimuy".contains(c) {
            return Err(CrawlError::Config(format!(
                "unsupported regex flag '{c}' in pattern {spec}"
            )));
        }
    }
    RegexBuilder::new(body)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .build()
        .map_err(|e| CrawlError::Config(format!("invalid exclude pattern {spec}: {e}")))
}

/// Split a `/body/flags` string into its parts. A bare regex with no
/// slash delimiters is treated as having an empty flag set.
fn split_pattern(spec: &str) -> (&str, &str) {
    if let Some(rest) = spec.strip_prefix('/') {
        if let Some(idx) = rest.rfind('/') {
            return (&rest[..idx], &rest[idx + 1..]);
        }
    }
    (spec, "")
}

pub async fn load_run_config(path: &Path) -> CrawlResult<RunConfig> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CrawlError::Config(format!("cannot read {}: {e}", path.display())))?;
    let mut config: RunConfig = serde_json::from_str(&raw)
        .map_err(|e| CrawlError::Config(format!("malformed config {}: {e}", path.display())))?;

    for (key, site) in config.sites.iter_mut() {
        site.key = key.clone();
        validate_site(site)?;
    }
    Ok(config)
}

fn validate_site(site: &super::types::SiteConfig) -> CrawlResult<()> {
    if site.is_single_file() {
        if site.file_url.as_deref().unwrap_or("").is_empty() {
            return Err(CrawlError::Config(format!(
                "site {} is type=single-file but has no fileUrl",
                site.key
            )));
        }
    } else if site.base_url.is_empty() {
        return Err(CrawlError::Config(format!(
            "site {} is missing baseUrl",
            site.key
        )));
    }
    for pattern in &site.exclude_patterns {
        compile_exclude_pattern(pattern)?;
    }
    Ok(())
}
