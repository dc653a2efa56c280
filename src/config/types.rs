//! Site configuration types (spec §3, §6).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_max_depth() -> u32 {
    3
}
fn default_max_pages() -> u32 {
    100
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Selectors {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Selectors {
    pub fn title_list(&self) -> Vec<&str> {
        split_selector_list(&self.title)
    }

    pub fn content_list(&self) -> Vec<&str> {
        split_selector_list(&self.content)
    }
}

fn split_selector_list(s: &str) -> Vec<&str> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// One documentation site as configured for a run. Immutable for the
/// duration of the run (spec §3 "Lifecycle").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Configuration-file key; filled in by the loader from the map key.
    #[serde(skip)]
    pub key: String,

    pub name: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    #[serde(default = "default_max_depth", rename = "maxDepth")]
    pub max_depth: u32,
    #[serde(default = "default_max_pages", rename = "maxPages")]
    pub max_pages: u32,

    #[serde(default)]
    pub selectors: Selectors,

    #[serde(default, rename = "excludePatterns")]
    pub exclude_patterns: Vec<String>,

    #[serde(default, rename = "seedUrls")]
    pub seed_urls: Vec<String>,

    #[serde(default, rename = "type")]
    pub site_type: Option<String>,
    #[serde(default, rename = "fileUrl")]
    pub file_url: Option<String>,
}

impl SiteConfig {
    pub fn is_single_file(&self) -> bool {
        self.site_type.as_deref() == Some("single-file")
    }
}

/// The structured configuration input of spec §6: a single unit keyed by
/// site, used whole as the fingerprint input.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RunConfig {
    #[serde(flatten)]
    pub sites: HashMap<String, SiteConfig>,
}
