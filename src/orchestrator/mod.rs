//! Crawl Orchestrator: per-site DFS traversal with depth/page limits,
//! existing-index reuse, and per-page telemetry (spec §4.9).

pub mod state;
pub mod telemetry;

use crate::config::SiteConfig;
use crate::discovery;
use crate::error::{CrawlError, CrawlResult};
use crate::extractor::{self, ExtractionResult};
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::index_store::{PageRecord, SiteIndexEntry};
use crate::link_extractor::extract_links;
use crate::page_url::PageUrl;
use crate::validator::{self, ThresholdConfig};
use chrono::Utc;
use convert_case::{Case, Casing};
use state::CrawlState;
use std::time::Instant;
use telemetry::Telemetry;

const TOP_SEED_COUNT: usize = 15;

/// Signals whether the run has been cancelled; checked between loop
/// iterations (spec §4.9 "Cancellation").
pub trait CancellationSignal {
    fn is_cancelled(&self) -> bool;
}

impl CancellationSignal for std::sync::atomic::AtomicBool {
    fn is_cancelled(&self) -> bool {
        self.load(std::sync::atomic::Ordering::Relaxed)
    }
}

fn breadcrumbs_for(url: &PageUrl) -> Vec<String> {
    url.path_segments()
        .iter()
        .map(|seg| seg.replace(['-', '_'], " ").to_case(Case::Title))
        .collect()
}

fn looks_like_not_found(title: &str, content: &str) -> bool {
    let lower_title = title.to_lowercase();
    if lower_title.contains("404") || lower_title.contains("not found") {
        return true;
    }
    let trimmed = content.trim();
    let word_count = trimmed.split_whitespace().count();
    let lower_content = trimmed.to_lowercase();
    word_count < 30 && (lower_content.contains("404") || lower_content.contains("not found"))
}

fn build_record(
    site: &SiteConfig,
    url: &PageUrl,
    depth: u32,
    title: String,
    extraction: &ExtractionResult,
    breadcrumbs: Vec<String>,
) -> PageRecord {
    PageRecord {
        url: url.as_str().to_string(),
        title,
        description: PageRecord::synthesize_description(&extraction.content),
        estimated_words: extraction.word_count,
        last_modified: Utc::now(),
        breadcrumbs,
        site_key: site.key.clone(),
        site_name: site.name.clone(),
        depth,
        crawled_at: Utc::now(),
    }
}

async fn extract_and_accept(
    body: &str,
    is_plain_text: bool,
    url: &PageUrl,
    site: &SiteConfig,
    thresholds: &ThresholdConfig,
) -> Result<(ExtractionResult, String), CrawlError> {
    let extraction = if is_plain_text {
        extractor::extract_plain_text(body)
    } else {
        let content_selectors = site.selectors.content_list();
        extractor::extract(body, &content_selectors)
    };

    if extraction.word_count < 10 {
        return Err(CrawlError::Extraction {
            url: url.to_string(),
            reason: "below minimum word count".to_string(),
        });
    }

    let report = validator::validate(&extraction.content, thresholds);
    if !report.passed {
        return Err(CrawlError::Validation {
            url: url.to_string(),
            reason: "failed quality threshold gate".to_string(),
        });
    }

    let title = if is_plain_text {
        extraction.content.lines().next().unwrap_or("Untitled").to_string()
    } else {
        let doc = scraper::Html::parse_document(body);
        let title_selectors = site.selectors.title_list();
        extractor::extract_title(&doc, &title_selectors, url.path())
    };

    Ok((extraction, title))
}

/// The result of crawling one site: its updated index entry plus the
/// per-page errors accumulated along the way (spec §7 "per-page errors are
/// isolated" — they are reported, never propagated).
pub struct CrawlOutcome {
    pub entry: SiteIndexEntry,
    pub errors: Vec<(String, CrawlError)>,
}

/// Crawl one site, producing its updated index entry. `existing` is the
/// site's prior [`SiteIndexEntry`] when the configuration fingerprint
/// still matches; `None` forces a full re-crawl.
pub async fn crawl_site(
    site: &SiteConfig,
    fetcher: &Fetcher,
    existing: Option<SiteIndexEntry>,
    exclude_patterns: &[regex::Regex],
    cancel: &dyn CancellationSignal,
) -> CrawlResult<CrawlOutcome> {
    // A fingerprint-matched existing entry is reused verbatim: the index is a
    // cache keyed purely by config fingerprint, not an incremental diff, so
    // an unchanged config performs zero fetches (spec §8 scenario 4).
    if let Some(prior) = existing {
        return Ok(CrawlOutcome { entry: prior, errors: Vec::new() });
    }

    let max_pages = site.max_pages.max(1) as usize;
    let mut state = CrawlState::new(max_pages);

    let site_base = PageUrl::parse(&site.base_url)
        .map_err(|e| crate::error::CrawlError::Config(format!("invalid baseUrl: {e}")))?;
    let mut telemetry = Telemetry::start();
    let thresholds = ThresholdConfig::default();

    if site.is_single_file() {
        let Some(file_url) = &site.file_url else {
            return Err(crate::error::CrawlError::Config(
                "single-file site missing fileUrl".to_string(),
            ));
        };
        let url = PageUrl::parse(file_url)
            .map_err(|e| crate::error::CrawlError::Config(format!("invalid fileUrl: {e}")))?;
        let started = Instant::now();
        if let FetchOutcome::Ok { body, is_plain_text, .. } = fetcher.fetch(&url).await {
            telemetry.record_request(started.elapsed());
            match extract_and_accept(&body, is_plain_text, &url, site, &thresholds).await {
                Ok((extraction, title)) => {
                    state.pages.push(build_record(
                        site,
                        &url,
                        0,
                        title,
                        &extraction,
                        vec![site.name.clone()],
                    ));
                }
                Err(e) => state.errors.push((url.to_string(), e)),
            }
        } else {
            telemetry.record_request(started.elapsed());
        }
        let total_words = state.pages.iter().map(|p| p.estimated_words).sum();
        return Ok(CrawlOutcome {
            entry: SiteIndexEntry {
                name: site.name.clone(),
                base_url: site.base_url.clone(),
                pages: state.pages.clone(),
                last_crawled: Utc::now(),
                stats: telemetry.finish(state.pages.len(), total_words),
            },
            errors: state.errors.clone(),
        });
    }

    let seed_urls = resolve_seed_urls(site, &site_base)?;
    let mut entry_paths = Vec::new();
    for seed in &seed_urls {
        if cancel.is_cancelled() {
            break;
        }
        let mut discovered = discovery::discover(fetcher, seed, &site_base).await;
        entry_paths.push(seed.clone());
        entry_paths.append(&mut discovered);
    }
    entry_paths.truncate(TOP_SEED_COUNT);

    for seed in entry_paths.iter().rev() {
        let depth = seed.path_segments().len() as u32;
        state.enqueue_if_new(seed.clone(), depth);
    }

    while let Some((url, depth)) = state.stack.pop() {
        if cancel.is_cancelled() {
            break;
        }
        if !state.has_capacity() {
            break;
        }
        if state.was_visited(&url) || depth > site.max_depth {
            continue;
        }

        state.mark_visited(&url);
        let started = Instant::now();
        let outcome = fetcher.fetch(&url).await;
        telemetry.record_request(started.elapsed());

        let (body, is_plain_text) = match outcome {
            FetchOutcome::Ok { body, is_plain_text, .. } => (body, is_plain_text),
            FetchOutcome::NotFound => {
                state.errors.push((url.to_string(), CrawlError::NotFound(url.to_string())));
                continue;
            }
            FetchOutcome::Transient(reason) => {
                state
                    .errors
                    .push((url.to_string(), CrawlError::Fetch { url: url.to_string(), reason }));
                continue;
            }
            FetchOutcome::Cancelled => break,
        };

        let (extraction, title) =
            match extract_and_accept(&body, is_plain_text, &url, site, &thresholds).await {
                Ok(v) => v,
                Err(e) => {
                    state.errors.push((url.to_string(), e));
                    continue;
                }
            };

        if looks_like_not_found(&title, &extraction.content) {
            continue;
        }

        state.pages.push(build_record(
            site,
            &url,
            depth,
            title,
            &extraction,
            breadcrumbs_for(&url),
        ));

        if state.has_capacity() && depth < site.max_depth && !is_plain_text {
            let links = extract_links(&body, &url, &site_base, exclude_patterns);
            for link in links {
                state.enqueue_if_new(link, depth + 1);
            }
        }
    }

    let total_words = state.pages.iter().map(|p| p.estimated_words).sum();
    Ok(CrawlOutcome {
        entry: SiteIndexEntry {
            name: site.name.clone(),
            base_url: site.base_url.clone(),
            pages: state.pages.clone(),
            last_crawled: Utc::now(),
            stats: telemetry.finish(state.pages.len(), total_words),
        },
        errors: state.errors.clone(),
    })
}

fn resolve_seed_urls(site: &SiteConfig, site_base: &PageUrl) -> CrawlResult<Vec<PageUrl>> {
    if site.seed_urls.is_empty() {
        return Ok(vec![site_base.clone()]);
    }
    site.seed_urls
        .iter()
        .map(|seed| {
            site_base
                .resolve(seed)
                .map_err(|e| crate::error::CrawlError::Config(format!("invalid seed URL '{seed}': {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breadcrumbs_title_case_path_segments() {
        let url = PageUrl::parse("https://docs.example.test/getting-started/quick_setup").unwrap();
        assert_eq!(breadcrumbs_for(&url), vec!["Getting Started", "Quick Setup"]);
    }

    #[test]
    fn detects_not_found_by_title() {
        assert!(looks_like_not_found("404 Not Found", "short"));
        assert!(looks_like_not_found("Page Missing", "sorry, not found here"));
    }

    #[test]
    fn long_content_with_404_token_is_not_flagged() {
        let long_content = "word ".repeat(100) + "this page discusses HTTP 404 responses in depth";
        assert!(!looks_like_not_found("API Errors", &long_content));
    }
}
