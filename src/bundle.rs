//! Bundle generator: consumes PageRecords plus re-fetched content to emit
//! the llms.txt-style plain-text bundle (spec §6 "Bundle output format").

use crate::config::SiteConfig;
use crate::extractor::{self, ExtractionResult};
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::index_store::PageRecord;
use crate::page_url::PageUrl;
use chrono::{DateTime, Utc};

struct BundleSection {
    title: String,
    url: String,
    words: usize,
    method: String,
    reason: String,
    content: String,
}

/// Re-fetch `record`'s content and re-run extraction so the bundle carries
/// fresh sanitized text rather than the index's description-only summary
/// (spec §3: "PageRecord does not store full content").
async fn resolve_section(
    fetcher: &Fetcher,
    site: &SiteConfig,
    record: &PageRecord,
) -> Option<BundleSection> {
    let url = PageUrl::parse(&record.url).ok()?;
    let FetchOutcome::Ok { body, is_plain_text, .. } = fetcher.fetch(&url).await else {
        return None;
    };

    let extraction: ExtractionResult = if is_plain_text {
        extractor::extract_plain_text(&body)
    } else {
        let content_selectors = site.selectors.content_list();
        extractor::extract(&body, &content_selectors)
    };

    Some(BundleSection {
        title: record.title.clone(),
        url: record.url.clone(),
        words: extraction.word_count,
        method: extraction.method.as_str().to_string(),
        reason: extraction.reason.clone(),
        content: extraction.content,
    })
}

/// Build the bundle text for `records`, re-fetching each page's content
/// through `fetcher`. `quality_filtered` lists URLs dropped during the
/// crawl for falling below the quality/validation threshold.
pub async fn build_bundle(
    collection_name: &str,
    site: &SiteConfig,
    records: &[PageRecord],
    quality_filtered: &[String],
    fetcher: &Fetcher,
    generated_at: DateTime<Utc>,
) -> String {
    let mut sections = Vec::new();
    for record in records {
        if let Some(section) = resolve_section(fetcher, site, record).await {
            sections.push(section);
        }
    }

    let total_words: usize = sections.iter().map(|s| s.words).sum();
    render_bundle(collection_name, &sections, quality_filtered, generated_at, total_words)
}

fn render_bundle(
    collection_name: &str,
    sections: &[BundleSection],
    quality_filtered: &[String],
    generated_at: DateTime<Utc>,
    total_words: usize,
) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {collection_name}\n\n"));
    out.push_str(&format!("Generated: {}\n", generated_at.to_rfc3339()));
    out.push_str(&format!("Documents: {}\n", sections.len()));
    out.push_str(&format!("Total words: {total_words}\n\n"));

    out.push_str("## Table of Contents\n\n");
    for (i, section) in sections.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, section.title));
    }
    out.push('\n');

    for (i, section) in sections.iter().enumerate() {
        out.push_str("---\n");
        out.push_str(&format!("# {}. {}\n", i + 1, section.title));
        out.push_str(&format!("Source: {}\n", section.url));
        out.push_str(&format!("Words: {}\n", section.words));
        out.push_str(&format!("Extraction Method: {}\n", section.method));
        out.push_str(&format!("Extraction Reason: {}\n\n", section.reason));
        out.push_str(&section.content);
        out.push_str("\n\n");
    }

    if !quality_filtered.is_empty() {
        out.push_str("---\n");
        out.push_str("# Excluded (below quality threshold)\n\n");
        for url in quality_filtered {
            out.push_str(&format!("- {url}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, words: usize) -> BundleSection {
        BundleSection {
            title: title.to_string(),
            url: format!("https://docs.example.test/{title}"),
            words,
            method: "readability".to_string(),
            reason: "ok".to_string(),
            content: "Some sanitized body text.".to_string(),
        }
    }

    #[test]
    fn renders_header_toc_and_sections_with_separators() {
        let sections = vec![section("intro", 120), section("setup", 80)];
        let generated = "2026-01-01T00:00:00Z".parse().unwrap();
        let out = render_bundle("Docs", &sections, &[], generated, 200);

        assert!(out.contains("# Docs"));
        assert!(out.contains("Documents: 2"));
        assert!(out.contains("Total words: 200"));
        assert!(out.contains("1. intro"));
        assert!(out.contains("2. setup"));
        assert!(out.contains("# 1. intro"));
        assert!(out.contains("Source: https://docs.example.test/intro"));
        assert!(out.matches("---").count() >= 2);
        assert!(!out.contains('<'));
    }

    #[test]
    fn lists_quality_filtered_urls_in_tail_section() {
        let sections = vec![section("intro", 120)];
        let generated = "2026-01-01T00:00:00Z".parse().unwrap();
        let filtered = vec!["https://docs.example.test/thin-page".to_string()];
        let out = render_bundle("Docs", &sections, &filtered, generated, 120);
        assert!(out.contains("Excluded (below quality threshold)"));
        assert!(out.contains("https://docs.example.test/thin-page"));
    }
}
