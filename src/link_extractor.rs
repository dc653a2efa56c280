//! Link Extractor: enumerate anchors, resolve relatively against the page
//! URL, drop external/fragment/excluded/binary-asset links (spec §4.7).

use crate::page_url::PageUrl;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".zip", ".tar", ".gz", ".png", ".jpg", ".gif", ".svg", ".ico", ".json", ".xml", ".js",
    ".css",
];

const ASSET_PREFIXES: &[&str] = &[
    "/assets/", "/static/", "/images/", "/img/", "/js/", "/css/",
];

fn is_binary_asset(path: &str) -> bool {
    let lower = path.to_lowercase();
    if BINARY_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
        return true;
    }
    ASSET_PREFIXES.iter().any(|prefix| lower.starts_with(prefix))
}

/// Extract and filter every anchor href in `html`, resolved against `page_url`.
/// Returns the deduplicated set, in DOM-traversal (insertion) order.
pub fn extract_links(
    html: &str,
    page_url: &PageUrl,
    site_base: &PageUrl,
    exclude_patterns: &[Regex],
) -> Vec<PageUrl> {
    let doc = Html::parse_document(html);
    let mut seen = BTreeSet::new();
    let mut ordered = Vec::new();

    for anchor in doc.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let trimmed = href.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if PageUrl::had_fragment_in(trimmed) {
            continue;
        }
        let Ok(resolved) = page_url.resolve(trimmed) else {
            continue;
        };
        if !resolved.same_origin(site_base) {
            continue;
        }
        if exclude_patterns.iter().any(|re| re.is_match(resolved.as_str())) {
            continue;
        }
        if is_binary_asset(resolved.path()) {
            continue;
        }
        if seen.insert(resolved.as_str().to_string()) {
            ordered.push(resolved);
        }
    }

    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> PageUrl {
        PageUrl::parse("https://docs.example.test/").unwrap()
    }

    #[test]
    fn rejects_external_origin() {
        let page = PageUrl::parse("https://docs.example.test/guide.html").unwrap();
        let html = r#"<a href="https://other.test/x">x</a>"#;
        let links = extract_links(html, &page, &base(), &[]);
        assert!(links.is_empty());
    }

    #[test]
    fn rejects_fragment_only_and_bare_fragment() {
        let page = PageUrl::parse("https://docs.example.test/guide.html").unwrap();
        let html = r#"<a href="#section">x</a><a href="/other#frag">y</a>"#;
        let links = extract_links(html, &page, &base(), &[]);
        assert!(links.is_empty());
    }

    #[test]
    fn rejects_binary_assets_and_asset_prefixes() {
        let page = PageUrl::parse("https://docs.example.test/guide.html").unwrap();
        let html = r#"
            <a href="/manual.pdf">pdf</a>
            <a href="/assets/thing">asset</a>
            <a href="/static/thing">static</a>
        "#;
        let links = extract_links(html, &page, &base(), &[]);
        assert!(links.is_empty());
    }

    #[test]
    fn resolves_relative_against_page_not_base() {
        let page = PageUrl::parse("https://docs.example.test/deep/nested/page.html").unwrap();
        let html = r#"<a href="sibling.html">sibling</a>"#;
        let links = extract_links(html, &page, &base(), &[]);
        assert_eq!(links.len(), 1);
        assert_eq!(
            links[0].as_str(),
            "https://docs.example.test/deep/nested/sibling.html"
        );
    }

    #[test]
    fn applies_exclude_patterns() {
        let page = PageUrl::parse("https://docs.example.test/guide.html").unwrap();
        let html = r#"<a href="/internal/draft-page">draft</a><a href="/guide/real">real</a>"#;
        let pattern = Regex::new("/internal/").unwrap();
        let links = extract_links(html, &page, &base(), std::slice::from_ref(&pattern));
        assert_eq!(links.len(), 1);
        assert!(links[0].as_str().ends_with("/guide/real"));
    }

    #[test]
    fn dedups_while_preserving_first_seen_order() {
        let page = PageUrl::parse("https://docs.example.test/guide.html").unwrap();
        let html = r#"<a href="/a">a1</a><a href="/b">b</a><a href="/a">a2</a>"#;
        let links = extract_links(html, &page, &base(), &[]);
        let urls: Vec<&str> = links.iter().map(|u| u.as_str()).collect();
        assert_eq!(urls, vec!["https://docs.example.test/a", "https://docs.example.test/b"]);
    }
}
