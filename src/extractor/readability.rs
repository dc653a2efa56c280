//! A condensed readability-style article-detection pass (spec §4.4 item 1).
//!
//! The teacher's production pipeline reaches for a third-party readability
//! implementation (pulled in via its markdown-converter stack); spec §4.4
//! allows "any equivalent" algorithm. This is the classic Arc90-derived
//! heuristic scaled down to what documentation pages need: score candidate
//! containers by paragraph density and comma count, penalize link-heavy
//! (nav-like) containers, and return the highest scorer.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

static CANDIDATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, article, section, main, td").unwrap());
static PARAGRAPH_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p").unwrap());
static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());

fn link_density(el: ElementRef<'_>) -> f64 {
    let total_len: usize = el.text().map(|t| t.len()).sum();
    if total_len == 0 {
        return 0.0;
    }
    let link_len: usize = el
        .select(&LINK_SELECTOR)
        .flat_map(|a| a.text())
        .map(|t| t.len())
        .sum();
    link_len as f64 / total_len as f64
}

fn candidate_score(el: ElementRef<'_>) -> f64 {
    let text: String = el.text().collect();
    let paragraph_count = el.select(&PARAGRAPH_SELECTOR).count();
    let comma_count = text.matches(',').count();
    let length_bonus = (text.len() as f64 / 100.0).min(3.0);

    let mut score = (paragraph_count as f64) * 25.0 + comma_count as f64 + length_bonus;
    score *= 1.0 - link_density(el);
    score
}

/// Returns the inner HTML of the highest-scoring candidate container, or
/// `None` if no container scores above zero (e.g. an essentially-empty
/// document).
pub fn find_main_candidate(doc: &Html) -> Option<String> {
    doc.select(&CANDIDATE_SELECTOR)
        .map(|el| (candidate_score(el), el))
        .filter(|(score, _)| *score > 0.0)
        .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(_, el)| el.inner_html())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_dense_article_over_a_nav() {
        let html = r#"
            <html><body>
              <nav><a href="/a">a</a><a href="/b">b</a><a href="/c">c</a></nav>
              <article>
                <p>This is the first paragraph with a decent amount of prose, commas, and detail.</p>
                <p>This is the second paragraph, continuing on, with more explanation and content.</p>
              </article>
            </body></html>
        "#;
        let doc = Html::parse_document(html);
        let candidate = find_main_candidate(&doc).unwrap();
        assert!(candidate.contains("first paragraph"));
        assert!(!candidate.contains("href"));
    }

    #[test]
    fn empty_document_yields_none() {
        let doc = Html::parse_document("<html><body></body></html>");
        assert!(find_main_candidate(&doc).is_none());
    }
}
