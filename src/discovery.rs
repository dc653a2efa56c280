//! Discovery: sibling-page inference from a seed page (spec §4.8).
//!
//! Best-effort by design — every failure path here degrades to "fewer
//! entry points found", never a hard error.

use crate::extractor;
use crate::fetcher::{FetchOutcome, Fetcher};
use crate::page_url::PageUrl;
use std::collections::HashSet;

const MAX_CANDIDATES: usize = 20;
const MAX_ACCEPTED: usize = 10;
const MAX_IN_FLIGHT: usize = 5;

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "this", "that", "from", "your", "you", "are", "not", "all",
    "can", "will", "how", "what", "when", "where", "which", "their", "have", "has", "was",
    "were", "into", "than", "then", "also", "each", "more", "some", "such", "only", "page",
    "docs", "doc", "here", "about",
];

fn basename(url: &PageUrl) -> String {
    url.path_segments().last().map(|s| s.to_string()).unwrap_or_default()
}

/// Longest common prefix over a set of strings.
fn longest_common_prefix(items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut prefix = items[0].clone();
    for item in &items[1..] {
        let common: usize = prefix
            .chars()
            .zip(item.chars())
            .take_while(|(a, b)| a == b)
            .count();
        prefix = prefix.chars().take(common).collect();
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}

/// Longest common suffix over a set of strings.
fn longest_common_suffix(items: &[String]) -> String {
    let reversed: Vec<String> = items.iter().map(|s| s.chars().rev().collect()).collect();
    let prefix = longest_common_prefix(&reversed);
    prefix.chars().rev().collect()
}

fn extract_vocabulary(text: &str) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut seen = HashSet::new();
    let mut vocab = Vec::new();
    for raw in text.split(|c: char| !c.is_alphanumeric()) {
        let word = raw.to_lowercase();
        let len = word.chars().count();
        if (3..=15).contains(&len) && !stop.contains(word.as_str()) && seen.insert(word.clone()) {
            vocab.push(word);
        }
    }
    vocab
}

/// The directory a seed URL lives in (path up to and including the final
/// `/`), used as the base for resolving candidate basenames.
fn seed_directory(url: &PageUrl) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(idx) => path[..=idx].to_string(),
        None => "/".to_string(),
    }
}

/// Run sibling-page discovery for one seed URL. Returns up to
/// [`MAX_ACCEPTED`] validated candidate URLs.
pub async fn discover(fetcher: &Fetcher, seed: &PageUrl, site_base: &PageUrl) -> Vec<PageUrl> {
    let FetchOutcome::Ok { body, is_plain_text, .. } = fetcher.fetch(seed).await else {
        return Vec::new();
    };
    if is_plain_text {
        return Vec::new();
    }

    let links = crate::link_extractor::extract_links(&body, seed, site_base, &[]);
    let section = seed.path_segments().first().map(|s| s.to_string());
    let siblings: Vec<PageUrl> = links
        .into_iter()
        .filter(|u| u.path_segments().first().map(|s| s.to_string()) == section)
        .collect();

    if siblings.is_empty() {
        return Vec::new();
    }

    let basenames: Vec<String> = siblings.iter().map(basename).collect();
    let prefix = longest_common_prefix(&basenames);
    let suffix = longest_common_suffix(&basenames);

    let reference = &basenames[0];
    if prefix.len() + suffix.len() >= reference.len() {
        // No real naming pattern — prefix/suffix would swallow the whole name.
        return Vec::new();
    }

    let extraction = extractor::extract(&body, &[]);
    let vocabulary = extract_vocabulary(&extraction.content);

    let directory = seed_directory(seed);
    let mut candidates = Vec::new();
    let mut existing: HashSet<String> = basenames.iter().cloned().collect();
    for word in vocabulary.iter().take(MAX_CANDIDATES * 2) {
        if candidates.len() >= MAX_CANDIDATES {
            break;
        }
        let candidate_name = format!("{prefix}{word}{suffix}");
        if existing.contains(&candidate_name) {
            continue;
        }
        let Ok(candidate_url) = site_base.resolve(&format!("{directory}{candidate_name}")) else {
            continue;
        };
        existing.insert(candidate_name);
        candidates.push(candidate_url);
    }

    validate_candidates(fetcher, candidates).await
}

/// Validate candidates with at most [`MAX_IN_FLIGHT`] HEAD requests
/// outstanding at once, accepting up to [`MAX_ACCEPTED`] of them.
async fn validate_candidates(fetcher: &Fetcher, candidates: Vec<PageUrl>) -> Vec<PageUrl> {
    let mut accepted = Vec::new();
    for batch in candidates.chunks(MAX_IN_FLIGHT) {
        if accepted.len() >= MAX_ACCEPTED {
            break;
        }
        let mut set = tokio::task::JoinSet::new();
        for url in batch {
            let fetcher = fetcher.clone();
            let url = url.clone();
            set.spawn(async move {
                let ok = fetcher.head_ok(&url).await;
                (url, ok)
            });
        }
        while let Some(result) = set.join_next().await {
            if let Ok((url, true)) = result {
                accepted.push(url);
                if accepted.len() >= MAX_ACCEPTED {
                    break;
                }
            }
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_and_suffix_over_basenames() {
        let names = vec![
            "guide-intro.html".to_string(),
            "guide-setup.html".to_string(),
            "guide-advanced.html".to_string(),
        ];
        assert_eq!(longest_common_prefix(&names), "guide-");
        assert_eq!(longest_common_suffix(&names), ".html");
    }

    #[test]
    fn vocabulary_filters_length_and_stopwords() {
        let text = "The Quick brown fox jumps over a lazy dog and the extraordinarily long word";
        let vocab = extract_vocabulary(text);
        assert!(vocab.contains(&"quick".to_string()));
        assert!(vocab.contains(&"brown".to_string()));
        assert!(!vocab.contains(&"the".to_string()));
        assert!(!vocab.contains(&"and".to_string()));
        assert!(vocab.iter().all(|w| (3..=15).contains(&w.chars().count())));
    }

    #[test]
    fn seed_directory_keeps_trailing_slash() {
        let url = PageUrl::parse("https://docs.example.test/guides/intro.html").unwrap();
        assert_eq!(seed_directory(&url), "/guides/");
    }
}
