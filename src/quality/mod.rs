//! Quality Scorer: composite 0..1 score over readability, completeness,
//! technical relevance and structure (spec §4.5).

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

pub const WEIGHT_READABILITY: f64 = 0.25;
pub const WEIGHT_COMPLETENESS: f64 = 0.30;
pub const WEIGHT_TECHNICAL: f64 = 0.20;
pub const WEIGHT_STRUCTURE: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityLevel {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl QualityLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            Self::Excellent
        } else if score >= 0.65 {
            Self::Good
        } else if score >= 0.40 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone)]
pub struct QualityAssessment {
    pub overall_score: f64,
    pub readability: f64,
    pub completeness: f64,
    pub technical_relevance: f64,
    pub structure: f64,
    pub quality_level: QualityLevel,
    pub reason: String,
}

#[derive(Debug, Clone)]
pub struct ScorerConfig {
    pub min_length: usize,
    pub require_technical: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            min_length: 100,
            require_technical: false,
        }
    }
}

static SENTENCE_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());
static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\p{L}\p{N}'_-]+").unwrap());
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^(#{1,6})\s").unwrap());
static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^- ").unwrap());
static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").unwrap());
static FUNCTION_SIG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:fn|function|def)\s+\w+\s*\(").unwrap());
static CLASS_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bclass\s+\w+").unwrap());
static LANG_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:const|let|var|import|use|impl|struct|pub|async|await|return|yield|lambda)\b")
        .unwrap()
});
static FILE_EXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:js|ts|py|rs|c|cpp|h|hpp|json|md|yaml|toml)\b").unwrap());
static UNDERSCORE_IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[a-z][a-z0-9]*(?:_[a-z0-9]+)+\b").unwrap());

const BOILERPLATE_TERMS: &[&str] = &[
    "cookie", "privacy policy", "terms of service", "all rights reserved", "subscribe",
    "newsletter", "advertisement",
];
const INFORMATIVE_HINT: &[&str] = &[
    "example", "usage", "parameter", "return", "config", "install", "api", "function", "method",
];

/// Score `content` (already-sanitized plain text) against the component
/// formulas of spec §4.5.
#[must_use]
pub fn score(content: &str, config: &ScorerConfig) -> QualityAssessment {
    if content.trim().chars().count() < config.min_length {
        return QualityAssessment {
            overall_score: 0.0,
            readability: 0.0,
            completeness: 0.0,
            technical_relevance: 0.0,
            structure: 0.0,
            quality_level: QualityLevel::Poor,
            reason: "too short".to_string(),
        };
    }

    let readability = readability_score(content);
    let completeness = completeness_score(content);
    let technical_relevance = technical_score(content);
    let structure = structure_score(content);

    if config.require_technical && technical_relevance < 0.2 {
        return QualityAssessment {
            overall_score: 0.0,
            readability,
            completeness,
            technical_relevance,
            structure,
            quality_level: QualityLevel::Poor,
            reason: "technical content required".to_string(),
        };
    }

    let overall = WEIGHT_READABILITY * readability
        + WEIGHT_COMPLETENESS * completeness
        + WEIGHT_TECHNICAL * technical_relevance
        + WEIGHT_STRUCTURE * structure;
    let overall = overall.clamp(0.0, 1.0);

    QualityAssessment {
        overall_score: overall,
        readability,
        completeness,
        technical_relevance,
        structure,
        quality_level: QualityLevel::from_score(overall),
        reason: "scored".to_string(),
    }
}

fn words(content: &str) -> Vec<&str> {
    WORD_RE.find_iter(content).map(|m| m.as_str()).collect()
}

fn sentences(content: &str) -> Vec<&str> {
    SENTENCE_SPLIT_RE
        .split(content)
        .map(str::trim)
        .filter(|s| s.chars().count() > 5)
        .collect()
}

fn readability_score(content: &str) -> f64 {
    let w = words(content);
    let word_count = w.len();
    if word_count == 0 {
        return 0.0;
    }
    let sents = sentences(content);
    let sentence_count = sents.len().max(1);

    let length_score = if word_count >= 200 {
        1.0
    } else {
        word_count as f64 / 200.0
    };

    let avg = word_count as f64 / sentence_count as f64;
    let mut avg_score = (1.0 - (avg - 15.0).abs() / 15.0).max(0.0);
    if avg > 30.0 {
        avg_score -= (avg - 30.0) / 30.0;
    }
    let avg_score = avg_score.max(0.0);

    let unique: std::collections::HashSet<String> =
        w.iter().map(|s| s.to_lowercase()).collect();
    let diversity = unique.len() as f64 / word_count as f64;

    let mut r = ((length_score + avg_score) / 2.0) + diversity * 0.3;

    let mut counts: HashMap<String, u32> = HashMap::new();
    for s in &sents {
        *counts.entry(s.to_lowercase()).or_insert(0) += 1;
    }
    if counts.values().any(|&c| c > 2) {
        r -= 0.3;
    }

    r.clamp(0.0, 1.0)
}

fn completeness_score(content: &str) -> f64 {
    let paragraphs = content.split("\n\n").filter(|p| !p.trim().is_empty()).count();
    let mut score = 0.0;
    if paragraphs >= 2 {
        score += 0.25;
    }
    if HEADING_RE.is_match(content) {
        score += 0.15;
    }
    if LIST_ITEM_RE.is_match(content) {
        score += 0.10;
    }
    if content.contains("```") {
        score += 0.15;
    }
    if LINK_RE.is_match(content) {
        score += 0.05;
    }

    let lower = content.to_lowercase();
    let informative = INFORMATIVE_HINT.iter().filter(|t| lower.contains(*t)).count();
    let boilerplate = BOILERPLATE_TERMS.iter().filter(|t| lower.contains(*t)).count();
    let ratio_bump = if informative + boilerplate > 0 {
        0.1 * (informative as f64 / (informative + boilerplate) as f64)
    } else {
        0.05
    };
    score += ratio_bump;

    let trimmed = content.trim_end();
    if trimmed.ends_with('\u{2026}')
        || trimmed.ends_with("[...]")
        || lower.trim_end().ends_with("read more")
    {
        score -= 0.1;
    }
    if content.matches("```").count() % 2 != 0 {
        score -= 0.1;
    }

    score.clamp(0.0, 1.0)
}

fn technical_score(content: &str) -> f64 {
    let matches = FUNCTION_SIG_RE.find_iter(content).count()
        + CLASS_KEYWORD_RE.find_iter(content).count()
        + LINK_RE.find_iter(content).count()
        + LANG_KEYWORD_RE.find_iter(content).count()
        + FILE_EXT_RE.find_iter(content).count()
        + UNDERSCORE_IDENT_RE.find_iter(content).count();

    let len = content.chars().count().max(1) as f64;
    // Normalize per 500 characters of content; cap at 1.0.
    ((matches as f64) / (len / 500.0).max(1.0)).min(1.0)
}

fn structure_score(content: &str) -> f64 {
    let mut score = 0.0;
    if HEADING_RE.is_match(content) {
        score += 0.25;
    }
    if LIST_ITEM_RE.is_match(content) {
        score += 0.2;
    }
    let fence_count = content.matches("```").count();
    let balanced = fence_count > 0 && fence_count % 2 == 0;
    if balanced {
        score += 0.2;
    }
    if content.split("\n\n").filter(|p| !p.trim().is_empty()).count() >= 2 {
        score += 0.15;
    }
    if heading_hierarchy_ok(content) {
        score += 0.2;
    }
    if fence_count % 2 != 0 {
        score -= 0.3;
    }
    score.clamp(0.0, 1.0)
}

fn heading_hierarchy_ok(content: &str) -> bool {
    let levels: Vec<usize> = HEADING_RE
        .captures_iter(content)
        .map(|c| c[1].len())
        .collect();
    if levels.is_empty() {
        return false;
    }
    let mut prev = levels[0];
    for &lvl in &levels[1..] {
        if lvl > prev + 1 {
            return false;
        }
        prev = lvl;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_paragraphs(n: usize) -> String {
        let mut s = String::new();
        for i in 0..n {
            s.push_str(&format!(
                "This is paragraph number {i} with some reasonably varied words describing a topic in detail. It has more than one sentence to be realistic.\n\n"
            ));
        }
        s
    }

    #[test]
    fn too_short_scores_zero() {
        let assessment = score("short", &ScorerConfig::default());
        assert_eq!(assessment.overall_score, 0.0);
        assert_eq!(assessment.reason, "too short");
    }

    #[test]
    fn overall_is_weighted_sum_within_tolerance() {
        let content = long_paragraphs(5);
        let a = score(&content, &ScorerConfig::default());
        let expected = WEIGHT_READABILITY * a.readability
            + WEIGHT_COMPLETENESS * a.completeness
            + WEIGHT_TECHNICAL * a.technical_relevance
            + WEIGHT_STRUCTURE * a.structure;
        assert!((a.overall_score - expected).abs() < 1e-9);
        assert!(a.overall_score >= 0.0 && a.overall_score <= 1.0);
    }

    #[test]
    fn require_technical_zeroes_non_technical_content() {
        let content = long_paragraphs(5);
        let cfg = ScorerConfig {
            min_length: 100,
            require_technical: true,
        };
        let a = score(&content, &cfg);
        assert_eq!(a.overall_score, 0.0);
        assert_eq!(a.reason, "technical content required");
    }

    #[test]
    fn unmatched_fence_penalizes_structure() {
        let mut content = long_paragraphs(3);
        content.push_str("```\nfn broken() {\n");
        let a = score(&content, &ScorerConfig::default());
        assert!(a.structure < 0.5);
    }

    #[test]
    fn quality_level_bands() {
        assert_eq!(QualityLevel::from_score(0.9), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.7), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(0.5), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(0.1), QualityLevel::Poor);
    }
}
