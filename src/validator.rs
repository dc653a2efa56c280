//! Validator: JavaScript-residue detection and the quantitative threshold
//! gate, including the sanitize-and-retry path (spec §4.6).

use crate::quality::{score, QualityAssessment, ScorerConfig};
use crate::sanitizer::sanitize_html;
use regex::Regex;
use std::sync::LazyLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default)]
pub struct DetectionCounts {
    pub script_blocks: usize,
    pub inline_handlers: usize,
    pub javascript_urls: usize,
    pub eval_calls: usize,
    pub top_level_declarations: usize,
    pub console_calls: usize,
    pub alert_calls: usize,
    pub document_write: usize,
    pub inner_html_assignment: usize,
}

impl DetectionCounts {
    pub fn total(&self) -> usize {
        self.script_blocks
            + self.inline_handlers
            + self.javascript_urls
            + self.eval_calls
            + self.top_level_declarations
            + self.console_calls
            + self.alert_calls
            + self.document_write
            + self.inner_html_assignment
    }

    pub fn severity(&self) -> Severity {
        let total = self.total();
        if total >= 10 {
            Severity::High
        } else if total >= 5 {
            Severity::Medium
        } else if total > 0 {
            Severity::Low
        } else {
            Severity::None
        }
    }

    pub fn found_javascript(&self) -> bool {
        self.total() > 0
    }
}

static SCRIPT_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>.*?</script>").unwrap());
static INLINE_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bon[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap());
static JS_URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)javascript:").unwrap());
static EVAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\beval\(").unwrap());
static TOP_LEVEL_DECL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:function|var|let|const)\s+\w+\s*\(").unwrap());
static CONSOLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bconsole\.\w+\(").unwrap());
static ALERT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\balert\(").unwrap());
static DOCUMENT_WRITE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bdocument\.write\(").unwrap());
static INNER_HTML_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.innerHTML\s*=").unwrap());

#[must_use]
pub fn detect(text: &str) -> DetectionCounts {
    DetectionCounts {
        script_blocks: SCRIPT_BLOCK_RE.find_iter(text).count(),
        inline_handlers: INLINE_HANDLER_RE.find_iter(text).count(),
        javascript_urls: JS_URL_RE.find_iter(text).count(),
        eval_calls: EVAL_RE.find_iter(text).count(),
        top_level_declarations: TOP_LEVEL_DECL_RE.find_iter(text).count(),
        console_calls: CONSOLE_RE.find_iter(text).count(),
        alert_calls: ALERT_RE.find_iter(text).count(),
        document_write: DOCUMENT_WRITE_RE.find_iter(text).count(),
        inner_html_assignment: INNER_HTML_RE.find_iter(text).count(),
    }
}

#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    pub min_length: usize,
    pub min_words: usize,
    pub min_sentences: usize,
    pub min_lexical_diversity: f64,
    pub min_readability: f64,
    pub max_js_ratio: f64,
    pub min_paragraphs: usize,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_length: 100,
            min_words: 20,
            min_sentences: 2,
            min_lexical_diversity: 0.3,
            min_readability: 0.4,
            max_js_ratio: 0.05,
            min_paragraphs: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub passed: bool,
    pub checks_passed: usize,
    pub checks_total: usize,
    pub detection: DetectionCounts,
    pub sanitized_retry_applied: bool,
    pub byte_reduction_percent: f64,
    pub quality: QualityAssessment,
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > 5)
        .count()
}

fn lexical_diversity(text: &str) -> f64 {
    let words: Vec<String> = text.split_whitespace().map(|w| w.to_lowercase()).collect();
    if words.is_empty() {
        return 0.0;
    }
    let unique: std::collections::HashSet<&String> = words.iter().collect();
    unique.len() as f64 / words.len() as f64
}

fn paragraph_count(text: &str) -> usize {
    text.split("\n\n").filter(|p| !p.trim().is_empty()).count()
}

fn js_content_ratio(text: &str, detection: &DetectionCounts) -> f64 {
    if text.is_empty() {
        return 0.0;
    }
    let js_chars: usize = SCRIPT_BLOCK_RE.find_iter(text).map(|m| m.len()).sum();
    let ratio = js_chars as f64 / text.len() as f64;
    ratio.max(if detection.found_javascript() { 0.01 } else { 0.0 })
}

/// Run the threshold gate against `text`, applying the sanitize-and-retry
/// path when the detector fires but the underlying quality is salvageable.
pub fn validate(text: &str, thresholds: &ThresholdConfig) -> ValidationReport {
    run_gate(text, thresholds, false)
}

fn run_gate(text: &str, thresholds: &ThresholdConfig, already_retried: bool) -> ValidationReport {
    let detection = detect(text);
    let quality = score(text, &ScorerConfig::default());

    if detection.found_javascript() && !already_retried && quality.overall_score > 0.5 {
        let sanitized = sanitize_html(text);
        let original_len = text.len().max(1);
        let reduction = 100.0 * (1.0 - sanitized.len() as f64 / original_len as f64);
        let mut retried = run_gate(&sanitized, thresholds, true);
        retried.sanitized_retry_applied = true;
        retried.byte_reduction_percent = reduction;
        return retried;
    }

    let checks: [bool; 7] = [
        text.chars().count() >= thresholds.min_length,
        word_count(text) >= thresholds.min_words,
        sentence_count(text) >= thresholds.min_sentences,
        lexical_diversity(text) >= thresholds.min_lexical_diversity,
        quality.readability >= thresholds.min_readability,
        js_content_ratio(text, &detection) <= thresholds.max_js_ratio,
        paragraph_count(text) >= thresholds.min_paragraphs,
    ];
    let checks_passed = checks.iter().filter(|&&c| c).count();
    let checks_total = checks.len();
    let ratio_ok = checks_passed as f64 / checks_total as f64 >= 0.70;
    let passed = ratio_ok && !detection.found_javascript();

    ValidationReport {
        passed,
        checks_passed,
        checks_total,
        detection,
        sanitized_retry_applied: false,
        byte_reduction_percent: 0.0,
        quality,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_script_block() {
        let counts = detect("before <script>alert(1)</script> after");
        assert!(counts.script_blocks >= 1);
        assert!(counts.found_javascript());
    }

    #[test]
    fn clean_prose_passes() {
        let text = "This is a perfectly normal paragraph about how documentation works. It explains configuration options in plain language. Another sentence follows here to add length and variety to the prose.\n\nA second paragraph continues the explanation with more detail about setup steps.";
        let report = validate(text, &ThresholdConfig::default());
        assert!(report.passed, "{report:?}");
        assert!(!report.detection.found_javascript());
    }

    #[test]
    fn severity_bands() {
        let mut counts = DetectionCounts::default();
        assert_eq!(counts.severity(), Severity::None);
        counts.alert_calls = 3;
        assert_eq!(counts.severity(), Severity::Low);
        counts.alert_calls = 6;
        assert_eq!(counts.severity(), Severity::Medium);
        counts.alert_calls = 11;
        assert_eq!(counts.severity(), Severity::High);
    }

    #[test]
    fn sanitize_and_retry_reports_reduction() {
        let text = "<p>Good documentation content that explains a useful topic in enough depth to be informative and pass length checks easily across the board.</p><script>doEvil()</script>";
        let report = validate(text, &ThresholdConfig::default());
        assert!(report.sanitized_retry_applied);
        assert!(report.byte_reduction_percent > 0.0);
    }
}
