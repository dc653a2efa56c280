//! The cleaning pipeline applied after extraction, before scoring (spec
//! §4.4): mojibake fix-ups, boilerplate/video-phrase removal, structural
//! DOM conversion + entity decoding (delegated to the sanitizer), markdown
//! emphasis stripping, and a final whitespace pass.

use crate::sanitizer::sanitize_html;
use regex::Regex;
use std::sync::LazyLock;

/// A handful of common UTF-8-as-Latin-1 mojibake sequences. True Unicode
/// NFC normalization is not attempted (no normalization crate is in the
/// ambient stack) — this targets the specific shipped examples only.
const MOJIBAKE_FIXUPS: &[(&str, &str)] = &[
    ("Ã©", "é"),
    ("Ã¨", "è"),
    ("Ã¢", "â"),
    ("Ã´", "ô"),
    ("Ã¼", "ü"),
    ("Ã±", "ñ"),
    ("â€™", "\u{2019}"),
    ("â€œ", "\u{201c}"),
    ("â€\u{9d}", "\u{201d}"),
    ("â€“", "\u{2013}"),
    ("â€”", "\u{2014}"),
];

const BOILERPLATE_PHRASES: &[&str] = &[
    "your browser does not support html5 video",
    "your browser does not support the video tag",
    "scroll for more",
    "this website uses cookies",
    "by using this site, you agree to our privacy policy",
    "all rights reserved",
    "accept cookies",
    "terms of service apply",
    "loading...",
    "please wait while the page loads",
];

const VIDEO_PHRASES: &[&str] = &[
    "your browser does not support html5 video",
    "your browser does not support the video tag",
    "video playback is not supported",
];

fn fix_mojibake(text: &str) -> String {
    let mut out = text.to_string();
    for (bad, good) in MOJIBAKE_FIXUPS {
        out = out.replace(bad, good);
    }
    out
}

fn remove_phrase_lines(text: &str, phrases: &[&str]) -> String {
    text.lines()
        .filter(|line| {
            let lower = line.to_lowercase();
            !phrases.iter().any(|p| lower.contains(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

static BOLD_ITALIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*\*([^*]+)\*\*\*|\*\*([^*]+)\*\*|\*([^*]+)\*|___([^_]+)___|__([^_]+)__|_([^_]+)_").unwrap());
static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

/// Strip markdown emphasis/inline-code markers while leaving fenced code
/// blocks verbatim (spec §4.4, §9 code-fence protection).
fn strip_markdown_emphasis(text: &str) -> String {
    let mut out = String::new();
    let mut in_fence = false;
    for line in text.split_inclusive('\n') {
        let trimmed = line.trim_end_matches('\n').trim();
        if trimmed == "```" {
            in_fence = !in_fence;
            out.push_str(line);
            continue;
        }
        if in_fence {
            out.push_str(line);
            continue;
        }
        let no_emphasis = BOLD_ITALIC_RE.replace_all(line, |caps: &regex::Captures| {
            caps.iter()
                .skip(1)
                .find_map(|g| g.map(|m| m.as_str().to_string()))
                .unwrap_or_default()
        });
        let no_code = INLINE_CODE_RE.replace_all(&no_emphasis, "$1");
        out.push_str(&no_code);
    }
    out
}

/// HTML -> cleaned plain text, applying the full extraction cleaning
/// pipeline in the order specified by spec §4.4.
pub fn clean_extracted(html: &str) -> String {
    let fixed = fix_mojibake(html);
    let no_boilerplate = remove_phrase_lines(&fixed, BOILERPLATE_PHRASES);
    let no_video = remove_phrase_lines(&no_boilerplate, VIDEO_PHRASES);
    let structural = sanitize_html(&no_video);
    strip_markdown_emphasis(&structural)
}
