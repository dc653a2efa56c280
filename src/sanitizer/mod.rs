//! The HTML Sanitizer: the persistence trust boundary (spec §4.3).
//!
//! Converts an HTML fragment into plain text that is guaranteed free of
//! executable constructs, preserves a fixed set of structural cues as
//! line-oriented markup, and is idempotent: `sanitize(sanitize(x)) ==
//! sanitize(x)` (spec §8 invariant 4).

mod entities;

use regex::Regex;
use scraper::node::Node;
use scraper::Html;
use std::sync::LazyLock;

const REMOVE_TAGS: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "applet", "form", "input", "button", "select",
];

const STRIP_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "div", "span", "strong", "b", "em", "i", "u", "mark",
    "small", "sub", "sup",
];

static EVENT_HANDLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)\bon[a-z]+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+)"#).unwrap());

static SAFETY_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)javascript:|eval\(|Function\(|setTimeout\(|setInterval\(|document\.|window\.|\.innerHTML|alert\(")
        .unwrap()
});

/// Top-level entry point: HTML (fragment or full document) -> sanitized
/// plain text.
pub fn sanitize_html(html: &str) -> String {
    let fragment = Html::parse_fragment(html);
    let root = fragment.root_element();
    let mut out = String::new();
    for child in root.children() {
        walk(child, &mut out);
    }
    let decoded = entities::decode_entities(&out);
    let scrubbed = scrub_outside_fences(&decoded);
    normalize_whitespace(&scrubbed)
}

/// Re-run the full pipeline over already-sanitized text. Used by the
/// Validator's sanitize-and-retry path (spec §4.6) — since sanitized text
/// contains no tags, this mostly re-applies scrubbing/whitespace rules and
/// is a no-op when the input was already sanitized (idempotence).
pub fn sanitize(text_or_html: &str) -> String {
    sanitize_html(text_or_html)
}

fn walk(node: ego_tree::NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Text(text) => out.push_str(text),
        Node::Comment(_) | Node::Doctype(_) | Node::ProcessingInstruction(_) => {}
        Node::Element(el) => {
            let name = el.name();
            if REMOVE_TAGS.contains(&name) {
                return;
            }
            match name {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                    let level: usize = name[1..].parse().unwrap_or(1);
                    let mut inner = String::new();
                    for child in node.children() {
                        walk(child, &mut inner);
                    }
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                    out.push_str(inner.trim());
                    out.push_str("\n\n");
                }
                "p" => {
                    let mut inner = String::new();
                    for child in node.children() {
                        walk(child, &mut inner);
                    }
                    out.push_str(inner.trim());
                    out.push_str("\n\n");
                }
                "li" => {
                    let mut inner = String::new();
                    for child in node.children() {
                        walk(child, &mut inner);
                    }
                    out.push_str("- ");
                    out.push_str(inner.trim());
                    out.push('\n');
                }
                "blockquote" => {
                    let mut inner = String::new();
                    for child in node.children() {
                        walk(child, &mut inner);
                    }
                    for line in inner.trim().lines() {
                        out.push_str("> ");
                        out.push_str(line);
                        out.push('\n');
                    }
                }
                "hr" => out.push_str("\n---\n"),
                "br" => out.push('\n'),
                "pre" => {
                    let raw = raw_text(node);
                    out.push_str("\n```\n");
                    out.push_str(&raw);
                    out.push_str("\n```\n");
                }
                _ => {
                    // Unlisted tags (including the stripping set and any
                    // inline/structural tag not named in spec §4.3) are
                    // dropped as containers, keeping inner text.
                    for child in node.children() {
                        walk(child, out);
                    }
                }
            }
        }
        _ => {
            for child in node.children() {
                walk(child, out);
            }
        }
    }
}

/// Collect verbatim text under a `<pre>` (and any nested `<code>`),
/// preserving internal whitespace exactly as authored.
fn raw_text(node: ego_tree::NodeRef<'_, Node>) -> String {
    let mut out = String::new();
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => out.push_str(&raw_text(child)),
            _ => {}
        }
    }
    out
}

/// Remove the fixed list of unsafe tokens (spec §4.3), skipping any region
/// between triple-backtick fence markers so legitimate documentation of
/// these tokens survives.
fn scrub_outside_fences(text: &str) -> String {
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
        } else {
            let no_events = EVENT_HANDLER_RE.replace_all(line, "");
            let cleaned = SAFETY_TOKEN_RE.replace_all(&no_events, "");
            out.push_str(&cleaned);
        }
    }
    out
}

/// Collapse horizontal whitespace runs, cap consecutive blank lines at one
/// (i.e. at most two consecutive newlines), and trim trailing whitespace
/// per line, while preserving paragraph breaks.
fn normalize_whitespace(text: &str) -> String {
    static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
    static BLANKLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

    let collapsed = HSPACE_RE.replace_all(text, " ");
    let trimmed_lines: String = collapsed
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    let capped = BLANKLINES_RE.replace_all(&trimmed_lines, "\n\n");
    capped.trim().to_string()
}
