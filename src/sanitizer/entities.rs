//! HTML entity decoding (spec §4.3).
//!
//! Named entities map to canonical characters; numeric entities decode by
//! code point; any remaining, unrecognized entity reference collapses to a
//! single space rather than being left as literal markup.

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "hellip" => "\u{2026}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "para" => "",
        _ => return None,
    })
}

/// Decode entity references in `text`. Unknown entities collapse to a
/// single space; malformed `&...;` runs without a recognizable body are
/// left untouched (they are not entities at all, just a literal `&`).
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'&' {
            if let Some(semi_rel) = text[i + 1..].find(';') {
                let body = &text[i + 1..i + 1 + semi_rel];
                let consumed = semi_rel + 2; // '&' + body + ';'
                if let Some(rest) = body.strip_prefix('#') {
                    let codepoint = if let Some(hex) = rest.strip_prefix('x').or(rest.strip_prefix('X')) {
                        u32::from_str_radix(hex, 16).ok()
                    } else {
                        rest.parse::<u32>().ok()
                    };
                    match codepoint.and_then(char::from_u32) {
                        Some(c) => {
                            out.push(c);
                            i += consumed;
                            continue;
                        }
                        None => {
                            out.push(' ');
                            i += consumed;
                            continue;
                        }
                    }
                } else if let Some(decoded) = named_entity(body) {
                    out.push_str(decoded);
                    i += consumed;
                    continue;
                } else if body.chars().all(|c| c.is_ascii_alphanumeric()) && !body.is_empty() {
                    // Looks like an entity reference we don't recognize.
                    out.push(' ');
                    i += consumed;
                    continue;
                }
            }
        }
        // Copy one char verbatim (handle multi-byte UTF-8 correctly).
        let ch = text[i..].chars().next().unwrap_or('&');
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decode_entities("a&amp;b"), "a&b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("caf&eacute;"), "caf "); // not in the fixed table -> space
    }

    #[test]
    fn para_maps_to_empty() {
        assert_eq!(decode_entities("x&para;y"), "xy");
    }

    #[test]
    fn decodes_numeric_entities() {
        assert_eq!(decode_entities("&#65;&#x42;"), "AB");
    }

    #[test]
    fn unknown_entity_collapses_to_space() {
        assert_eq!(decode_entities("a&foobar;b"), "a b");
    }

    #[test]
    fn bare_ampersand_is_untouched() {
        assert_eq!(decode_entities("Q&A"), "Q&A");
    }
}
