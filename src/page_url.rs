//! An immutable, cheaply-cloneable absolute URL with the fragment always
//! stripped (spec §3: "Fragment-bearing URLs are never stored or enqueued").
//!
//! Adapted from the crawler's `ImUrl` wrapper: a parsed `url::Url` shared via
//! `Arc` so cloning a `PageUrl` never re-parses or re-allocates the string.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageUrl {
    url: Arc<Url>,
}

impl PageUrl {
    /// Parse an absolute URL, stripping any fragment.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parsed = Url::parse(input).with_context(|| format!("invalid URL: {input}"))?;
        parsed.set_fragment(None);
        Ok(Self {
            url: Arc::new(parsed),
        })
    }

    /// Resolve `href` against this URL as a base, stripping any fragment.
    pub fn resolve(&self, href: &str) -> Result<Self> {
        let mut joined = self
            .url
            .join(href)
            .with_context(|| format!("cannot resolve '{href}' against {}", self.url))?;
        joined.set_fragment(None);
        Ok(Self {
            url: Arc::new(joined),
        })
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn same_origin(&self, other: &PageUrl) -> bool {
        self.origin() == other.origin()
    }

    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Non-empty, non-trailing-slash path segments, in order.
    pub fn path_segments(&self) -> Vec<&str> {
        self.url
            .path_segments()
            .map(|segs| segs.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }

    pub fn had_fragment_in(input: &str) -> bool {
        input.contains('#')
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl PartialEq for PageUrl {
    fn eq(&self, other: &Self) -> bool {
        self.url.as_str() == other.url.as_str()
    }
}
impl Eq for PageUrl {}

impl std::hash::Hash for PageUrl {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.as_str().hash(state);
    }
}

impl TryFrom<String> for PageUrl {
    type Error = anyhow::Error;
    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<PageUrl> for String {
    fn from(value: PageUrl) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment() {
        let u = PageUrl::parse("https://example.test/a/b#section").unwrap();
        assert_eq!(u.as_str(), "https://example.test/a/b");
    }

    #[test]
    fn resolves_against_page_not_base() {
        let page = PageUrl::parse("https://example.test/deep/page.html").unwrap();
        let resolved = page.resolve("sibling.html").unwrap();
        assert_eq!(resolved.as_str(), "https://example.test/deep/sibling.html");
    }

    #[test]
    fn origin_comparison() {
        let a = PageUrl::parse("https://example.test/a").unwrap();
        let b = PageUrl::parse("https://example.test/b").unwrap();
        let c = PageUrl::parse("https://other.test/b").unwrap();
        assert!(a.same_origin(&b));
        assert!(!a.same_origin(&c));
    }

    #[test]
    fn path_segments_skip_empty() {
        let u = PageUrl::parse("https://example.test/guides/intro/").unwrap();
        assert_eq!(u.path_segments(), vec!["guides", "intro"]);
    }
}
