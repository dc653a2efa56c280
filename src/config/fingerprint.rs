//! Config fingerprint: the cache key of the persisted index (spec §3, §9).
//!
//! A canonicalized serialization of the whole run configuration (all arrays
//! sorted so field order and input order never change the fingerprint) is
//! hashed with xxh3 and hex-truncated to 8 characters.

use super::types::RunConfig;
use serde_json::Value;

pub type ConfigFingerprint = String;

/// Recursively canonicalize a `serde_json::Value`: object keys sorted
/// (serde_json's `Map` is a `BTreeMap` already when the `preserve_order`
/// feature is off, so this mainly sorts arrays of scalars/strings), arrays
/// of strings sorted lexicographically.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => {
            let mut canon: Vec<Value> = items.iter().map(canonicalize).collect();
            canon.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
            Value::Array(canon)
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            for k in keys {
                out.insert(k.clone(), canonicalize(&map[k]));
            }
            Value::Object(out)
        }
        other => other.clone(),
    }
}

/// Compute the 8-hex-character fingerprint of a run configuration.
pub fn fingerprint(config: &RunConfig) -> ConfigFingerprint {
    let raw = serde_json::to_value(config).unwrap_or(Value::Null);
    let canon = canonicalize(&raw);
    let bytes = serde_json::to_vec(&canon).unwrap_or_default();
    let digest = xxhash_rust::xxh3::xxh3_64(&bytes);
    // 8 hex chars == first 4 bytes of the 64-bit digest.
    hex::encode(digest.to_be_bytes())[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{Selectors, SiteConfig};
    use std::collections::HashMap;

    fn site(key: &str, max_depth: u32) -> SiteConfig {
        SiteConfig {
            key: key.to_string(),
            name: key.to_string(),
            base_url: "https://example.test".into(),
            max_depth,
            max_pages: 50,
            selectors: Selectors::default(),
            exclude_patterns: vec!["/a".into(), "/b".into()],
            seed_urls: vec!["/x".into(), "/y".into()],
            site_type: None,
            file_url: None,
        }
    }

    #[test]
    fn stable_under_array_reordering() {
        let mut a = site("docs", 3);
        let mut b = site("docs", 3);
        a.exclude_patterns = vec!["/a".into(), "/b".into()];
        b.exclude_patterns = vec!["/b".into(), "/a".into()];
        let mut sites_a = HashMap::new();
        sites_a.insert("docs".into(), a);
        let mut sites_b = HashMap::new();
        sites_b.insert("docs".into(), b);
        assert_eq!(
            fingerprint(&RunConfig { sites: sites_a }),
            fingerprint(&RunConfig { sites: sites_b })
        );
    }

    #[test]
    fn changes_when_a_field_changes() {
        let mut sites_a = HashMap::new();
        sites_a.insert("docs".into(), site("docs", 2));
        let mut sites_b = HashMap::new();
        sites_b.insert("docs".into(), site("docs", 3));
        assert_ne!(
            fingerprint(&RunConfig { sites: sites_a }),
            fingerprint(&RunConfig { sites: sites_b })
        );
    }

    #[test]
    fn is_eight_hex_chars() {
        let mut sites = HashMap::new();
        sites.insert("docs".into(), site("docs", 3));
        let fp = fingerprint(&RunConfig { sites });
        assert_eq!(fp.len(), 8);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
