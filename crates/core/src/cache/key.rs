//! Flat storage keys for hierarchical asset paths.
//!
//! The store has a single flat namespace, so `/` is replaced by a
//! three-underscore marker. Literal `_` and `%` inside a segment are
//! percent-escaped first, which keeps the marker unambiguous and the
//! mapping bijective.

use std::fmt;

use crate::Error;
use crate::assets::AssetPath;

const SEPARATOR_MARKER: &str = "___";

/// Flat name of a single entry in the persistent store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Wrap a key read back from storage. No validation happens here;
    /// [`decode`] reports malformed keys.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn encode(path: &AssetPath) -> StorageKey {
    let key = path.segments().map(escape_segment).collect::<Vec<_>>().join(SEPARATOR_MARKER);
    StorageKey(key)
}

/// Inverse of [`encode`]. Fails with [`Error::Package`] for keys that
/// `encode` can never produce.
pub fn decode(key: &StorageKey) -> Result<AssetPath, Error> {
    let segments = key
        .as_str()
        .split(SEPARATOR_MARKER)
        .map(unescape_segment)
        .collect::<Result<Vec<_>, _>>()?;
    AssetPath::new(segments.join("/"))
}

fn escape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for c in segment.chars() {
        match c {
            '%' => out.push_str("%25"),
            '_' => out.push_str("%5F"),
            c => out.push(c),
        }
    }
    out
}

fn unescape_segment(segment: &str) -> Result<String, Error> {
    let mut out = String::with_capacity(segment.len());
    let mut rest = segment;

    while let Some(pos) = rest.find(['%', '_']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if let Some(after) = tail.strip_prefix("%25") {
            out.push('%');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("%5F") {
            out.push('_');
            rest = after;
        } else {
            return Err(Error::Package(format!("malformed storage key segment: {segment:?}")));
        }
    }

    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> AssetPath {
        AssetPath::new(s).unwrap()
    }

    #[test]
    fn test_encode_flattens_separators() {
        assert_eq!(encode(&path("assets/ublock/filters.txt")).as_str(), "assets___ublock___filters.txt");
    }

    #[test]
    fn test_roundtrip_with_reserved_characters() {
        for p in [
            "assets/ublock/filters.txt",
            "assets/user/my_filters.txt",
            "assets/a___b/c",
            "assets/100%/x_y%5F.txt",
            "single",
            "assets/_/__/___",
        ] {
            let p = path(p);
            assert_eq!(decode(&encode(&p)).unwrap(), p);
        }
    }

    #[test]
    fn test_marker_in_segment_does_not_collide() {
        let a = encode(&path("assets/a___b"));
        let b = encode(&path("assets/a/b"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_rejects_foreign_keys() {
        assert!(matches!(decode(&StorageKey::from_raw("a_b")), Err(Error::Package(_))));
        assert!(matches!(decode(&StorageKey::from_raw("a____b")), Err(Error::Package(_))));
        assert!(matches!(decode(&StorageKey::from_raw("a%20b")), Err(Error::Package(_))));
        assert!(matches!(decode(&StorageKey::from_raw("a______b")), Err(Error::Package(_))));
    }

    mod properties {
        use super::*;
        use crate::assets::path::strategies::{asset_path, raw_asset_path};
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(512))]

            #[test]
            fn prop_decode_inverts_encode(p in prop_oneof![asset_path(), raw_asset_path()]) {
                prop_assert_eq!(decode(&encode(&p)).unwrap(), p);
            }

            #[test]
            fn prop_encode_is_injective(a in asset_path(), b in asset_path()) {
                prop_assert_eq!(encode(&a) == encode(&b), a == b);
            }

            #[test]
            fn prop_encoded_keys_carry_no_stray_underscores(p in asset_path()) {
                let encoded = encode(&p);
                let stripped = encoded.as_str().replace(SEPARATOR_MARKER, "");
                prop_assert!(!stripped.contains('_'), "{}", encoded);
                prop_assert_eq!(encoded.as_str().matches(SEPARATOR_MARKER).count(), p.segments().count() - 1);
            }
        }
    }
}
