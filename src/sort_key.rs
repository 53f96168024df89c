//! Sort keys
//!
//! A [`SortKey`] is the precomputed, level-encoded weight sequence for one
//! source text under one locale/option configuration. Byte-wise comparison
//! of two keys produced under the same configuration yields the same sign as
//! comparing the source texts directly.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Opaque collation key for one source text
///
/// Immutable once created; safe to share and compare repeatedly. The
/// originating text is retained for diagnostics only and takes no part in
/// equality or ordering.
#[derive(Clone)]
pub struct SortKey {
    key_data: Vec<u8>,
    source: String,
}

impl SortKey {
    pub(crate) fn new(key_data: Vec<u8>, source: &str) -> Self {
        SortKey {
            key_data,
            source: source.to_string(),
        }
    }

    /// The raw key bytes
    ///
    /// Byte-for-byte stable within one collation-data version; not
    /// guaranteed stable across versions.
    pub fn key_data(&self) -> &[u8] {
        &self.key_data
    }

    /// The text this key was derived from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Hash of the key bytes; equal keys hash identically
    pub fn hash_value(&self) -> u64 {
        hash_key_bytes(&self.key_data)
    }
}

pub(crate) fn hash_key_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

impl PartialEq for SortKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_data == other.key_data
    }
}

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_data.cmp(&other.key_data)
    }
}

impl Hash for SortKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_data.hash(state);
    }
}

impl fmt::Debug for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey")
            .field("source", &self.source)
            .field("len", &self.key_data.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_is_byte_order() {
        let a = SortKey::new(vec![1, 2, 3], "a");
        let b = SortKey::new(vec![1, 2, 4], "b");
        assert!(a < b);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }

    #[test]
    fn test_equality_ignores_source() {
        let a = SortKey::new(vec![9, 9], "left");
        let b = SortKey::new(vec![9, 9], "right");
        assert_eq!(a, b);
        assert_eq!(a.hash_value(), b.hash_value());
        assert_ne!(a.source(), b.source());
    }

    #[test]
    fn test_hash_determinism() {
        let k = SortKey::new(vec![5, 6, 7], "x");
        assert_eq!(k.hash_value(), k.hash_value());
    }
}
