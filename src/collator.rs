//! Locale-aware comparison facade
//!
//! A [`Collator`] wraps one locale identity and exposes comparison,
//! sort-key extraction, hashing, and collation-aware substring search, all
//! parameterized by [`CompareOptions`]. Instances are immutable after
//! construction and safe to share across threads; every operation is a pure
//! function over the locale data providers.

use crate::error::{CollationError, CollationResult};
use crate::locale::{CompatibilityEpoch, LocaleId, SortVersion};
use crate::options::CompareOptions;
use crate::sort_key::{hash_key_bytes, SortKey};
use crate::weights::{build_levels, fold_data, KeyLevels};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Culture-sensitive string comparer
#[derive(Debug, Clone)]
pub struct Collator {
    locale: LocaleId,
    epoch: CompatibilityEpoch,
}

impl Collator {
    /// Create a collator for a locale name; `""` selects the invariant
    /// (root) collation
    pub fn new(name: &str) -> CollationResult<Self> {
        Self::new_with_epoch(name, CompatibilityEpoch::default())
    }

    /// Create a collator for a locale name under a compatibility epoch
    pub fn new_with_epoch(name: &str, epoch: CompatibilityEpoch) -> CollationResult<Self> {
        let locale = LocaleId::from_name(name)?;
        tracing::debug!(locale = %locale, "collator created");
        Ok(Collator { locale, epoch })
    }

    /// Create a collator from a legacy numeric locale identifier
    pub fn from_lcid(lcid: u32) -> CollationResult<Self> {
        Self::from_lcid_with_epoch(lcid, CompatibilityEpoch::default())
    }

    /// Create a collator from a legacy identifier under a compatibility epoch
    pub fn from_lcid_with_epoch(lcid: u32, epoch: CompatibilityEpoch) -> CollationResult<Self> {
        let locale = LocaleId::from_lcid(lcid)?;
        Ok(Collator { locale, epoch })
    }

    /// The locale identity this collator was built for
    pub fn locale(&self) -> &LocaleId {
        &self.locale
    }

    /// Version descriptor of the backing collation data
    pub fn version(&self) -> SortVersion {
        SortVersion::for_locale(&self.locale, self.epoch)
    }

    /// Compare two strings under the given options
    ///
    /// For linguistic options the result sign always agrees with byte-wise
    /// comparison of the two sort keys; ordinal options compare Unicode
    /// scalar values directly.
    pub fn compare(&self, a: &str, b: &str, options: CompareOptions) -> CollationResult<Ordering> {
        options.validate()?;
        if options.contains(CompareOptions::ORDINAL) {
            return Ok(a.chars().cmp(b.chars()));
        }
        if options.contains(CompareOptions::ORDINAL_IGNORE_CASE) {
            let case = &fold_data().case;
            return Ok(a
                .chars()
                .map(|c| case.simple_fold(c))
                .cmp(b.chars().map(|c| case.simple_fold(c))));
        }
        if a == b {
            return Ok(Ordering::Equal);
        }
        let ka = build_levels(a, options).encode();
        let kb = build_levels(b, options).encode();
        Ok(ka.cmp(&kb))
    }

    /// Produce the sort key for `text` under the given options
    pub fn sort_key(&self, text: &str, options: CompareOptions) -> CollationResult<SortKey> {
        options.validate_for_sort_key()?;
        let key = build_levels(text, options).encode();
        Ok(SortKey::new(key, text))
    }

    /// Exact byte length the sort key for `text` requires
    pub fn sort_key_len(&self, text: &str, options: CompareOptions) -> CollationResult<usize> {
        options.validate_for_sort_key()?;
        Ok(build_levels(text, options).encode().len())
    }

    /// Write the sort key into a caller-supplied buffer
    ///
    /// Returns the number of bytes written. Fails with a size-mismatch error
    /// and writes nothing when `dest` is smaller than required; an
    /// exactly-sized buffer receives bytes identical to [`Self::sort_key`].
    pub fn sort_key_into(
        &self,
        text: &str,
        options: CompareOptions,
        dest: &mut [u8],
    ) -> CollationResult<usize> {
        options.validate_for_sort_key()?;
        let key = build_levels(text, options).encode();
        if dest.len() < key.len() {
            return Err(CollationError::DestinationTooSmall {
                needed: key.len(),
                provided: dest.len(),
            });
        }
        dest[..key.len()].copy_from_slice(&key);
        Ok(key.len())
    }

    /// Hash of `text` under the given options
    ///
    /// Two texts with equal sort keys hash identically. The empty string is
    /// not special-cased: zero-weight input hashes through the same key
    /// computation as everything else, so `hash("")` equals
    /// `hash("\u{200C}")` under default options.
    pub fn hash(&self, text: &str, options: CompareOptions) -> CollationResult<u64> {
        options.validate()?;
        if options.contains(CompareOptions::ORDINAL) {
            return Ok(hash_key_bytes(text.as_bytes()));
        }
        if options.contains(CompareOptions::ORDINAL_IGNORE_CASE) {
            let case = &fold_data().case;
            let folded: String = text.chars().map(|c| case.simple_fold(c)).collect();
            return Ok(hash_key_bytes(folded.as_bytes()));
        }
        Ok(hash_key_bytes(&build_levels(text, options).encode()))
    }

    /// Find the first collation-rule match of `value` in `source` at or
    /// after byte index `start`
    ///
    /// An empty (or zero-weight) search value matches at `start` with length
    /// zero. Returns the byte index of the match start, or `None`.
    pub fn index_of(
        &self,
        source: &str,
        value: &str,
        start: usize,
        options: CompareOptions,
    ) -> CollationResult<Option<usize>> {
        options.validate()?;
        check_start(source, start)?;
        if options.is_ordinal() {
            return Ok(self.ordinal_search(source, value, start, options, false));
        }
        let needle = build_levels(value, options);
        if needle.is_zero_weight() {
            return Ok(Some(start));
        }
        let needle_key = needle.encode();
        for s in boundaries(source).filter(|&s| s >= start) {
            if window_matches(source, s, &needle, &needle_key, options) {
                return Ok(Some(s));
            }
        }
        Ok(None)
    }

    /// Find the last collation-rule match of `value` in `source` starting at
    /// or before byte index `start`
    pub fn last_index_of(
        &self,
        source: &str,
        value: &str,
        start: usize,
        options: CompareOptions,
    ) -> CollationResult<Option<usize>> {
        options.validate()?;
        check_start(source, start)?;
        if options.is_ordinal() {
            return Ok(self.ordinal_search(source, value, start, options, true));
        }
        let needle = build_levels(value, options);
        if needle.is_zero_weight() {
            return Ok(Some(start));
        }
        let needle_key = needle.encode();
        for s in boundaries(source).filter(|&s| s <= start).rev() {
            if window_matches(source, s, &needle, &needle_key, options) {
                return Ok(Some(s));
            }
        }
        Ok(None)
    }

    fn ordinal_search(
        &self,
        source: &str,
        value: &str,
        start: usize,
        options: CompareOptions,
        backward: bool,
    ) -> Option<usize> {
        if value.is_empty() {
            return Some(start);
        }
        let case = &fold_data().case;
        let fold_all = options.contains(CompareOptions::ORDINAL_IGNORE_CASE);
        let fold = |c: char| if fold_all { case.simple_fold(c) } else { c };

        let matches_at = |s: usize| {
            let mut src = source[s..].chars();
            value
                .chars()
                .all(|vc| src.next().map(fold) == Some(fold(vc)))
        };
        if backward {
            boundaries(source).filter(|&s| s <= start).rev().find(|&s| matches_at(s))
        } else {
            boundaries(source).filter(|&s| s >= start).find(|&s| matches_at(s))
        }
    }

    /// Whether `text` participates in collation at all
    ///
    /// Empty text is not sortable. (A `&str` cannot carry unpaired
    /// surrogates; use [`Self::is_sortable_utf16`] for raw UTF-16 input.)
    pub fn is_sortable(text: &str) -> bool {
        !text.is_empty()
    }

    /// Whether a single character participates in collation
    ///
    /// A `char` is always a valid Unicode scalar value, never a lone
    /// surrogate, so every character is sortable.
    pub fn is_sortable_char(_c: char) -> bool {
        true
    }

    /// Sortability of raw UTF-16 input: false when empty or when any
    /// surrogate half is unpaired
    pub fn is_sortable_utf16(units: &[u16]) -> bool {
        if units.is_empty() {
            return false;
        }
        let mut iter = units.iter().copied().peekable();
        while let Some(unit) = iter.next() {
            match unit {
                0xD800..=0xDBFF => match iter.peek() {
                    Some(0xDC00..=0xDFFF) => {
                        iter.next();
                    }
                    _ => return false,
                },
                0xDC00..=0xDFFF => return false,
                _ => {}
            }
        }
        true
    }

    /// Sortability of a single UTF-16 unit; surrogate halves are never
    /// individually sortable
    pub fn is_sortable_utf16_unit(unit: u16) -> bool {
        !(0xD800..=0xDFFF).contains(&unit)
    }
}

fn check_start(source: &str, start: usize) -> CollationResult<()> {
    if start > source.len() || !source.is_char_boundary(start) {
        return Err(CollationError::invalid_index(start, source.len()));
    }
    Ok(())
}

/// Char-boundary byte offsets of `s`, including `s.len()`
fn boundaries(s: &str) -> impl DoubleEndedIterator<Item = usize> + '_ {
    s.char_indices().map(|(i, _)| i).chain(std::iter::once(s.len()))
}

/// Whether some window starting at `s` keys identically to the needle
///
/// Windows grow one char at a time. Growth stops once the window's primary
/// weights can no longer be a prefix of the needle's: appending characters
/// only ever appends weights, so no extension of a diverged window matches.
fn window_matches(
    source: &str,
    s: usize,
    needle: &KeyLevels,
    needle_key: &[u8],
    options: CompareOptions,
) -> bool {
    for e in boundaries(source).filter(|&e| e > s) {
        let window = build_levels(&source[s..e], options);
        if window.primary.len() > needle.primary.len()
            || window.primary[..] != needle.primary[..window.primary.len()]
        {
            return false;
        }
        if window.encode() == needle_key {
            return true;
        }
    }
    false
}

impl PartialEq for Collator {
    fn eq(&self, other: &Self) -> bool {
        self.locale == other.locale
    }
}

impl Eq for Collator {}

impl Hash for Collator {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.locale.hash(state);
    }
}

impl fmt::Display for Collator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collator - {}", self.locale)
    }
}
