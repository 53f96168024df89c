//! Comparison option flags
//!
//! A compact bit-set mirroring the classic culture-sensitive comparison
//! options. The two ordinal flags bypass linguistic collation entirely and
//! are therefore mutually exclusive with every other flag.

use crate::error::{CollationError, CollationResult};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit-set of comparison options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CompareOptions(u32);

impl CompareOptions {
    /// Default linguistic comparison
    pub const NONE: CompareOptions = CompareOptions(0);
    /// Ignore case distinctions
    pub const IGNORE_CASE: CompareOptions = CompareOptions(1 << 0);
    /// Ignore nonspacing combining characters (diacritics)
    pub const IGNORE_NON_SPACE: CompareOptions = CompareOptions(1 << 1);
    /// Ignore symbols, punctuation, and white space
    pub const IGNORE_SYMBOLS: CompareOptions = CompareOptions(1 << 2);
    /// Treat hiragana and katakana as equal
    pub const IGNORE_KANA_TYPE: CompareOptions = CompareOptions(1 << 3);
    /// Treat half-width and full-width forms as equal
    pub const IGNORE_WIDTH: CompareOptions = CompareOptions(1 << 4);
    /// String sort: variable punctuation compares at the primary level
    pub const STRING_SORT: CompareOptions = CompareOptions(1 << 5);
    /// Raw scalar-value comparison, no linguistic rules
    pub const ORDINAL: CompareOptions = CompareOptions(1 << 6);
    /// Scalar-value comparison after simple case folding
    pub const ORDINAL_IGNORE_CASE: CompareOptions = CompareOptions(1 << 7);

    const ALL: u32 = (1 << 8) - 1;

    /// Raw bit value
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Reconstruct from raw bits without validation
    pub const fn from_bits_unchecked(bits: u32) -> Self {
        CompareOptions(bits)
    }

    /// Whether every flag in `other` is set in `self`
    pub const fn contains(self, other: CompareOptions) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set in `self`
    pub const fn intersects(self, other: CompareOptions) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether either ordinal flag is set
    pub const fn is_ordinal(self) -> bool {
        self.0 & (Self::ORDINAL.0 | Self::ORDINAL_IGNORE_CASE.0) != 0
    }

    /// Validate for comparison operations
    ///
    /// `ORDINAL` and `ORDINAL_IGNORE_CASE` must each appear alone; undefined
    /// bits are rejected.
    pub fn validate(self) -> CollationResult<()> {
        if self.0 & !Self::ALL != 0 {
            return Err(CollationError::invalid_options("undefined option bits"));
        }
        if self.contains(Self::ORDINAL) && self.0 != Self::ORDINAL.0 {
            return Err(CollationError::invalid_options(
                "ORDINAL cannot be combined with other options",
            ));
        }
        if self.contains(Self::ORDINAL_IGNORE_CASE) && self.0 != Self::ORDINAL_IGNORE_CASE.0 {
            return Err(CollationError::invalid_options(
                "ORDINAL_IGNORE_CASE cannot be combined with other options",
            ));
        }
        Ok(())
    }

    /// Validate for sort-key production
    ///
    /// Ordinal comparisons have no linguistic sort key, so both ordinal
    /// flags are rejected here even standing alone.
    pub fn validate_for_sort_key(self) -> CollationResult<()> {
        self.validate()?;
        if self.is_ordinal() {
            return Err(CollationError::invalid_options(
                "ordinal options do not produce sort keys",
            ));
        }
        Ok(())
    }
}

impl BitOr for CompareOptions {
    type Output = CompareOptions;

    fn bitor(self, rhs: CompareOptions) -> CompareOptions {
        CompareOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for CompareOptions {
    fn bitor_assign(&mut self, rhs: CompareOptions) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for CompareOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("NONE");
        }
        let names = [
            (Self::IGNORE_CASE, "IGNORE_CASE"),
            (Self::IGNORE_NON_SPACE, "IGNORE_NON_SPACE"),
            (Self::IGNORE_SYMBOLS, "IGNORE_SYMBOLS"),
            (Self::IGNORE_KANA_TYPE, "IGNORE_KANA_TYPE"),
            (Self::IGNORE_WIDTH, "IGNORE_WIDTH"),
            (Self::STRING_SORT, "STRING_SORT"),
            (Self::ORDINAL, "ORDINAL"),
            (Self::ORDINAL_IGNORE_CASE, "ORDINAL_IGNORE_CASE"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
