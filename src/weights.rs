//! Collation-element pipeline
//!
//! Builds the level-encoded weight buffers a sort key is assembled from.
//! All Unicode data comes from the ICU4X provider crates (normalization,
//! general category, default-ignorable set, case folding); this module only
//! decides which level each folded element lands on:
//!
//! 1. primary    - folded scalar values
//! 2. secondary  - nonspacing/enclosing marks
//! 3. tertiary   - case/width/kana bits, one byte per primary element
//! 4. quaternary - variable-weight punctuation (word-sort mode)
//!
//! Default-ignorable code points contribute no weight at any level, so a
//! string of only ignorables keys identically to the empty string.

use crate::options::CompareOptions;
use icu_casemap::{CaseMapper, CaseMapperBorrowed};
use icu_normalizer::{DecomposingNormalizer, DecomposingNormalizerBorrowed};
use icu_properties::props::{DefaultIgnorableCodePoint, GeneralCategory};
use icu_properties::{
    CodePointMapData, CodePointMapDataBorrowed, CodePointSetData, CodePointSetDataBorrowed,
};
use std::sync::OnceLock;

/// Separator between key levels; weight bytes are always `>= MIN_WEIGHT_BYTE`
/// so byte-wise comparison orders a level prefix before any continuation.
pub(crate) const LEVEL_SEPARATOR: u8 = 0x01;
const MIN_WEIGHT_BYTE: u8 = 0x04;
const WEIGHT_RADIX: u32 = 252;

/// Weight buffers per level, prior to final encoding
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct KeyLevels {
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
    pub tertiary: Vec<u8>,
    pub quaternary: Vec<u8>,
}

impl KeyLevels {
    /// Assemble the final key bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(
            self.primary.len() + self.secondary.len() + self.tertiary.len()
                + self.quaternary.len() + 3,
        );
        key.extend_from_slice(&self.primary);
        key.push(LEVEL_SEPARATOR);
        key.extend_from_slice(&self.secondary);
        key.push(LEVEL_SEPARATOR);
        key.extend_from_slice(&self.tertiary);
        key.push(LEVEL_SEPARATOR);
        key.extend_from_slice(&self.quaternary);
        key
    }

    /// Whether no element contributed weight at any level
    pub fn is_zero_weight(&self) -> bool {
        self.primary.is_empty()
            && self.secondary.is_empty()
            && self.tertiary.is_empty()
            && self.quaternary.is_empty()
    }
}

/// Handles over the compiled ICU data, built once per process
pub(crate) struct FoldData {
    nfd: DecomposingNormalizerBorrowed<'static>,
    nfkd: DecomposingNormalizerBorrowed<'static>,
    pub case: CaseMapperBorrowed<'static>,
    category: CodePointMapDataBorrowed<'static, GeneralCategory>,
    ignorable: CodePointSetDataBorrowed<'static>,
}

pub(crate) fn fold_data() -> &'static FoldData {
    static DATA: OnceLock<FoldData> = OnceLock::new();
    DATA.get_or_init(|| FoldData {
        nfd: DecomposingNormalizer::new_nfd(),
        nfkd: DecomposingNormalizer::new_nfkd(),
        case: CaseMapper::new(),
        category: CodePointMapData::<GeneralCategory>::new(),
        ignorable: CodePointSetData::new::<DefaultIgnorableCodePoint>(),
    })
}

/// Encode one weight as three bytes that never collide with the separator
fn push_weight(buf: &mut Vec<u8>, value: u32) {
    let hi = value / (WEIGHT_RADIX * WEIGHT_RADIX);
    let rest = value % (WEIGHT_RADIX * WEIGHT_RADIX);
    buf.push(MIN_WEIGHT_BYTE + hi as u8);
    buf.push(MIN_WEIGHT_BYTE + (rest / WEIGHT_RADIX) as u8);
    buf.push(MIN_WEIGHT_BYTE + (rest % WEIGHT_RADIX) as u8);
}

/// Build the weight levels for `text` under `options`
///
/// `options` must already be validated; ordinal flags never reach this
/// function.
pub(crate) fn build_levels(text: &str, options: CompareOptions) -> KeyLevels {
    let data = fold_data();

    let ignore_case = options.contains(CompareOptions::IGNORE_CASE);
    let ignore_marks = options.contains(CompareOptions::IGNORE_NON_SPACE);
    let ignore_symbols = options.contains(CompareOptions::IGNORE_SYMBOLS);
    let ignore_kana = options.contains(CompareOptions::IGNORE_KANA_TYPE);
    let ignore_width = options.contains(CompareOptions::IGNORE_WIDTH);
    let string_sort = options.contains(CompareOptions::STRING_SORT);

    let mut levels = KeyLevels::default();

    for ch in data.nfd.normalize(text).chars() {
        if data.ignorable.contains(ch) {
            continue;
        }

        let width_variant = is_width_variant(ch);
        for folded in width_fold(ch, &data.nfkd) {
            let gc = data.category.get(folded);

            match gc {
                GeneralCategory::NonspacingMark | GeneralCategory::EnclosingMark => {
                    if !ignore_marks {
                        push_weight(&mut levels.secondary, folded as u32);
                    }
                    continue;
                }
                _ => {}
            }

            if is_variable(folded, gc) {
                if ignore_symbols {
                    continue;
                }
                if string_sort {
                    push_weight(&mut levels.primary, folded as u32);
                    levels.tertiary.push(MIN_WEIGHT_BYTE);
                } else {
                    push_weight(&mut levels.quaternary, folded as u32);
                }
                continue;
            }

            if ignore_symbols && is_symbol_like(folded, gc) {
                continue;
            }

            let (kana_folded, katakana) = kana_fold(folded);
            let primary = data.case.simple_fold(kana_folded);
            push_weight(&mut levels.primary, primary as u32);

            let upper = matches!(
                gc,
                GeneralCategory::UppercaseLetter | GeneralCategory::TitlecaseLetter
            );
            let mut tertiary = MIN_WEIGHT_BYTE;
            if upper && !ignore_case {
                tertiary += 1;
            }
            if width_variant && !ignore_width {
                tertiary += 2;
            }
            if katakana && !ignore_kana {
                tertiary += 4;
            }
            levels.tertiary.push(tertiary);
        }
    }

    levels
}

/// Whether `ch` sits in a half-width/full-width variant block
fn is_width_variant(ch: char) -> bool {
    matches!(ch, '\u{FF01}'..='\u{FFEE}' | '\u{3000}')
}

/// Fold width variants onto their canonical-width forms
///
/// Restricted NFKD: only characters in the width-variant blocks are
/// decomposed, so unrelated compatibility characters (superscripts,
/// ligatures, circled digits) keep their identity.
fn width_fold(
    ch: char,
    nfkd: &DecomposingNormalizerBorrowed<'static>,
) -> impl Iterator<Item = char> {
    let folded = if is_width_variant(ch) {
        let text = ch.to_string();
        let s = nfkd.normalize(&text);
        let mut out = [None::<char>; 3];
        for (slot, c) in out.iter_mut().zip(s.chars()) {
            *slot = Some(c);
        }
        out
    } else {
        [Some(ch), None, None]
    };
    folded.into_iter().flatten()
}

/// Fold katakana onto hiragana; reports whether the input was katakana
fn kana_fold(ch: char) -> (char, bool) {
    match ch {
        // Small/base katakana letters and iteration marks map 0x60 below.
        '\u{30A1}'..='\u{30F6}' | '\u{30FD}' | '\u{30FE}' => {
            let folded = char::from_u32(ch as u32 - 0x60).unwrap_or(ch);
            (folded, true)
        }
        _ => (ch, false),
    }
}

/// Variable-weight punctuation: word-sort demotes these to the quaternary
/// level, string sort keeps them primary.
fn is_variable(ch: char, gc: GeneralCategory) -> bool {
    gc == GeneralCategory::DashPunctuation
        || matches!(ch, '\'' | '\u{2018}' | '\u{2019}')
}

/// Symbols, punctuation, and white space, as a group
fn is_symbol_like(ch: char, gc: GeneralCategory) -> bool {
    matches!(
        gc,
        GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
            | GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::SpaceSeparator
            | GeneralCategory::LineSeparator
            | GeneralCategory::ParagraphSeparator
    ) || ch.is_whitespace()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(text: &str, options: CompareOptions) -> Vec<u8> {
        build_levels(text, options).encode()
    }

    #[test]
    fn test_zero_weight_equals_empty() {
        let empty = build_levels("", CompareOptions::NONE);
        let zwnj = build_levels("\u{200C}", CompareOptions::NONE);
        assert!(empty.is_zero_weight());
        assert!(zwnj.is_zero_weight());
        assert_eq!(empty.encode(), zwnj.encode());
    }

    #[test]
    fn test_case_is_tertiary() {
        let lower = key("abc", CompareOptions::NONE);
        let upper = key("ABC", CompareOptions::NONE);
        assert!(lower < upper);

        let lower = build_levels("abc", CompareOptions::NONE);
        let upper = build_levels("ABC", CompareOptions::NONE);
        assert_eq!(lower.primary, upper.primary);
        assert_ne!(lower.tertiary, upper.tertiary);

        assert_eq!(
            key("abc", CompareOptions::IGNORE_CASE),
            key("ABC", CompareOptions::IGNORE_CASE)
        );
    }

    #[test]
    fn test_canonical_equivalence() {
        // Precomposed vs decomposed forms key identically.
        assert_eq!(
            key("\u{00C0}", CompareOptions::NONE),
            key("A\u{0300}", CompareOptions::NONE)
        );
    }

    #[test]
    fn test_marks_are_secondary() {
        let plain = build_levels("a", CompareOptions::NONE);
        let accented = build_levels("\u{00E0}", CompareOptions::NONE);
        assert_eq!(plain.primary, accented.primary);
        assert!(plain.secondary.is_empty());
        assert!(!accented.secondary.is_empty());

        assert_eq!(
            key("a", CompareOptions::IGNORE_NON_SPACE),
            key("\u{00E0}", CompareOptions::IGNORE_NON_SPACE)
        );
    }

    #[test]
    fn test_width_fold() {
        // Fullwidth digits and punctuation fold at the primary level.
        assert_eq!(
            key("0", CompareOptions::IGNORE_WIDTH),
            key("\u{FF10}", CompareOptions::IGNORE_WIDTH)
        );
        assert_eq!(
            key("\u{20A9}", CompareOptions::IGNORE_WIDTH),
            key("\u{FFE6}", CompareOptions::IGNORE_WIDTH)
        );
        // Width still distinguishes at the tertiary level by default.
        assert!(key("\u{20A9}", CompareOptions::NONE) < key("\u{FFE6}", CompareOptions::NONE));
        assert!(key("0", CompareOptions::NONE) < key("\u{FF10}", CompareOptions::NONE));
    }

    #[test]
    fn test_width_fold_multi_char_decomposition() {
        // Fullwidth macron folds to space + combining macron.
        assert_eq!(
            key("\u{FFE3}", CompareOptions::IGNORE_WIDTH),
            key(" \u{0304}", CompareOptions::IGNORE_WIDTH)
        );
    }

    #[test]
    fn test_kana_fold() {
        let opts = CompareOptions::IGNORE_KANA_TYPE;
        // Hiragana DA vs katakana DA
        assert_eq!(key("\u{3060}", opts), key("\u{30C0}", opts));
        assert!(key("\u{3060}", CompareOptions::NONE) < key("\u{30C0}", CompareOptions::NONE));
    }

    #[test]
    fn test_halfwidth_katakana_dakuten() {
        // Hiragana DA == halfwidth TA + halfwidth voiced mark once kana,
        // width, and case differences are ignored.
        let opts = CompareOptions::IGNORE_KANA_TYPE
            | CompareOptions::IGNORE_WIDTH
            | CompareOptions::IGNORE_CASE;
        assert_eq!(key("\u{3060}", opts), key("\u{FF80}\u{FF9E}", opts));
        // Halfwidth voiced mark folds onto the combining voiced mark.
        assert_eq!(
            key("\u{FF9E}", CompareOptions::IGNORE_NON_SPACE),
            key("\u{3099}", CompareOptions::IGNORE_NON_SPACE)
        );
    }

    #[test]
    fn test_symbols_ignored() {
        let opts = CompareOptions::IGNORE_SYMBOLS;
        assert_eq!(key("Test's", opts), key("Tests", opts));
        assert_eq!(key("$", opts), key("&", opts));
        assert_eq!(key("\u{0021}", opts), key("\u{FF01}", opts));
        assert_eq!(key("\u{00A2}", opts), key("\u{FFE0}", opts));
        assert_eq!(key("\u{FF65}", opts), key("\u{30FB}", opts));
    }

    #[test]
    fn test_variable_punctuation_word_sort() {
        // Word sort: apostrophe is quaternary, so the primary level ties and
        // the longer quaternary decides.
        assert!(key("Test's", CompareOptions::NONE) > key("Tests", CompareOptions::NONE));
        // String sort: apostrophe is primary and sorts before letters.
        assert!(key("Test's", CompareOptions::STRING_SORT) < key("Tests", CompareOptions::STRING_SORT));
        // Dashes shift off the primary level in word sort.
        assert!(key("\u{30FC}", CompareOptions::NONE) > key("\u{FF0D}", CompareOptions::NONE));
        assert!(key("\u{30FC}", CompareOptions::NONE) > key("\u{2010}", CompareOptions::NONE));
    }

    #[test]
    fn test_weight_bytes_avoid_separator() {
        let mut buf = Vec::new();
        for v in [0u32, 1, 0x27, 0x10FFFF] {
            buf.clear();
            push_weight(&mut buf, v);
            assert_eq!(buf.len(), 3);
            assert!(buf.iter().all(|&b| b >= MIN_WEIGHT_BYTE));
        }
    }

    #[test]
    fn test_weight_encoding_is_monotonic() {
        let mut prev = Vec::new();
        push_weight(&mut prev, 0);
        for v in [1u32, 0x41, 0x3042, 0xFFFF, 0x10000, 0x10FFFF] {
            let mut cur = Vec::new();
            push_weight(&mut cur, v);
            assert!(prev < cur, "weight encoding must preserve scalar order");
            prev = cur;
        }
    }
}
