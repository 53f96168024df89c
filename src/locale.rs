//! Locale identity, legacy numeric identifiers, and collation versioning
//!
//! A [`LocaleId`] pairs a normalized BCP-47 name with the legacy numeric
//! identifier the old platform APIs used. Two locale identities are equal
//! iff their normalized names match; the numeric id is carried along for
//! compatibility lookups only.

use crate::error::{CollationError, CollationResult};
use icu_locale_core::Locale;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Legacy numeric identifier of the invariant (root) locale
pub const INVARIANT_LCID: u32 = 0x007F;

/// Legacy numeric identifier assigned to locales without a classic id
pub const CUSTOM_UNSPECIFIED_LCID: u32 = 0x1000;

/// Classic name/id pairs; anything else gets `CUSTOM_UNSPECIFIED_LCID`.
const LEGACY_IDS: &[(&str, u32)] = &[
    ("", INVARIANT_LCID),
    ("ar-SA", 0x0401),
    ("cs-CZ", 0x0405),
    ("da-DK", 0x0406),
    ("de-DE", 0x0407),
    ("el-GR", 0x0408),
    ("en-US", 0x0409),
    ("en-GB", 0x0809),
    ("es-ES", 0x0C0A),
    ("fi-FI", 0x040B),
    ("fr-FR", 0x040C),
    ("he-IL", 0x040D),
    ("hu-HU", 0x040E),
    ("it-IT", 0x0410),
    ("ja-JP", 0x0411),
    ("ko-KR", 0x0412),
    ("nl-NL", 0x0413),
    ("pl-PL", 0x0415),
    ("pt-BR", 0x0416),
    ("ru-RU", 0x0419),
    ("sv-SE", 0x041D),
    ("th-TH", 0x041E),
    ("tr-TR", 0x041F),
    ("zh-CN", 0x0804),
    ("zh-TW", 0x0404),
];

/// Normalized locale identity
#[derive(Debug, Clone)]
pub struct LocaleId {
    name: String,
    lcid: u32,
}

impl LocaleId {
    /// The invariant (root) locale, denoted by the empty name
    pub fn invariant() -> Self {
        LocaleId {
            name: String::new(),
            lcid: INVARIANT_LCID,
        }
    }

    /// Resolve a locale by name
    ///
    /// The empty string denotes the invariant locale. Any other name must be
    /// well-formed BCP-47; it is canonicalized (`EN-us` becomes `en-US`).
    pub fn from_name(name: &str) -> CollationResult<Self> {
        if name.is_empty() {
            return Ok(Self::invariant());
        }
        let locale: Locale = name
            .parse()
            .map_err(|_| CollationError::unknown_locale(name))?;
        let normalized = locale.to_string();
        let lcid = lookup_lcid(&normalized);
        Ok(LocaleId {
            name: normalized,
            lcid,
        })
    }

    /// Resolve a locale by legacy numeric identifier
    pub fn from_lcid(lcid: u32) -> CollationResult<Self> {
        for &(name, id) in LEGACY_IDS {
            if id == lcid {
                return Ok(LocaleId {
                    name: name.to_string(),
                    lcid,
                });
            }
        }
        Err(CollationError::UnknownLocaleId { lcid })
    }

    /// Normalized name; empty for the invariant locale
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Legacy numeric identifier
    pub fn lcid(&self) -> u32 {
        self.lcid
    }

    /// Whether this is the invariant locale
    pub fn is_invariant(&self) -> bool {
        self.name.is_empty()
    }
}

fn lookup_lcid(normalized: &str) -> u32 {
    LEGACY_IDS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|&(_, id)| id)
        .unwrap_or(CUSTOM_UNSPECIFIED_LCID)
}

impl PartialEq for LocaleId {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for LocaleId {}

impl Hash for LocaleId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Selector for historical collation-table variants
///
/// Callers pinned to an older component can request the table variant that
/// component shipped against. Only the version descriptor varies; the fold
/// pipeline itself is epoch-independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompatibilityEpoch {
    /// Current collation data
    #[default]
    Current,
    /// A declared historical era
    Era(u16),
}

impl CompatibilityEpoch {
    fn full_version(self) -> u32 {
        // High half: provider major/minor. Low half: epoch discriminator.
        match self {
            CompatibilityEpoch::Current => 0x0010_0000,
            CompatibilityEpoch::Era(era) => 0x0010_0000 | era as u32,
        }
    }
}

/// Monotonic descriptor of the collation data a collator was built from
///
/// Locales built from the same underlying data share `full_version`; the
/// `sort_id` differs whenever the effective tailoring differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortVersion {
    full_version: u32,
    sort_id: [u8; 16],
}

impl SortVersion {
    pub(crate) fn for_locale(locale: &LocaleId, epoch: CompatibilityEpoch) -> Self {
        SortVersion {
            full_version: epoch.full_version(),
            sort_id: sort_id_for(locale.name()),
        }
    }

    /// Combined version of the backing collation data
    pub fn full_version(&self) -> u32 {
        self.full_version
    }

    /// Stable identifier of the effective tailoring
    pub fn sort_id(&self) -> [u8; 16] {
        self.sort_id
    }
}

fn sort_id_for(name: &str) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (i, chunk) in out.chunks_mut(8).enumerate() {
        let mut hasher = DefaultHasher::new();
        (i as u64).hash(&mut hasher);
        name.hash(&mut hasher);
        chunk.copy_from_slice(&hasher.finish().to_be_bytes());
    }
    out
}
