//! Locale-aware collation and broadcasting text output
//!
//! This crate provides two building blocks for text-heavy services:
//!
//! - [`Collator`]: culture-sensitive comparison, searching, sort-key
//!   generation, and hashing over UTF-8 text, driven by ICU4X normalization
//!   and character data. Keys compare byte-wise with the same sign as the
//!   direct comparison, so they can be precomputed and stored.
//! - [`broadcast`]: composes any number of [`TextSink`]s into one sink that
//!   forwards every write to each member in order, with flush and disposal
//!   propagation.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod broadcast;
pub mod collator;
pub mod error;
pub mod locale;
pub mod options;
pub mod sink;
pub mod sort_key;

mod weights;

// Re-export commonly used types
pub use broadcast::broadcast;
pub use collator::Collator;
pub use error::{CollationError, CollationResult, SinkError, SinkResult};
pub use locale::{CompatibilityEpoch, LocaleId, SortVersion};
pub use options::CompareOptions;
pub use sink::{FileSink, IndentSink, NullSink, SinkEncoding, StringSink, SyncSink, TextSink};
pub use sort_key::SortKey;
