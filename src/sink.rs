//! Text sinks
//!
//! [`TextSink`] is the capability set every text output target satisfies:
//! synchronous writes (characters, string slices, formatted values),
//! synchronous flush/close primitives, and asynchronous entry points that
//! honor cancellation. The broadcaster in [`crate::broadcast`] composes
//! against this trait alone and is agnostic to concrete sink kinds.
//!
//! Async entry points check their token before doing anything: a
//! pre-cancelled token produces a cancelled outcome and forwards nothing,
//! uniformly across the surface.

use crate::error::{SinkError, SinkResult};
use crate::locale::LocaleId;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Declared text encoding of a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SinkEncoding {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    Ascii,
}

/// Capability set of a text output target
#[async_trait]
pub trait TextSink: Send {
    /// Declared encoding of the destination
    fn encoding(&self) -> SinkEncoding {
        SinkEncoding::default()
    }

    /// Locale used when formatting values into this sink
    fn format_locale(&self) -> LocaleId {
        LocaleId::invariant()
    }

    /// Line terminator appended by [`TextSink::write_line`]
    fn newline(&self) -> String {
        "\n".to_string()
    }

    /// Write a string slice
    fn write_str(&mut self, s: &str) -> SinkResult<()>;

    /// Write a single character
    fn write_char(&mut self, c: char) -> SinkResult<()> {
        let mut buf = [0u8; 4];
        self.write_str(c.encode_utf8(&mut buf))
    }

    /// Write composite-formatted output with positional arguments
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> SinkResult<()> {
        match args.as_str() {
            Some(s) => self.write_str(s),
            None => self.write_str(&args.to_string()),
        }
    }

    /// Write a string slice followed by the sink's line terminator
    fn write_line(&mut self, s: &str) -> SinkResult<()> {
        self.write_str(s)?;
        let newline = self.newline();
        self.write_str(&newline)
    }

    /// Write a boolean, invariant-formatted
    fn write_bool(&mut self, v: bool) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write a signed integer, invariant-formatted
    fn write_i64(&mut self, v: i64) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write an unsigned integer, invariant-formatted
    fn write_u64(&mut self, v: u64) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write a 128-bit signed integer, invariant-formatted
    fn write_i128(&mut self, v: i128) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write a 128-bit unsigned integer, invariant-formatted
    fn write_u128(&mut self, v: u128) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write a single-precision float, invariant-formatted
    fn write_f32(&mut self, v: f32) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Write a double-precision float, invariant-formatted
    fn write_f64(&mut self, v: f64) -> SinkResult<()> {
        self.write_fmt(format_args!("{v}"))
    }

    /// Push buffered output to the destination
    fn flush_now(&mut self) -> SinkResult<()> {
        Ok(())
    }

    /// Release the destination; further writes may fail with `Closed`
    fn close_now(&mut self) -> SinkResult<()> {
        Ok(())
    }

    /// Asynchronous character write honoring cancellation
    async fn write_char_async(&mut self, c: char, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        self.write_char(c)
    }

    /// Asynchronous string write honoring cancellation
    async fn write_str_async(&mut self, s: &str, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        self.write_str(s)
    }

    /// Asynchronous line write honoring cancellation
    async fn write_line_async(&mut self, s: &str, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        self.write_line(s)
    }

    /// Asynchronous flush; a pre-cancelled token resolves cancelled without
    /// flushing anything
    async fn flush(&mut self, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        self.flush_now()
    }

    /// Asynchronous disposal: flush then close
    async fn shutdown(&mut self) -> SinkResult<()> {
        self.flush_now()?;
        self.close_now()
    }
}

/// In-memory sink accumulating into a shared string buffer
///
/// Clones share the same buffer, which makes the accumulated text
/// observable after the sink has been handed to a broadcaster.
#[derive(Debug, Clone)]
pub struct StringSink {
    buf: Arc<Mutex<String>>,
    newline: String,
    encoding: SinkEncoding,
    locale: LocaleId,
}

impl StringSink {
    pub fn new() -> Self {
        StringSink {
            buf: Arc::new(Mutex::new(String::new())),
            newline: "\n".to_string(),
            encoding: SinkEncoding::default(),
            locale: LocaleId::invariant(),
        }
    }

    /// Override the line terminator
    pub fn with_newline(mut self, newline: &str) -> Self {
        self.newline = newline.to_string();
        self
    }

    /// Override the declared encoding
    pub fn with_encoding(mut self, encoding: SinkEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Override the declared format locale
    pub fn with_format_locale(mut self, locale: LocaleId) -> Self {
        self.locale = locale;
        self
    }

    /// Snapshot of the accumulated text
    pub fn text(&self) -> String {
        self.buf.lock().clone()
    }

    /// Discard the accumulated text
    pub fn clear(&self) {
        self.buf.lock().clear();
    }
}

impl Default for StringSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSink for StringSink {
    fn encoding(&self) -> SinkEncoding {
        self.encoding
    }

    fn format_locale(&self) -> LocaleId {
        self.locale.clone()
    }

    fn newline(&self) -> String {
        self.newline.clone()
    }

    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.buf.lock().push_str(s);
        Ok(())
    }
}

/// Canonical no-op sink: every write succeeds, text accumulates nowhere
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NullSink {
    pub fn new() -> Self {
        NullSink
    }
}

#[async_trait]
impl TextSink for NullSink {
    fn write_str(&mut self, _s: &str) -> SinkResult<()> {
        Ok(())
    }
}

/// Stream-backed sink writing UTF-8 text to a file
#[derive(Debug)]
pub struct FileSink {
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    /// Wrap an already-open file
    pub fn new(file: File) -> Self {
        FileSink {
            writer: Some(BufWriter::new(file)),
        }
    }

    /// Create (or truncate) the file at `path`
    pub fn create(path: &Path) -> SinkResult<Self> {
        tracing::debug!(path = %path.display(), "file sink created");
        Ok(Self::new(File::create(path)?))
    }

    fn writer(&mut self) -> SinkResult<&mut BufWriter<File>> {
        self.writer.as_mut().ok_or(SinkError::Closed)
    }
}

#[async_trait]
impl TextSink for FileSink {
    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.writer()?.write_all(s.as_bytes())?;
        Ok(())
    }

    fn flush_now(&mut self) -> SinkResult<()> {
        self.writer()?.flush()?;
        Ok(())
    }

    fn close_now(&mut self) -> SinkResult<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

/// Decorator inserting an indent unit at every line start
pub struct IndentSink {
    inner: Box<dyn TextSink>,
    unit: String,
    level: usize,
    at_line_start: bool,
}

impl IndentSink {
    pub fn new(inner: Box<dyn TextSink>, unit: &str) -> Self {
        IndentSink {
            inner,
            unit: unit.to_string(),
            level: 0,
            at_line_start: true,
        }
    }

    /// Increase the indent level
    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// Decrease the indent level
    pub fn unindent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }
}

#[async_trait]
impl TextSink for IndentSink {
    fn encoding(&self) -> SinkEncoding {
        self.inner.encoding()
    }

    fn format_locale(&self) -> LocaleId {
        self.inner.format_locale()
    }

    fn newline(&self) -> String {
        self.inner.newline()
    }

    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        for part in s.split_inclusive('\n') {
            if self.at_line_start {
                for _ in 0..self.level {
                    self.inner.write_str(&self.unit)?;
                }
            }
            self.inner.write_str(part)?;
            self.at_line_start = part.ends_with('\n');
        }
        Ok(())
    }

    fn flush_now(&mut self) -> SinkResult<()> {
        self.inner.flush_now()
    }

    fn close_now(&mut self) -> SinkResult<()> {
        self.inner.close_now()
    }
}

/// Synchronized wrapper serializing every call through a mutex
///
/// The broadcaster itself assumes single-writer-at-a-time usage; wrapping it
/// (or any sink) in `SyncSink` lifts that restriction. Clones share the
/// underlying sink.
#[derive(Clone)]
pub struct SyncSink {
    inner: Arc<Mutex<Box<dyn TextSink>>>,
}

impl SyncSink {
    pub fn new(sink: Box<dyn TextSink>) -> Self {
        SyncSink {
            inner: Arc::new(Mutex::new(sink)),
        }
    }
}

#[async_trait]
impl TextSink for SyncSink {
    fn encoding(&self) -> SinkEncoding {
        self.inner.lock().encoding()
    }

    fn format_locale(&self) -> LocaleId {
        self.inner.lock().format_locale()
    }

    fn newline(&self) -> String {
        self.inner.lock().newline()
    }

    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        self.inner.lock().write_str(s)
    }

    fn write_char(&mut self, c: char) -> SinkResult<()> {
        self.inner.lock().write_char(c)
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> SinkResult<()> {
        self.inner.lock().write_fmt(args)
    }

    fn write_line(&mut self, s: &str) -> SinkResult<()> {
        self.inner.lock().write_line(s)
    }

    // The default async methods do their work through these, so the lock is
    // never held across an await.
    fn flush_now(&mut self) -> SinkResult<()> {
        self.inner.lock().flush_now()
    }

    fn close_now(&mut self) -> SinkResult<()> {
        self.inner.lock().close_now()
    }
}
