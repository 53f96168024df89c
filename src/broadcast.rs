//! Broadcasting sink
//!
//! [`broadcast`] composes any number of [`TextSink`]s into one: every write
//! is forwarded to each member in registration order before the call
//! returns. Zero members collapse to a [`NullSink`], a single member is
//! returned unchanged.

use crate::error::{SinkError, SinkResult};
use crate::locale::LocaleId;
use crate::sink::{NullSink, SinkEncoding, TextSink};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Compose `sinks` into a single sink
///
/// Ownership of the members transfers to the composite; dropping or
/// shutting it down covers all of them.
pub fn broadcast(mut sinks: Vec<Box<dyn TextSink>>) -> Box<dyn TextSink> {
    match sinks.len() {
        0 => Box::new(NullSink::new()),
        1 => sinks.remove(0),
        n => {
            tracing::debug!(members = n, "created broadcasting sink");
            Box::new(BroadcastSink { sinks })
        }
    }
}

/// Fan-out sink over two or more members
///
/// Writes stop at the first failing member; disposal attempts every member
/// regardless of earlier failures and surfaces the first error once.
pub(crate) struct BroadcastSink {
    sinks: Vec<Box<dyn TextSink>>,
}

#[async_trait]
impl TextSink for BroadcastSink {
    // Metadata reflects the first registered member.
    fn encoding(&self) -> SinkEncoding {
        self.sinks[0].encoding()
    }

    fn format_locale(&self) -> LocaleId {
        self.sinks[0].format_locale()
    }

    fn newline(&self) -> String {
        self.sinks[0].newline()
    }

    fn write_str(&mut self, s: &str) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_str(s)?;
        }
        Ok(())
    }

    fn write_char(&mut self, c: char) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_char(c)?;
        }
        Ok(())
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_fmt(args)?;
        }
        Ok(())
    }

    // Forwarding the line write itself lets each member apply its own
    // terminator.
    fn write_line(&mut self, s: &str) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.write_line(s)?;
        }
        Ok(())
    }

    fn flush_now(&mut self) -> SinkResult<()> {
        for sink in &mut self.sinks {
            sink.flush_now()?;
        }
        Ok(())
    }

    fn close_now(&mut self) -> SinkResult<()> {
        attempt_all(self.sinks.iter_mut().map(|s| s.close_now()))
    }

    async fn write_char_async(&mut self, c: char, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        for sink in &mut self.sinks {
            sink.write_char_async(c, cancel).await?;
        }
        Ok(())
    }

    async fn write_str_async(&mut self, s: &str, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        for sink in &mut self.sinks {
            sink.write_str_async(s, cancel).await?;
        }
        Ok(())
    }

    async fn write_line_async(&mut self, s: &str, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        for sink in &mut self.sinks {
            sink.write_line_async(s, cancel).await?;
        }
        Ok(())
    }

    async fn flush(&mut self, cancel: &CancellationToken) -> SinkResult<()> {
        if cancel.is_cancelled() {
            return Err(SinkError::cancelled(cancel));
        }
        for sink in &mut self.sinks {
            sink.flush(cancel).await?;
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> SinkResult<()> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.shutdown().await {
                tracing::warn!(error = %e, "member sink failed to shut down; continuing");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn attempt_all(results: impl Iterator<Item = SinkResult<()>>) -> SinkResult<()> {
    let mut first_err = None;
    for result in results {
        if let Err(e) = result {
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::{FileSink, IndentSink, StringSink};
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    /// Sink whose disposal fails but records that it was attempted.
    struct FailingSink {
        disposed: Arc<AtomicBool>,
        flushed: Arc<AtomicBool>,
    }

    impl FailingSink {
        fn new() -> (Self, Arc<AtomicBool>, Arc<AtomicBool>) {
            let disposed = Arc::new(AtomicBool::new(false));
            let flushed = Arc::new(AtomicBool::new(false));
            (
                FailingSink {
                    disposed: disposed.clone(),
                    flushed: flushed.clone(),
                },
                disposed,
                flushed,
            )
        }
    }

    #[async_trait]
    impl TextSink for FailingSink {
        fn write_str(&mut self, _s: &str) -> SinkResult<()> {
            Ok(())
        }

        fn flush_now(&mut self) -> SinkResult<()> {
            self.flushed.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&mut self) -> SinkResult<()> {
            self.disposed.store(true, Ordering::SeqCst);
            Err(SinkError::Io(io::Error::other("shutdown failed")))
        }
    }

    fn exercise_full_surface(sink: &mut dyn TextSink) {
        sink.write_char('q').expect("write");
        sink.write_str("str").expect("write");
        sink.write_line("line").expect("write");
        sink.write_bool(false).expect("write");
        sink.write_i64(-9).expect("write");
        sink.write_u64(9).expect("write");
        sink.write_i128(i128::MIN).expect("write");
        sink.write_u128(u128::MAX).expect("write");
        sink.write_f32(1.5).expect("write");
        sink.write_f64(-2.25).expect("write");
        sink.write_fmt(format_args!("[{1}|{0}]", "a", "b")).expect("write");
    }

    #[test]
    fn test_broadcast_matches_single_sink_oracle() {
        let oracle = StringSink::new();
        exercise_full_surface(&mut oracle.clone());

        let members: Vec<StringSink> = (0..3).map(|_| StringSink::new()).collect();
        let mut fanned = broadcast(
            members
                .iter()
                .map(|m| Box::new(m.clone()) as Box<dyn TextSink>)
                .collect(),
        );
        exercise_full_surface(fanned.as_mut());

        for member in &members {
            assert_eq!(member.text(), oracle.text());
        }
    }

    #[tokio::test]
    async fn test_broadcast_async_writes_reach_all_members() {
        let a = StringSink::new();
        let b = StringSink::new();
        let mut fanned = broadcast(vec![
            Box::new(a.clone()) as Box<dyn TextSink>,
            Box::new(b.clone()),
        ]);

        let token = CancellationToken::new();
        fanned.write_char_async('x', &token).await.expect("write");
        fanned.write_str_async("yz", &token).await.expect("write");
        fanned.write_line_async("w", &token).await.expect("write");
        fanned.flush(&token).await.expect("flush");

        assert_eq!(a.text(), "xyzw\n");
        assert_eq!(b.text(), a.text());
    }

    #[test]
    fn test_each_member_keeps_its_own_newline() {
        let unix = StringSink::new();
        let dashed = StringSink::new().with_newline("---");
        let mut fanned = broadcast(vec![
            Box::new(unix.clone()) as Box<dyn TextSink>,
            Box::new(dashed.clone()),
        ]);
        fanned.write_line("hi").expect("write");
        assert_eq!(unix.text(), "hi\n");
        assert_eq!(dashed.text(), "hi---");
    }

    #[test]
    fn test_empty_broadcast_is_noop() {
        let mut fanned = broadcast(Vec::new());
        exercise_full_surface(fanned.as_mut());
        assert!(fanned.flush_now().is_ok());
        assert_eq!(fanned.encoding(), SinkEncoding::Utf8);
        assert!(fanned.format_locale().is_invariant());
    }

    #[test]
    fn test_single_sink_identity() {
        let only = StringSink::new().with_encoding(SinkEncoding::Utf16Le);
        let mut fanned = broadcast(vec![Box::new(only.clone()) as Box<dyn TextSink>]);
        fanned.write_str("solo").expect("write");
        assert_eq!(only.text(), "solo");
        assert_eq!(fanned.encoding(), SinkEncoding::Utf16Le);
    }

    #[test]
    fn test_metadata_comes_from_first_member() {
        let tr = LocaleId::from_name("tr-TR").expect("resolves");
        let first = Box::new(IndentSink::new(
            Box::new(StringSink::new().with_format_locale(tr.clone())),
            "\t",
        ));
        let second = Box::new(StringSink::new().with_encoding(SinkEncoding::Utf16Be));
        let fanned = broadcast(vec![first as Box<dyn TextSink>, second]);

        assert_eq!(fanned.encoding(), SinkEncoding::Utf8);
        assert_eq!(fanned.format_locale(), tr);
    }

    #[tokio::test]
    async fn test_shutdown_attempts_every_member() {
        let (failing, disposed_first, _) = FailingSink::new();
        let (failing_last, disposed_last, _) = FailingSink::new();
        let middle = StringSink::new();
        let mut fanned = broadcast(vec![
            Box::new(failing) as Box<dyn TextSink>,
            Box::new(middle),
            Box::new(failing_last),
        ]);

        let err = fanned.shutdown().await.expect_err("first failure surfaces");
        assert!(matches!(err, SinkError::Io(_)));
        assert!(disposed_first.load(Ordering::SeqCst));
        assert!(disposed_last.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_precancelled_token_forwards_nothing() {
        let (failing, _, flushed) = FailingSink::new();
        let member = StringSink::new();
        let mut fanned = broadcast(vec![
            Box::new(member.clone()) as Box<dyn TextSink>,
            Box::new(failing),
        ]);

        let cancelled = CancellationToken::new();
        cancelled.cancel();

        assert!(fanned
            .write_str_async("x", &cancelled)
            .await
            .expect_err("cancelled")
            .is_cancelled());
        assert!(fanned
            .flush(&cancelled)
            .await
            .expect_err("cancelled")
            .is_cancelled());
        assert_eq!(member.text(), "");
        assert!(!flushed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_broadcast_over_file_sinks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let left = dir.path().join("left.txt");
        let right = dir.path().join("right.txt");
        let mut fanned = broadcast(vec![
            Box::new(FileSink::create(&left).expect("create")) as Box<dyn TextSink>,
            Box::new(FileSink::create(&right).expect("create")),
        ]);

        fanned.write_line("mirrored").expect("write");
        fanned.shutdown().await.expect("shutdown");

        let left_text = std::fs::read_to_string(&left).expect("read");
        assert_eq!(left_text, "mirrored\n");
        assert_eq!(std::fs::read_to_string(&right).expect("read"), left_text);
    }
}
