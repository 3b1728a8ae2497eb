//! Fluent interface for constructing [`MultiBar`] instances.
//!
//! A stdout-backed broker comes straight from
//! [`MultiBar::new`](crate::MultiBar::new); the builder exists for the
//! cases where the sink is something else (a pipe, a capture buffer, a
//! different terminal handle).
//!
//! The builder is consumed by [`build`](MultiBarBuilder::build), so a
//! broker's sink cannot be swapped out after writes may have begun — that
//! misuse is unrepresentable rather than documented away.

use std::io::{self, Write};

use crate::{broker::MultiBar, render::LineRender};

/// A builder pattern for constructing [`MultiBar`] instances.
///
/// The indicator type of the built broker is chosen at the `build` call
/// site, usually by inference from the first `add`.
#[derive(Default)]
pub struct MultiBarBuilder {
    out: Option<Box<dyn Write + Send>>,
}

impl MultiBarBuilder {
    /// Starts building a broker with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default sink (standard output) with `out`.
    ///
    /// The broker buffers writes itself, so `out` needs no buffering of
    /// its own.
    #[must_use]
    pub fn with_output(mut self, out: impl Write + Send + 'static) -> Self {
        self.out = Some(Box::new(out));
        self
    }

    /// Consumes the builder and returns the constructed [`MultiBar`].
    #[must_use]
    pub fn build<B: LineRender>(self) -> MultiBar<B> {
        let out = self.out.unwrap_or_else(|| Box::new(io::stdout()));
        MultiBar::with_sink(out)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::Arc,
    };

    use parking_lot::Mutex;

    use super::MultiBarBuilder;
    use crate::{io::LineWriter, render::LineRender};

    struct NullBar;

    impl LineRender for NullBar {
        fn set_output(&self, _writer: LineWriter) {}

        fn render_initial(&self) -> io::Result<()> {
            Ok(())
        }

        fn mark_complete(&self) -> io::Result<()> {
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<u8>>>);

    impl Write for CaptureSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Sink Injection
    /// `with_output` routes all broker output into the given sink.
    #[test]
    fn test_with_output() {
        let sink = CaptureSink::default();
        let mut mpb = MultiBarBuilder::new().with_output(sink.clone()).build();

        let mut w = mpb.add(NullBar);
        w.write_all(b"ping").unwrap();
        mpb.flush().unwrap();

        assert_eq!(sink.0.lock().clone(), b"ping");
    }

    /// Defaults
    /// A default build yields an empty stdout-backed broker.
    #[test]
    fn test_default_build_is_empty() {
        let mpb = MultiBarBuilder::new().build::<NullBar>();
        assert!(mpb.is_empty());
        assert_eq!(mpb.len(), 0);
    }
}
