//! The contract between the broker and the indicators it manages.
//!
//! The broker treats indicators as opaque producers of formatted line
//! content: it never computes percentages, glyphs, or throughput. All it
//! needs from a collaborator is the narrow surface below — an output
//! injection point plus the two lifecycle redraws driven by
//! [`MultiBar::render_blank`](crate::MultiBar::render_blank) and
//! [`MultiBar::finish_all`](crate::MultiBar::finish_all).

use std::{io, sync::Arc};

use crate::io::LineWriter;

/// A single-line progress indicator the broker can manage.
///
/// Methods take `&self`: indicator handles are expected to be shared
/// between the broker and the worker threads driving them (cheap clones
/// with interior synchronization), so no redraw path needs exclusive
/// access.
///
/// Indicators must emit one fully rendered line per redraw. A redraw may
/// start with `\r` to reset the column; it must never contain vertical
/// cursor motion, which is the broker's job alone.
pub trait LineRender {
    /// Installs `writer` as this indicator's sole output target.
    ///
    /// Called once, by [`MultiBar::add`](crate::MultiBar::add). Every
    /// subsequent redraw must go through the installed writer; rendering
    /// anywhere else afterward leaves the managed block in an undefined
    /// visual state.
    fn set_output(&self, writer: LineWriter);

    /// Draws the indicator's initial (empty) state onto its line.
    fn render_initial(&self) -> io::Result<()>;

    /// Draws the indicator's completed state onto its line.
    fn mark_complete(&self) -> io::Result<()>;
}

impl<T: LineRender + ?Sized> LineRender for Box<T> {
    fn set_output(&self, writer: LineWriter) {
        (**self).set_output(writer);
    }

    fn render_initial(&self) -> io::Result<()> {
        (**self).render_initial()
    }

    fn mark_complete(&self) -> io::Result<()> {
        (**self).mark_complete()
    }
}

impl<T: LineRender + ?Sized> LineRender for Arc<T> {
    fn set_output(&self, writer: LineWriter) {
        (**self).set_output(writer);
    }

    fn render_initial(&self) -> io::Result<()> {
        (**self).render_initial()
    }

    fn mark_complete(&self) -> io::Result<()> {
        (**self).mark_complete()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{self, Write},
        sync::Arc,
    };

    use parking_lot::Mutex;

    use super::LineRender;
    use crate::{builder::MultiBarBuilder, io::LineWriter};

    #[derive(Default)]
    struct EchoBar {
        out: Mutex<Option<LineWriter>>,
        tag: &'static str,
    }

    impl LineRender for EchoBar {
        fn set_output(&self, writer: LineWriter) {
            *self.out.lock() = Some(writer);
        }

        fn render_initial(&self) -> io::Result<()> {
            let mut out = self.out.lock();
            out.as_mut().expect("bar not registered").write_all(self.tag.as_bytes())
        }

        fn mark_complete(&self) -> io::Result<()> {
            self.render_initial()
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

    /// Trait Objects
    /// Boxed trait objects register like any other bar, so one broker can
    /// mix indicator types.
    #[test]
    fn test_boxed_trait_objects() {
        let sink = CaptureSink::default();
        let mut mpb = MultiBarBuilder::new().with_output(sink.clone()).build();

        let spinner: Box<dyn LineRender> = Box::new(EchoBar {
            tag: "spin",
            ..EchoBar::default()
        });
        let bar: Box<dyn LineRender> = Box::new(EchoBar {
            tag: "bar",
            ..EchoBar::default()
        });
        mpb.add(spinner);
        mpb.add(bar);

        mpb.render_blank().unwrap();
        mpb.flush().unwrap();

        assert_eq!(sink.0.lock().clone(), b"spin\r\x1b[1Bbar");
    }

    /// Shared Handles
    /// An `Arc`-wrapped bar can be held by the broker and a worker at the
    /// same time; the worker's clone sees the installed writer.
    #[test]
    fn test_arc_handles_share_output() {
        let sink = CaptureSink::default();
        let mut mpb = MultiBarBuilder::new().with_output(sink.clone()).build();

        let bar = Arc::new(EchoBar {
            tag: "tick",
            ..EchoBar::default()
        });
        mpb.add(Arc::clone(&bar));

        // Worker-side redraw through its own clone of the handle.
        bar.render_initial().unwrap();
        mpb.flush().unwrap();

        assert_eq!(sink.0.lock().clone(), b"tick");
    }
}
