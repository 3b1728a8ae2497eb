//! The cursor-position broker and its line-owner registry.
//!
//! [`MultiBar`] is the coordinator behind "multi-bar" terminal UIs. Each
//! registered indicator owns one screen line, fixed at registration time,
//! and every redraw is prefixed with the relative cursor motion that takes
//! the terminal from the line it last wrote to the redrawing indicator's
//! own line.
//!
//! # Synchronization Strategy
//!
//! A single coarse [`Mutex`](parking_lot::Mutex) guards both the recorded
//! cursor line and the shared sink, so a motion sequence and its payload
//! always reach the sink as one unbroken unit.
//!
//! * **Workers:** lock once per redraw, for the duration of one
//!   (motion, payload) pair.
//! * **Registration:** takes `&mut MultiBar` and no lock — setup is a
//!   single-threaded phase, enforced by the borrow checker.
//!
//! The broker assumes it is the sole writer to the block of lines it
//! manages; motion is always computed from the last recorded position,
//! never from a terminal query.

use std::{
    fmt,
    io::{self, BufWriter, Write},
    sync::Arc,
};

use log::{debug, trace};
use parking_lot::Mutex;

use crate::{
    error::{Error, Result},
    io::LineWriter,
    render::LineRender,
};

/// State shared between a [`MultiBar`] and every [`LineWriter`] it issues.
pub(crate) struct Shared {
    /// Cursor position and sink live under one lock; see the module docs.
    pub(crate) sink: Mutex<Sink>,
}

/// The buffered output stream plus the broker's record of where the
/// terminal cursor sits relative to the managed block of lines.
pub(crate) struct Sink {
    /// Line the cursor currently occupies: `0..=N` for `N` owners, with
    /// `N` being the past-the-end position used by [`MultiBar::end`].
    cursor: usize,
    out: BufWriter<Box<dyn Write + Send>>,
}

impl Sink {
    pub(crate) fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            cursor: 0,
            out: BufWriter::new(out),
        }
    }

    /// Emits the relative vertical motion from the recorded cursor line to
    /// `target`, or nothing if the cursor is already there.
    ///
    /// `cursor` is set to `target` before anything is written, so the
    /// recorded position converges even when the sink rejects the motion
    /// bytes.
    pub(crate) fn jump_to(&mut self, target: usize) -> io::Result<()> {
        let from = self.cursor;
        self.cursor = target;
        if from > target {
            write!(self.out, "\r\x1b[{}A", from - target)
        } else if from < target {
            write!(self.out, "\r\x1b[{}B", target - from)
        } else {
            Ok(())
        }
    }

    pub(crate) fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    /// Like [`Sink::new`] but with no write buffering, so tests observe
    /// every byte (and every sink failure) at the call that caused it.
    #[cfg(test)]
    fn unbuffered(out: Box<dyn Write + Send>) -> Self {
        Self {
            cursor: 0,
            out: BufWriter::with_capacity(0, out),
        }
    }
}

/// A broker that multiplexes several single-line indicators onto one
/// output stream.
///
/// Indicators are registered with [`add`](Self::add) during a
/// single-threaded setup phase; redraws may then come from any number of
/// threads, each routed through the [`LineWriter`] installed at
/// registration. Multiple independent `MultiBar` instances may coexist,
/// each managing its own region of its own stream.
///
/// # Example
///
/// ```ignore
/// let mut mpb: MultiBar<MyBar> = MultiBar::new();
/// let _w0 = mpb.add(MyBar::new(100));
/// let _w1 = mpb.add(MyBar::new(250));
/// mpb.render_blank()?;
/// // ... worker threads drive the bars ...
/// mpb.finish_all()?;
/// ```
pub struct MultiBar<B> {
    shared: Arc<Shared>,
    /// Registration order is line order: `bars[i]` owns screen line `i`.
    bars: Vec<B>,
}

impl<B> fmt::Debug for MultiBar<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Counts only, so formatting never contends with writers for the
        // sink lock.
        f.debug_struct("MultiBar")
            .field("lines", &self.bars.len())
            .finish()
    }
}

impl<B: LineRender> Default for MultiBar<B> {
    fn default() -> Self {
        crate::builder::MultiBarBuilder::new().build()
    }
}

impl<B: LineRender> MultiBar<B> {
    /// Creates a broker writing to standard output.
    ///
    /// Use [`MultiBarBuilder`](crate::MultiBarBuilder) to target a
    /// different sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_sink(out: Box<dyn Write + Send>) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink: Mutex::new(Sink::new(out)),
            }),
            bars: Vec::new(),
        }
    }

    /// Registers `bar` as the owner of the next screen line and returns a
    /// handle to that line.
    ///
    /// The assigned line equals the number of previously registered bars.
    /// Registration installs a [`LineWriter`] for that line as the bar's
    /// output via [`LineRender::set_output`]; from then on the bar must
    /// emit every redraw through it and nowhere else. The returned handle
    /// is a clone of the installed writer, useful for writes that bypass
    /// the bar (status notes, manual redraws).
    ///
    /// Registering more bars after earlier ones have started drawing is
    /// permitted but caller-beware: lines already on screen keep their
    /// positions, and [`end`](Self::end) targets the new, larger block.
    pub fn add(&mut self, bar: B) -> LineWriter {
        let line = self.bars.len();
        let writer = LineWriter::new(Arc::clone(&self.shared), line);
        bar.set_output(writer.clone());
        self.bars.push(bar);
        trace!("registered line owner {line}");
        writer
    }

    /// Returns the bar that owns `line`.
    ///
    /// # Panics
    ///
    /// Panics if `line` was never assigned by [`add`](Self::add). An
    /// out-of-range index can only come from caller arithmetic, so this is
    /// treated as a programmer error rather than a recoverable state.
    #[must_use]
    pub fn get(&self, line: usize) -> &B {
        &self.bars[line]
    }

    /// Returns a fresh [`LineWriter`] for a registered line, equivalent to
    /// the handle returned by [`add`](Self::add).
    ///
    /// # Panics
    ///
    /// Panics if `line` was never assigned by [`add`](Self::add).
    #[must_use]
    pub fn writer(&self, line: usize) -> LineWriter {
        assert!(
            line < self.bars.len(),
            "line {line} is not registered (owner count {})",
            self.bars.len()
        );
        LineWriter::new(Arc::clone(&self.shared), line)
    }

    /// Returns the number of registered bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Returns `true` if no bars have been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Asks every bar, in registration order, to draw its initial state.
    ///
    /// Stops at the first bar whose [`LineRender::render_initial`] fails
    /// and returns [`Error::Render`] naming its line; bars drawn before
    /// the failure are not rolled back.
    pub fn render_blank(&self) -> Result<()> {
        for (line, bar) in self.bars.iter().enumerate() {
            bar.render_initial()
                .map_err(|source| Error::Render { line, source })?;
        }
        Ok(())
    }

    /// Asks every bar, in registration order, to draw its completed state,
    /// then parks the cursor below the block with [`end`](Self::end).
    ///
    /// Stops at the first bar whose [`LineRender::mark_complete`] fails
    /// and returns [`Error::Finish`] naming its line; later bars are not
    /// invoked and `end` is skipped, leaving the cursor wherever the last
    /// successful redraw put it.
    pub fn finish_all(&self) -> Result<()> {
        for (line, bar) in self.bars.iter().enumerate() {
            bar.mark_complete()
                .map_err(|source| Error::Finish { line, source })?;
        }
        self.end()
    }

    /// Moves the cursor to the line just below the managed block and
    /// flushes the sink, so unrelated output does not overwrite any bar.
    ///
    /// Idempotent with respect to motion: a second call with no
    /// intervening redraws emits no escape sequence. Safe to call while
    /// writers are active (same lock), though the resulting interleaving
    /// of lines is then up to the caller.
    pub fn end(&self) -> Result<()> {
        let mut sink = self.shared.sink.lock();
        sink.jump_to(self.bars.len())?;
        sink.flush()?;
        debug!("cursor parked below {} managed lines", self.bars.len());
        Ok(())
    }

    /// Flushes the buffered sink without moving the cursor.
    pub fn flush(&self) -> Result<()> {
        self.shared.sink.lock().flush()?;
        Ok(())
    }
}
