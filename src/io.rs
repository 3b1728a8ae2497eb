//! The per-line write adapter handed to registered indicators.
//!
//! [`LineWriter`] is the sole path from an indicator's render logic to the
//! shared sink. It acts as "pass-through" middleware: bytes are forwarded
//! untouched, but every call first emits whatever cursor motion is needed
//! to put the terminal on the writer's own line. An indicator is never
//! given direct access to the sink.

use std::{
    fmt,
    io::{self, Write},
    sync::Arc,
};

use crate::broker::Shared;

/// A [`Write`] implementation bound to one registered screen line.
///
/// Obtained from [`MultiBar::add`](crate::MultiBar::add) or
/// [`MultiBar::writer`](crate::MultiBar::writer). Each `write` call takes
/// the broker lock, emits the relative motion from the last written line
/// to this one, and forwards the payload — one unbroken unit per call.
///
/// Clones are cheap and all address the same line. Payloads may carry `\r`
/// to reset the column but must not contain vertical motion of their own.
#[derive(Clone)]
pub struct LineWriter {
    shared: Arc<Shared>,
    line: usize,
}

impl LineWriter {
    pub(crate) fn new(shared: Arc<Shared>, line: usize) -> Self {
        Self { shared, line }
    }

    /// The zero-based screen line this writer is bound to.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

impl fmt::Debug for LineWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineWriter")
            .field("line", &self.line)
            .finish()
    }
}

impl Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut sink = self.shared.sink.lock();
        sink.jump_to(self.line)?;
        sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.shared.sink.lock().flush()
    }
}
