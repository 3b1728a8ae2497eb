//! Error taxonomy for broker operations.

use std::io;

use thiserror::Error;

/// Convenience alias for results of broker operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by [`MultiBar`](crate::MultiBar) operations.
///
/// Every failure is I/O at heart and is propagated without retry. The
/// multi-owner sweeps name the line whose indicator failed and carry that
/// indicator's error unmodified as the source.
#[derive(Debug, Error)]
pub enum Error {
    /// The shared sink rejected a write or flush.
    #[error("sink I/O error: {0}")]
    Io(#[from] io::Error),

    /// An indicator failed to draw its initial state during
    /// [`render_blank`](crate::MultiBar::render_blank).
    #[error("render failed on line {line}: {source}")]
    Render {
        /// Line owned by the failing indicator.
        line: usize,
        /// The indicator's error, unmodified.
        source: io::Error,
    },

    /// An indicator failed to draw its completed state during
    /// [`finish_all`](crate::MultiBar::finish_all).
    #[error("finish failed on line {line}: {source}")]
    Finish {
        /// Line owned by the failing indicator.
        line: usize,
        /// The indicator's error, unmodified.
        source: io::Error,
    },
}
