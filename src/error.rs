//! # Errors
//!
//! Every fallible primitive in this crate returns `Result<T, Error>` (the
//! buffer primitives never partially mutate state on failure). The
//! dispatch loop collapses any `Err` into a single advisory flag shown in
//! the status bar; only [`Error::is_fatal`] kinds cause the editor to tear
//! down the terminal and exit nonzero.

use std::io;

/// Error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A movement or deletion primitive would have gone past a buffer end.
    #[error("out of bounds")]
    OutOfBounds,

    /// An operation needs a marked region but none is set.
    #[error("no region marked")]
    NoRegion,

    /// A search or region-replace was given an empty pattern.
    #[error("empty pattern")]
    EmptyPattern,

    /// A search found no match.
    #[error("not found")]
    NotFound,

    /// Command-line content did not parse for the requested operation.
    #[error("malformed command: {0}")]
    Malformed(&'static str),

    /// A size computation would have wrapped `usize`.
    #[error("size overflow")]
    Overflow,

    /// A heap allocation failed.
    #[error("allocation failed")]
    AllocFailed,

    /// Wrapper around `std::io::Error`.
    #[error("I/O error: {0}")]
    IoFailed(#[from] io::Error),

    /// The external regex substitutor could not be launched, exited
    /// nonzero, or left no output behind.
    #[error("regex substitutor failed: {0}")]
    SubprocessFailed(&'static str),
}

impl Error {
    /// Fatal errors abort the editor after attempting terminal restoration;
    /// everything else is recorded as a single status-bar flag and the
    /// dispatch loop continues.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::AllocFailed)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
