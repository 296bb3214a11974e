//! File-backed pool of pre-generated short codes.
//!
//! The pool file is a flat run of fixed-length codes produced offline by
//! [`crate::codegen`]. A cursor file next to it records how many bytes have
//! already been claimed. Every claim happens under an exclusive lock on the
//! cursor file, so any number of processes sharing the two files receive
//! disjoint, gap-free runs of codes.
//!
//! - [`cursor`] - Locked access to the durable cursor
//! - [`loader`] - Claims the next batch of codes from the pool file
//! - [`code_pool`] - In-memory queue that issues codes and refills itself

pub mod code_pool;
pub mod cursor;
pub mod loader;

pub use code_pool::CodePool;
pub use cursor::{CursorGuard, CursorStore};
pub use loader::{BatchLoader, FileBatchLoader};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while claiming or issuing codes.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool or cursor file operation failed.
    #[error("failed to {op} {}: {source}", .path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No code is queued right now. A refill may be in flight; retry shortly.
    #[error("no short codes available, retry shortly")]
    Empty,

    /// The blocking refill task could not be joined.
    #[error("pool refill task failed: {0}")]
    Task(String),
}

impl PoolError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { op, path, source }
    }

    /// Returns true if the caller should back off and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Empty)
    }
}
