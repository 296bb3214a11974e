//! Durable claim cursor guarded by an exclusive advisory file lock.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::warn;

use super::PoolError;

/// Location of the cursor file.
///
/// The file holds a single decimal byte offset into the pool file. It is only
/// read or written through a [`CursorGuard`].
#[derive(Debug, Clone)]
pub struct CursorStore {
    path: PathBuf,
}

impl CursorStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens (creating if absent) and exclusively locks the cursor file.
    ///
    /// Blocks until the lock is granted. There is no timeout.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Io`] if the file cannot be opened or locked.
    pub fn lock(&self) -> Result<CursorGuard, PoolError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .map_err(PoolError::io("open cursor file", &self.path))?;

        file.lock_exclusive()
            .map_err(PoolError::io("lock cursor file", &self.path))?;

        Ok(CursorGuard {
            file,
            path: self.path.clone(),
        })
    }

    /// Reads the cursor under a short-lived lock.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Io`] if the file cannot be opened, locked or read.
    pub fn current(&self) -> Result<u64, PoolError> {
        self.lock()?.read()
    }
}

/// Exclusive hold on the cursor file. The lock is released on drop.
pub struct CursorGuard {
    file: File,
    path: PathBuf,
}

impl CursorGuard {
    /// Reads the stored offset. Empty or unparseable contents read as `0`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Io`] if the file cannot be read.
    pub fn read(&mut self) -> Result<u64, PoolError> {
        let mut contents = String::new();
        self.file
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.file.read_to_string(&mut contents))
            .map_err(PoolError::io("read cursor file", &self.path))?;

        let trimmed = contents.trim();
        match trimmed.parse::<u64>() {
            Ok(offset) => Ok(offset),
            Err(_) => {
                if !trimmed.is_empty() {
                    warn!(
                        path = %self.path.display(),
                        contents = trimmed,
                        "unparseable cursor, starting from 0"
                    );
                }
                Ok(0)
            }
        }
    }

    /// Replaces the file contents with `offset` and flushes it to disk.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Io`] if the file cannot be truncated, written or
    /// synced.
    pub fn write(&mut self, offset: u64) -> Result<(), PoolError> {
        self.file
            .set_len(0)
            .and_then(|_| self.file.seek(SeekFrom::Start(0)))
            .and_then(|_| self.file.write_all(offset.to_string().as_bytes()))
            .and_then(|_| self.file.sync_data())
            .map_err(PoolError::io("write cursor file", &self.path))
    }
}

impl Drop for CursorGuard {
    fn drop(&mut self) {
        if let Err(e) = FileExt::unlock(&self.file) {
            warn!(path = %self.path.display(), error = %e, "failed to unlock cursor file");
        }
    }
}
