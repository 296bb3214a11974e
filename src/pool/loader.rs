//! Claims batches of codes from the pool file.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{CursorStore, PoolError};

/// Source of fresh codes for a [`crate::pool::CodePool`].
///
/// Implementations block; the pool runs them on Tokio's blocking thread pool.
#[cfg_attr(test, mockall::automock)]
pub trait BatchLoader: Send + Sync {
    /// Claims up to `count` codes that no other caller will ever receive.
    ///
    /// Returns fewer than `count` codes (possibly none) when the source is
    /// running dry.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Io`] if the backing files cannot be accessed.
    fn load_batch(&self, count: usize) -> Result<Vec<String>, PoolError>;
}

/// Loads codes from a flat pool file, tracking progress in a cursor file.
///
/// One call runs entirely under the cursor file's exclusive lock:
///
/// 1. Lock the cursor file and read the current offset
/// 2. Read up to `count × L` bytes of the pool file from that offset
/// 3. Keep whole `L`-byte records and drop any trailing fragment
/// 4. Advance the cursor by the bytes of the records returned
///
/// The lock is released when the guard drops, on success and on every error.
pub struct FileBatchLoader {
    pool_path: PathBuf,
    cursor: CursorStore,
    record_len: usize,
    local: Mutex<()>,
}

impl FileBatchLoader {
    /// # Panics
    ///
    /// Panics if `record_len` is zero.
    pub fn new(pool_path: impl Into<PathBuf>, cursor: CursorStore, record_len: usize) -> Self {
        assert!(record_len > 0, "record length must be positive");
        Self {
            pool_path: pool_path.into(),
            cursor,
            record_len,
            local: Mutex::new(()),
        }
    }

    pub fn pool_path(&self) -> &Path {
        &self.pool_path
    }

    pub fn cursor(&self) -> &CursorStore {
        &self.cursor
    }

    fn read_records(&self, offset: u64, count: usize) -> Result<Vec<String>, PoolError> {
        let mut file = File::open(&self.pool_path)
            .map_err(PoolError::io("open pool file", &self.pool_path))?;
        file.seek(SeekFrom::Start(offset))
            .map_err(PoolError::io("seek pool file", &self.pool_path))?;

        // The buffer grows with what is actually read; `count` may far exceed
        // the records left in the file.
        let want = (count as u64).saturating_mul(self.record_len as u64);
        let mut buffer = Vec::new();
        file.take(want)
            .read_to_end(&mut buffer)
            .map_err(PoolError::io("read pool file", &self.pool_path))?;

        let trailing = buffer.len() % self.record_len;
        if trailing != 0 {
            warn!(
                path = %self.pool_path.display(),
                offset,
                trailing,
                "dropping partial record at end of pool file"
            );
        }

        Ok(buffer
            .chunks_exact(self.record_len)
            .map(|record| String::from_utf8_lossy(record).into_owned())
            .collect())
    }
}

impl BatchLoader for FileBatchLoader {
    fn load_batch(&self, count: usize) -> Result<Vec<String>, PoolError> {
        let _local = self.local.lock();
        let mut cursor = self.cursor.lock()?;

        let offset = cursor.read()?;
        let codes = self.read_records(offset, count)?;

        let next = offset + (codes.len() * self.record_len) as u64;
        cursor.write(next)?;

        debug!(
            requested = count,
            loaded = codes.len(),
            from = offset,
            to = next,
            "claimed codes from pool file"
        );

        Ok(codes)
    }
}
