//! Serialization of generated codes into the pool and cursor files.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::info;

use super::CodegenError;

/// What [`write_pool_file`] put on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolFileSummary {
    pub records: usize,
    pub bytes: u64,
}

/// Writes `codes` back-to-back into `pool_path` and resets `cursor_path` to `0`.
///
/// Parent directories are created as needed. Any existing pool or cursor file
/// is replaced.
///
/// # Errors
///
/// Returns [`CodegenError::Io`] naming the file that could not be written.
pub fn write_pool_file(
    pool_path: &Path,
    cursor_path: &Path,
    codes: &[String],
) -> Result<PoolFileSummary, CodegenError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source| CodegenError::Io { path, source }
    };

    for path in [pool_path, cursor_path] {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
    }

    let file = File::create(pool_path).map_err(io_err(pool_path))?;
    let mut writer = BufWriter::new(file);
    let mut bytes = 0u64;
    for code in codes {
        writer
            .write_all(code.as_bytes())
            .map_err(io_err(pool_path))?;
        bytes += code.len() as u64;
    }
    let file = writer
        .into_inner()
        .map_err(|e| io_err(pool_path)(e.into_error()))?;
    file.sync_all().map_err(io_err(pool_path))?;

    fs::write(cursor_path, b"0").map_err(io_err(cursor_path))?;

    info!(
        pool = %pool_path.display(),
        cursor = %cursor_path.display(),
        records = codes.len(),
        bytes,
        "pool file written"
    );

    Ok(PoolFileSummary {
        records: codes.len(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_concatenated_records_and_zero_cursor() {
        let dir = tempdir().unwrap();
        let pool = dir.path().join("data/shorturls.dat");
        let cursor = dir.path().join("data/offset.dat");
        let codes = vec!["abc123".to_string(), "XYZ-_9".to_string()];

        let summary = write_pool_file(&pool, &cursor, &codes).unwrap();

        assert_eq!(summary, PoolFileSummary { records: 2, bytes: 12 });
        assert_eq!(fs::read_to_string(&pool).unwrap(), "abc123XYZ-_9");
        assert_eq!(fs::read_to_string(&cursor).unwrap(), "0");
    }

    #[test]
    fn test_overwrites_existing_cursor() {
        let dir = tempdir().unwrap();
        let pool = dir.path().join("pool.dat");
        let cursor = dir.path().join("cursor.dat");
        fs::write(&cursor, "4242").unwrap();

        write_pool_file(&pool, &cursor, &["aaaaaa".to_string()]).unwrap();

        assert_eq!(fs::read_to_string(&cursor).unwrap(), "0");
    }

    #[test]
    fn test_reports_unwritable_path() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let err = write_pool_file(&blocker.join("pool.dat"), &dir.path().join("c"), &[])
            .unwrap_err();
        assert!(matches!(err, CodegenError::Io { .. }));
    }
}
