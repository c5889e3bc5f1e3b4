//! Blocking filesystem operations used by a publishing pass

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use filetime::FileTime;
use fs2::FileExt;

use crate::{Error, Result};

/// Ensure a directory exists, creating it and any missing parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    tracing::debug!(dir = %path.display(), "Creating output directory");
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Read the full contents of a file.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::io(path, e))
}

/// Read text content from a file.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Last modification time of a file, following symlinks.
pub fn modified_time(path: &Path) -> Result<FileTime> {
    let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
    Ok(FileTime::from_last_modification_time(&meta))
}

/// Size of a file in bytes, following symlinks.
pub fn file_size(path: &Path) -> Result<u64> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|e| Error::io(path, e))
}

/// Copy `src` over `dst` and give `dst` the access and modification
/// times of `src`.
///
/// Symlinks at `src` are dereferenced; an existing `dst` is overwritten.
/// Returns the number of bytes copied.
pub fn copy_preserving_mtime(src: &Path, dst: &Path) -> Result<u64> {
    let meta = fs::metadata(src).map_err(|e| Error::io(src, e))?;
    let copied = fs::copy(src, dst).map_err(|e| Error::io(dst, e))?;

    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_times(dst, atime, mtime).map_err(|e| Error::io(dst, e))?;

    Ok(copied)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename so readers never observe a partially
/// written file. Acquires an advisory lock on the temp file while writing.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_dir(parent)?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .sync_all()
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    fs::rename(&temp_path, path).map_err(|e| Error::io(path, e))?;

    Ok(())
}
