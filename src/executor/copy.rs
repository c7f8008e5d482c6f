//! Atomic file copy implementation

use crate::types::TidemarkError;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Suffix of the temporary file a copy is streamed into
pub const PART_SUFFIX: &str = ".part";

/// Copy a file atomically using the write-then-rename strategy
///
/// 1. Stream into `<dest>.part` next to the destination
/// 2. Flush and sync to disk
/// 3. Preserve metadata (permissions, mtime)
/// 4. Rename over the destination
///
/// An existing destination file is replaced. The destination directory must
/// already exist. If any step fails the `.part` file is removed and the
/// destination is left as it was.
///
/// # Returns
/// * `Ok(u64)` - Number of bytes copied
/// * `Err(TidemarkError)` - IO failure, tagged with the path involved
///
/// # Example
/// ```no_run
/// use tidemark::executor::copy_file_atomic;
/// use std::path::Path;
///
/// let bytes = copy_file_atomic(Path::new("in/a.txt"), Path::new("out/a.txt"))?;
/// # Ok::<(), tidemark::TidemarkError>(())
/// ```
pub fn copy_file_atomic(src: &Path, dest: &Path) -> Result<u64, TidemarkError> {
    let part_path = part_path_for(dest);

    match stream_and_commit(src, dest, &part_path) {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            let _ = fs::remove_file(&part_path);
            Err(err)
        }
    }
}

/// `<dest>.part`, keeping the full destination name (so `a.txt` and `a.bin`
/// never share a temporary file).
pub fn part_path_for(dest: &Path) -> PathBuf {
    let mut name: OsString = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(PART_SUFFIX);
    dest.with_file_name(name)
}

fn stream_and_commit(src: &Path, dest: &Path, part_path: &Path) -> Result<u64, TidemarkError> {
    // ═══════════════════════════════════════════════════════════
    // STEP 1: Copy - Stream from src to .part file
    // ═══════════════════════════════════════════════════════════
    let mut src_file = File::open(src).map_err(|e| TidemarkError::at(src, e))?;
    let mut part_file = File::create(part_path).map_err(|e| TidemarkError::at(part_path, e))?;

    let mut buffer = vec![0u8; 128 * 1024];
    let mut total_bytes = 0u64;

    loop {
        let bytes_read = src_file
            .read(&mut buffer)
            .map_err(|e| TidemarkError::at(src, e))?;

        if bytes_read == 0 {
            break; // EOF
        }

        part_file
            .write_all(&buffer[..bytes_read])
            .map_err(|e| TidemarkError::at(part_path, e))?;
        total_bytes += bytes_read as u64;
    }

    // ═══════════════════════════════════════════════════════════
    // STEP 2: Flush - Force OS to write data to physical disk
    // ═══════════════════════════════════════════════════════════
    part_file
        .sync_all()
        .map_err(|e| TidemarkError::at(part_path, e))?;

    // Both handles are released before the rename (required on Windows).
    drop(part_file);
    drop(src_file);

    // ═══════════════════════════════════════════════════════════
    // STEP 3: Metadata - Preserve permissions and mtime
    // ═══════════════════════════════════════════════════════════
    let src_metadata = fs::metadata(src).map_err(|e| TidemarkError::at(src, e))?;

    let mtime = src_metadata
        .modified()
        .map_err(|e| TidemarkError::at(src, e))?;
    filetime::set_file_mtime(part_path, filetime::FileTime::from_system_time(mtime))
        .map_err(|e| TidemarkError::at(part_path, e))?;

    fs::set_permissions(part_path, src_metadata.permissions())
        .map_err(|e| TidemarkError::at(part_path, e))?;

    // ═══════════════════════════════════════════════════════════
    // STEP 4: Commit - Atomic rename to final destination
    // ═══════════════════════════════════════════════════════════
    fs::rename(part_path, dest).map_err(|e| TidemarkError::at(dest, e))?;

    Ok(total_bytes)
}
