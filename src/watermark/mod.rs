//! Per-directory watermark persistence
//!
//! A watermark is the greatest file name already mirrored from one source
//! directory. It lives next to the mirrored files, in a sentinel file inside
//! the destination directory. Everything that reads or writes watermarks goes
//! through [`WatermarkStore`], keyed by the destination directory path.

use crate::types::TidemarkError;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reserved name of the sentinel file inside each destination directory
pub const SENTINEL_FILE_NAME: &str = "last_copied.txt";

/// Key-value store of watermarks, keyed by destination directory.
///
/// Watermarks are raw file-name bytes; names are not required to be UTF-8.
pub trait WatermarkStore {
    /// Current watermark for `dest_dir`, or an empty value if none exists yet.
    fn read(&self, dest_dir: &Path) -> Result<Vec<u8>, TidemarkError>;

    /// Replace the watermark for `dest_dir`.
    ///
    /// Callers only write after a non-empty copy batch, so `dest_dir` exists.
    fn write(&mut self, dest_dir: &Path, watermark: &[u8]) -> Result<(), TidemarkError>;
}

/// Watermarks stored as `last_copied.txt` sentinel files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileWatermarkStore;

impl FileWatermarkStore {
    pub fn new() -> Self {
        Self
    }

    /// Location of the sentinel file for a destination directory
    pub fn sentinel_path(dest_dir: &Path) -> PathBuf {
        dest_dir.join(SENTINEL_FILE_NAME)
    }
}

impl WatermarkStore for FileWatermarkStore {
    fn read(&self, dest_dir: &Path) -> Result<Vec<u8>, TidemarkError> {
        let sentinel = Self::sentinel_path(dest_dir);
        match fs::read(&sentinel) {
            Ok(content) => Ok(trim_ascii_whitespace(&content).to_vec()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(TidemarkError::at(&sentinel, e)),
        }
    }

    fn write(&mut self, dest_dir: &Path, watermark: &[u8]) -> Result<(), TidemarkError> {
        let sentinel = Self::sentinel_path(dest_dir);
        fs::write(&sentinel, watermark).map_err(|e| TidemarkError::at(&sentinel, e))
    }
}

fn trim_ascii_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |idx| idx + 1);
    &bytes[start..end]
}

/// In-memory store, for tests and callers that keep watermarks elsewhere.
#[derive(Debug, Clone, Default)]
pub struct MemoryWatermarkStore {
    marks: BTreeMap<PathBuf, Vec<u8>>,
}

impl MemoryWatermarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of directories with a recorded watermark
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl WatermarkStore for MemoryWatermarkStore {
    fn read(&self, dest_dir: &Path) -> Result<Vec<u8>, TidemarkError> {
        Ok(self.marks.get(dest_dir).cloned().unwrap_or_default())
    }

    fn write(&mut self, dest_dir: &Path, watermark: &[u8]) -> Result<(), TidemarkError> {
        self.marks.insert(dest_dir.to_path_buf(), watermark.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_sentinel_reads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileWatermarkStore::new();

        let mark = store.read(temp_dir.path()).expect("read should succeed");
        assert!(mark.is_empty());
    }

    #[test]
    fn test_missing_directory_reads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = FileWatermarkStore::new();

        let mark = store
            .read(&temp_dir.path().join("never/created"))
            .expect("read should succeed");
        assert!(mark.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileWatermarkStore::new();

        store
            .write(temp_dir.path(), b"20240105.csv")
            .expect("write should succeed");

        let raw = fs::read_to_string(temp_dir.path().join(SENTINEL_FILE_NAME))
            .expect("sentinel should exist");
        assert_eq!(raw, "20240105.csv", "no trailing newline is written");
        assert_eq!(store.read(temp_dir.path()).unwrap(), b"20240105.csv");
    }

    #[test]
    fn test_read_trims_surrounding_whitespace() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(SENTINEL_FILE_NAME), "  b.txt \r\n")
            .expect("Failed to write sentinel");

        let store = FileWatermarkStore::new();
        assert_eq!(store.read(temp_dir.path()).unwrap(), b"b.txt");
    }

    #[test]
    fn test_write_overwrites_previous_value() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileWatermarkStore::new();

        store.write(temp_dir.path(), b"a.txt").unwrap();
        store.write(temp_dir.path(), b"d.txt").unwrap();

        assert_eq!(store.read(temp_dir.path()).unwrap(), b"d.txt");
    }

    #[test]
    fn test_unreadable_sentinel_propagates_error() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        // A directory where the sentinel file should be cannot be read as text.
        fs::create_dir(temp_dir.path().join(SENTINEL_FILE_NAME)).unwrap();

        let store = FileWatermarkStore::new();
        let err = store.read(temp_dir.path()).unwrap_err();
        assert!(err.is_filesystem_error());
        assert!(err.to_string().contains(SENTINEL_FILE_NAME));
    }

    #[test]
    fn test_write_into_missing_directory_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileWatermarkStore::new();

        let err = store
            .write(&temp_dir.path().join("missing"), b"a.txt")
            .unwrap_err();
        assert!(err.is_filesystem_error());
    }

    #[test]
    fn test_memory_store_is_keyed_by_directory() {
        let mut store = MemoryWatermarkStore::new();
        store.write(Path::new("/out/a"), b"1.txt").unwrap();
        store.write(Path::new("/out/b"), b"2.txt").unwrap();

        assert_eq!(store.read(Path::new("/out/a")).unwrap(), b"1.txt");
        assert_eq!(store.read(Path::new("/out/b")).unwrap(), b"2.txt");
        assert!(store.read(Path::new("/out/c")).unwrap().is_empty());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_whitespace_only_sentinel_reads_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(temp_dir.path().join(SENTINEL_FILE_NAME), " \n\t").unwrap();

        let store = FileWatermarkStore::new();
        assert!(store.read(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_non_utf8_watermark_is_stored_verbatim() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let mut store = FileWatermarkStore::new();

        store.write(temp_dir.path(), b"caf\xe9.txt").unwrap();

        assert_eq!(
            fs::read(temp_dir.path().join(SENTINEL_FILE_NAME)).unwrap(),
            b"caf\xe9.txt"
        );
        assert_eq!(store.read(temp_dir.path()).unwrap(), b"caf\xe9.txt");
    }
}
