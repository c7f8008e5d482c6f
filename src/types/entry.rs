//! CandidateFile - A file eligible for mirroring from one source directory

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ffi::{OsStr, OsString};

/// A regular file discovered while listing a single source directory.
///
/// Only the bare file name is kept; the directory it belongs to is implied by
/// the walk. The name is kept as the platform gives it, so names that are not
/// valid UTF-8 are mirrored too. Ordering is byte-ordinal on the name, which is
/// the same ordering the watermark comparison uses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CandidateFile {
    /// File name (no directory component)
    pub name: OsString,

    /// File size in bytes
    pub size: u64,
}

impl CandidateFile {
    /// Create a new CandidateFile
    pub fn new(name: impl Into<OsString>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Raw bytes of the name, as stored in the watermark.
    pub fn name_bytes(&self) -> &[u8] {
        name_bytes(&self.name)
    }

    /// Whether this file sorts strictly after the given watermark.
    ///
    /// An empty watermark means nothing has been copied yet.
    pub fn is_newer_than(&self, watermark: &[u8]) -> bool {
        watermark.is_empty() || self.name_bytes() > watermark
    }
}

/// Byte view of a file name.
///
/// On unix this is exactly the name as stored by the filesystem.
pub fn name_bytes(name: &OsStr) -> &[u8] {
    name.as_encoded_bytes()
}

impl PartialOrd for CandidateFile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CandidateFile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name_bytes()
            .cmp(other.name_bytes())
            .then(self.size.cmp(&other.size))
    }
}
