//! Per-directory candidate listing and watermark selection

use crate::config::ExtensionSet;
use crate::types::{CandidateFile, TidemarkError};
use std::fs;
use std::path::Path;

/// List the files in `dir` that are eligible for mirroring.
///
/// Only regular files directly inside `dir` qualify; symlinks and
/// subdirectories are ignored. Files with an excluded extension and empty
/// files are dropped. The result is sorted by file name in byte order.
pub fn list_candidates(
    dir: &Path,
    excluded: &ExtensionSet,
) -> Result<Vec<CandidateFile>, TidemarkError> {
    let entries = fs::read_dir(dir).map_err(|e| TidemarkError::at(dir, e))?;
    let mut candidates = Vec::new();

    for entry in entries {
        let entry = entry.map_err(|e| TidemarkError::at(dir, e))?;

        // DirEntry::file_type does not follow symlinks.
        let file_type = entry
            .file_type()
            .map_err(|e| TidemarkError::at(&entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name();
        if excluded.excludes(&name) {
            continue;
        }

        let size = entry
            .metadata()
            .map_err(|e| TidemarkError::at(&entry.path(), e))?
            .len();
        if size == 0 {
            continue;
        }

        candidates.push(CandidateFile::new(name, size));
    }

    candidates.sort();
    Ok(candidates)
}

/// Keep the candidates that sort strictly after `watermark`.
///
/// An empty watermark selects everything. Input order is preserved, so a
/// sorted input gives a sorted selection.
pub fn select_new(candidates: Vec<CandidateFile>, watermark: &[u8]) -> Vec<CandidateFile> {
    candidates
        .into_iter()
        .filter(|candidate| candidate.is_newer_than(watermark))
        .collect()
}
