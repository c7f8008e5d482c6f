//! Executor module for copy batches

pub mod copy;

use crate::types::{CandidateFile, TidemarkError};
use crate::watermark::WatermarkStore;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};

pub use copy::copy_file_atomic;

/// Outcome of one directory's copy batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    /// Number of files copied
    pub files_copied: usize,
    /// Aggregate copied bytes
    pub bytes_copied: u64,
    /// Watermark written after the batch, if anything was copied
    pub watermark: Option<OsString>,
}

/// Events emitted while executing a batch.
#[derive(Debug)]
pub enum ExecutionEvent<'a> {
    /// A file was fully copied into place.
    FileCopied {
        src: &'a Path,
        dest: &'a Path,
        bytes: u64,
    },
    /// The directory's watermark was advanced.
    WatermarkAdvanced {
        dest_dir: &'a Path,
        watermark: &'a OsStr,
    },
}

/// Optional callback used to receive execution events.
pub type ExecutionCallback = dyn for<'a> Fn(&ExecutionEvent<'a>);

/// Copy `selected` from `src_dir` into `dest_dir`, then advance the watermark.
///
/// `selected` must be sorted ascending; its last element becomes the new
/// watermark. An empty selection is a no-op: the destination directory is not
/// created and the store is not touched.
///
/// Files are copied in order and the first failure aborts the batch. Files
/// already copied stay in place and the watermark keeps its previous value, so
/// the next run copies them again.
pub fn copy_batch<S>(
    src_dir: &Path,
    dest_dir: &Path,
    selected: &[CandidateFile],
    store: &mut S,
    on_event: Option<&ExecutionCallback>,
) -> Result<BatchStats, TidemarkError>
where
    S: WatermarkStore + ?Sized,
{
    let mut stats = BatchStats::default();

    let Some(last) = selected.last() else {
        return Ok(stats);
    };

    fs::create_dir_all(dest_dir).map_err(|e| TidemarkError::at(dest_dir, e))?;

    for candidate in selected {
        let src_path: PathBuf = src_dir.join(&candidate.name);
        let dest_path: PathBuf = dest_dir.join(&candidate.name);

        let bytes = copy_file_atomic(&src_path, &dest_path)?;
        stats.files_copied += 1;
        stats.bytes_copied += bytes;

        emit_event(
            on_event,
            ExecutionEvent::FileCopied {
                src: &src_path,
                dest: &dest_path,
                bytes,
            },
        );
    }

    store.write(dest_dir, last.name_bytes())?;
    emit_event(
        on_event,
        ExecutionEvent::WatermarkAdvanced {
            dest_dir,
            watermark: &last.name,
        },
    );
    stats.watermark = Some(last.name.clone());

    Ok(stats)
}

fn emit_event(on_event: Option<&ExecutionCallback>, event: ExecutionEvent<'_>) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
