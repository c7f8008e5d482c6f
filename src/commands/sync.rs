//! Main sync command

use crate::executor::{copy_batch, BatchStats, ExecutionCallback, ExecutionEvent};
use crate::scanner::{for_each_subdirectory, list_candidates, select_new};
use crate::types::{CandidateFile, TidemarkError};
use crate::watermark::{FileWatermarkStore, WatermarkStore};
use crate::Config;
use indicatif::HumanBytes;
use std::path::Path;
use tracing::{debug, info};

/// Totals for one sync run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Source subdirectories visited
    pub directories_scanned: usize,
    /// Subdirectories where at least one file was copied
    pub directories_synced: usize,
    /// Files copied (or that would be copied, in a dry run)
    pub files_copied: usize,
    /// Bytes copied
    pub bytes_copied: u64,
}

impl SyncStats {
    fn absorb(&mut self, batch: &BatchStats) {
        if batch.files_copied > 0 {
            self.directories_synced += 1;
        }
        self.files_copied += batch.files_copied;
        self.bytes_copied += batch.bytes_copied;
    }
}

/// Run the sync operation
///
/// Watermarks are kept in sentinel files. A dry run reads them and never
/// writes.
pub fn run(config: &Config) -> Result<SyncStats, TidemarkError> {
    let mut store = FileWatermarkStore::new();
    run_with_store(config, &mut store)
}

/// Run the sync operation against an arbitrary watermark store
///
/// With `config.dry_run` set, only the store's read side is used.
pub fn run_with_store<S>(config: &Config, store: &mut S) -> Result<SyncStats, TidemarkError>
where
    S: WatermarkStore + ?Sized,
{
    debug!(
        source = %config.source.display(),
        destination = %config.destination.display(),
        excluded = config.excluded.len(),
        dry_run = config.dry_run,
        "starting sync"
    );

    let mut stats = SyncStats::default();
    let report = |event: &ExecutionEvent<'_>| match event {
        ExecutionEvent::FileCopied { src, dest, .. } => {
            println!("Copied: {} -> {}", src.display(), dest.display());
        }
        ExecutionEvent::WatermarkAdvanced {
            dest_dir,
            watermark,
        } => {
            debug!(
                dir = %dest_dir.display(),
                watermark = %watermark.to_string_lossy(),
                "watermark advanced"
            );
        }
    };

    let scanned = for_each_subdirectory(&config.source, |src_dir, relative| {
        let dest_dir = config.destination.join(relative);
        let batch = sync_directory(src_dir, &dest_dir, config, &mut *store, Some(&report))?;
        stats.absorb(&batch);
        Ok(())
    })?;
    stats.directories_scanned = scanned;

    info!(
        scanned = stats.directories_scanned,
        synced = stats.directories_synced,
        files = stats.files_copied,
        "copied {}",
        HumanBytes(stats.bytes_copied)
    );

    Ok(stats)
}

/// Mirror the new files of a single source directory.
///
/// Lists the eligible files, reads the destination's watermark and copies
/// everything that sorts after it. A directory with no eligible files is left
/// alone entirely: the destination is not created and no watermark is read.
pub fn sync_directory<S>(
    src_dir: &Path,
    dest_dir: &Path,
    config: &Config,
    store: &mut S,
    on_event: Option<&ExecutionCallback>,
) -> Result<BatchStats, TidemarkError>
where
    S: WatermarkStore + ?Sized,
{
    let candidates = list_candidates(src_dir, &config.excluded)?;
    if candidates.is_empty() {
        debug!(dir = %src_dir.display(), "no eligible files");
        return Ok(BatchStats::default());
    }

    let watermark = store.read(dest_dir)?;
    let selected = select_new(candidates, &watermark);
    if selected.is_empty() {
        debug!(
            dir = %src_dir.display(),
            watermark = %String::from_utf8_lossy(&watermark),
            "up to date"
        );
        return Ok(BatchStats::default());
    }

    if config.dry_run {
        return Ok(plan_only(src_dir, dest_dir, &selected));
    }

    copy_batch(src_dir, dest_dir, &selected, store, on_event)
}

/// Report what a real run would copy. Touches neither the filesystem nor the
/// watermark store, so the selection stays pending for the next real run.
fn plan_only(src_dir: &Path, dest_dir: &Path, selected: &[CandidateFile]) -> BatchStats {
    let mut stats = BatchStats::default();
    for candidate in selected {
        println!(
            "Would copy: {} -> {}",
            src_dir.join(&candidate.name).display(),
            dest_dir.join(&candidate.name).display()
        );
        stats.files_copied += 1;
        stats.bytes_copied += candidate.size;
    }

    stats
}
