//! Sequential subdirectory walker

use crate::types::TidemarkError;
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Visit every subdirectory below `root_path`, depth-first in lexical order.
///
/// The root itself is not visited. Symbolic links are never followed, so a
/// link to a directory is neither visited nor descended into. `visit`
/// receives the absolute directory path and its path relative to the root.
///
/// # Returns
/// * `Ok(usize)` - Number of directories visited
/// * `Err(TidemarkError)` - The root is missing or not a directory, any entry
///   could not be read, or `visit` failed. The walk stops at the first error.
pub fn for_each_subdirectory<F>(root_path: &Path, mut visit: F) -> Result<usize, TidemarkError>
where
    F: FnMut(&Path, &Path) -> Result<(), TidemarkError>,
{
    let root_metadata = fs::metadata(root_path).map_err(|e| TidemarkError::at(root_path, e))?;
    if !root_metadata.is_dir() {
        return Err(TidemarkError::NotADirectory(root_path.to_path_buf()));
    }

    // No ignore files, no hidden-file filtering: every directory is mirrored.
    let walker = ignore::WalkBuilder::new(root_path)
        .standard_filters(false)
        .follow_links(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    let mut visited = 0usize;

    for result in walker {
        let entry = result.map_err(|e| walk_error(root_path, e))?;

        if entry.depth() == 0 {
            continue;
        }

        let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
        if !is_dir {
            continue;
        }

        let relative_path = entry.path().strip_prefix(root_path).map_err(|_| {
            TidemarkError::at(
                entry.path(),
                io::Error::other("directory is not below the source root"),
            )
        })?;

        visit(entry.path(), relative_path)?;
        visited += 1;
    }

    Ok(visited)
}

fn walk_error(root_path: &Path, error: ignore::Error) -> TidemarkError {
    let kind = error
        .io_error()
        .map(|e| e.kind())
        .unwrap_or(ErrorKind::Other);
    TidemarkError::at(root_path, io::Error::new(kind, error.to_string()))
}
