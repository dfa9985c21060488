//! Page discovery
//!
//! Walks the pages directory and turns the file list into named entries.
//! Templates and scripts are extracted separately from the same walk and
//! correlated later by name.

mod entry;

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{MpaError, Result};
use crate::utils::path_to_module_id;

pub use entry::{extract_entries, EntryMap, ExtensionPattern};

/// List page files below `root` as `/`-separated relative paths.
///
/// Entries starting with `.` or `__` are skipped, and skipped directories are
/// not entered. With `deep` unset only the root's immediate children are
/// listed, so nested pages stay invisible. Children are visited in file name
/// order, which keeps the resulting entry order stable across platforms.
pub fn walk_pages(root: &Path, deep: bool) -> Result<Vec<String>> {
    // A root that is a plain file yields nothing from walkdir at min_depth 1
    fs::read_dir(root).map_err(|err| MpaError::filesystem(root, err))?;

    let max_depth = if deep { usize::MAX } else { 1 };

    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry));

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        files.push(path_to_module_id(relative));
    }

    debug!("Found {} page files in {}", files.len(), root.display());

    Ok(files)
}

fn is_skipped(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name.starts_with("__")
}

fn walk_error(root: &Path, err: walkdir::Error) -> MpaError {
    let path = err
        .path()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, "filesystem loop detected"));
    MpaError::filesystem(path, source)
}
