//! File scanning for indexing

use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Directories to exclude from scanning
const EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".cache",
    "vendor",
    "dist",
    "build",
    "__pycache__",
    ".venv",
    "target",
];

/// Scan a folder recursively for files with the given extension.
///
/// Hidden files and well-known junk directories are skipped. Results are
/// sorted by path so runs are deterministic.
pub fn scan_files(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let extension = extension.trim_start_matches('.');
    let mut results = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| !should_skip(e));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false)
        {
            results.push(path.to_path_buf());
        }
    }

    results.sort();
    Ok(results)
}

fn should_skip(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();

    if entry.depth() > 0 && name.starts_with('.') {
        return true;
    }

    entry.file_type().is_dir() && EXCLUDE_DIRS.iter().any(|d| name == *d)
}
