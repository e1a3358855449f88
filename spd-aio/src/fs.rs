/*
File: spd-aio/src/fs.rs
Purpose: Filesystem scans over job output directories.
*/
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

/// Recursively collects regular files under `dir` whose extension matches one of
/// `extensions` (case-insensitive, without the dot). Sorted by path.
///
/// A missing directory yields an empty list; unreadable entries are skipped.
pub fn collect_audio_files(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();
    files.sort();
    debug!("Found {} matching file(s) under {}", files.len(), dir.display());
    files
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
}
