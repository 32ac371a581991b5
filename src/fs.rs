//! Filesystem helpers
//!
//! Atomic writes via tempfile + rename, content hashing for change
//! detection, and small traversal helpers shared by the clean and build
//! tasks.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::PipelineResult;

/// Write content to a file atomically.
///
/// Uses tempfile + rename in the destination directory so readers never
/// observe a half-written file. Parent directories are created as needed.
pub fn atomic_write(path: &Path, content: &[u8]) -> PipelineResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(content)?;
    tmp.persist(path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

/// Copy a file atomically, creating parent directories as needed.
pub fn copy_atomic(from: &Path, to: &Path) -> PipelineResult<()> {
    let content = fs::read(from)?;
    atomic_write(to, &content)
}

/// Compute SHA-256 hash of content
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

/// Compute SHA-256 hash of a file
pub fn hash_file(path: &Path) -> PipelineResult<String> {
    let content = fs::read(path)?;
    Ok(hash_content(&content))
}

/// All regular files under `dir`, sorted for deterministic ordering.
/// Returns an empty list when the directory does not exist.
pub fn walk_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| std::io::Error::other(e.to_string()))?;
        if entry.file_type().is_file() {
            files.push(entry.path().to_path_buf());
        }
    }
    Ok(files)
}

/// Remove a file if it exists; missing files are a successful no-op.
pub fn remove_file_if_exists(path: &Path) -> PipelineResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Remove every top-level entry of `dir` except those whose file name
/// matches an exclusion. Missing `dir` is a successful no-op.
///
/// Returns the removed entry paths.
pub fn clear_dir_excluding(dir: &Path, exclude: &[String]) -> PipelineResult<Vec<PathBuf>> {
    let mut removed = Vec::new();
    if !dir.exists() {
        return Ok(removed);
    }
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if exclude.iter().any(|e| e == name.as_ref()) {
            continue;
        }
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
        removed.push(path);
    }
    Ok(removed)
}
