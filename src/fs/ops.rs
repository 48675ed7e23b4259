//! Plain filesystem primitives used by the orchestrator.

use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;
use walkdir::WalkDir;

/// Copy `src` over `dest`, creating parent directories as needed.
pub fn copy_file(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::copy(src, dest)?;
    Ok(())
}

/// Move `src` to `dest`, creating parent directories as needed. Falls back to
/// copy-and-delete when the rename crosses filesystems.
pub fn move_file(src: &Path, dest: &Path) -> io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    match std::fs::rename(src, dest) {
        Ok(()) => Ok(()),
        // Cross-device renames (mod cache and game tree on different mounts)
        // fail with EXDEV; degrade to copy-and-delete.
        Err(_) => {
            std::fs::copy(src, dest)?;
            std::fs::remove_file(src)
        }
    }
}

/// Every regular file under `root`, recursively. Missing roots list as empty.
#[must_use]
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// Files under `dir` whose *file name* matches `pattern`, in directory walk
/// order. `include_subfolders` limits the walk depth to the directory itself
/// when false.
pub fn filtered_files(
    dir: &Path,
    pattern: &str,
    include_subfolders: bool,
) -> io::Result<Vec<PathBuf>> {
    let re = Regex::new(pattern)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("bad file filter: {e}")))?;
    let walker = if include_subfolders {
        WalkDir::new(dir)
    } else {
        WalkDir::new(dir).max_depth(1)
    };
    Ok(walker
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| re.is_match(name))
        })
        .map(|e| e.path().to_path_buf())
        .collect())
}
