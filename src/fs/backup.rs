//! Reserved-file backup store.
//!
//! Backups mirror the target tree's relative layout under `backup_root`. The
//! first mutation of a reserved file within an attempt copies it here; a file
//! already present is never overwritten, so repeated mutations of the same
//! file keep its pre-attempt bytes. Rollback copies everything back and
//! consumes the store; commit discards it.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ops;

#[derive(Debug)]
pub struct BackupStore {
    backup_root: PathBuf,
    target_root: PathBuf,
}

impl BackupStore {
    /// Open (and create if needed) the store rooted at `backup_root` for
    /// files under `target_root`. Backups left by an interrupted prior run
    /// are kept and will be restored by the next `restore_all`.
    pub fn open(backup_root: impl Into<PathBuf>, target_root: impl Into<PathBuf>) -> io::Result<Self> {
        let store = Self {
            backup_root: backup_root.into(),
            target_root: target_root.into(),
        };
        std::fs::create_dir_all(&store.backup_root)?;
        Ok(store)
    }

    /// Copy `file` into the store, keyed by its path relative to the target
    /// root. Idempotent: an existing backup is never overwritten.
    pub fn backup(&self, file: &Path) -> io::Result<()> {
        let rel = self.relative_of(file)?;
        let backup_path = self.backup_root.join(rel);
        if backup_path.exists() {
            return Ok(());
        }
        if let Some(parent) = backup_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(file, &backup_path)?;
        Ok(())
    }

    /// Every backed-up file, as (backup path, original target path) pairs.
    pub fn entries(&self) -> Vec<(PathBuf, PathBuf)> {
        let mut out = Vec::new();
        for entry in WalkDir::new(&self.backup_root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let backup = entry.path().to_path_buf();
            if let Ok(rel) = backup.strip_prefix(&self.backup_root) {
                out.push((backup.clone(), self.target_root.join(rel)));
            }
        }
        out
    }

    /// Copy every backup over its original location, then delete the backup
    /// payloads. Returns the restored target paths.
    pub fn restore_all(&self) -> io::Result<Vec<PathBuf>> {
        let entries = self.entries();
        let mut restored = Vec::with_capacity(entries.len());
        for (backup, target) in &entries {
            ops::copy_file(backup, target)?;
            restored.push(target.clone());
        }
        for (backup, _) in &entries {
            std::fs::remove_file(backup)?;
        }
        Ok(restored)
    }

    /// Discard all backup payloads without restoring (commit path).
    pub fn discard(&self) -> io::Result<()> {
        if self.backup_root.exists() {
            std::fs::remove_dir_all(&self.backup_root)?;
        }
        Ok(())
    }

    fn relative_of<'a>(&self, file: &'a Path) -> io::Result<&'a Path> {
        file.strip_prefix(&self.target_root).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} is outside the target tree {}",
                    file.display(),
                    self.target_root.display()
                ),
            )
        })
    }
}
