//! Install configuration: the value object handed to `Installer::new`.

use std::path::{Path, PathBuf};

use crate::types::FileModification;

/// Directories and baseline state for one installer instance.
///
/// `baseline` is the committed modification log of the previous run, if any;
/// the detector uses it to reason about previously installed mods and the
/// first attempt of a run consumes any backups left by an interrupted one.
#[derive(Clone, Debug)]
pub struct InstallConfig {
    /// Root of the target application's asset tree.
    pub target_path: PathBuf,
    /// Root under which each mod's cache directory lives.
    pub mod_cache_root: PathBuf,
    /// Scratch space for extraction and decompilation output; recreated per
    /// attempt, deleted on completion.
    pub temp_root: PathBuf,
    /// Backup store for reserved files; consumed on rollback, discarded on commit.
    pub backup_root: PathBuf,
    /// Root of the external tool installation (archive unpacker, decompiler).
    pub tool_path: Option<PathBuf>,
    /// Committed modification log from the previous run.
    pub baseline: Vec<FileModification>,
}

impl InstallConfig {
    pub fn new(
        target_path: impl Into<PathBuf>,
        mod_cache_root: impl Into<PathBuf>,
        temp_root: impl Into<PathBuf>,
        backup_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            mod_cache_root: mod_cache_root.into(),
            temp_root: temp_root.into(),
            backup_root: backup_root.into(),
            tool_path: None,
            baseline: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tool_path(mut self, tool_path: impl Into<PathBuf>) -> Self {
        self.tool_path = Some(tool_path.into());
        self
    }

    #[must_use]
    pub fn with_baseline(mut self, baseline: Vec<FileModification>) -> Self {
        self.baseline = baseline;
        self
    }

    /// Resolve a game-relative path against `target_path`.
    #[must_use]
    pub fn game_path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.target_path.join(rel)
    }
}
