//! Per-attempt mutable state.
//!
//! A session is created fresh for every attempt after the previous attempt's
//! effects have been undone, so the reserved-file snapshot it takes always
//! describes the pre-batch tree.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::InstallConfig;
use crate::fs::ops::list_files;
use crate::fs::{BackupStore, PatchWriter};
use crate::types::FileModification;

pub(crate) struct InstallSession<'a> {
    pub cfg: &'a InstallConfig,
    /// Files that existed in the target tree when the attempt began.
    reserved: HashSet<PathBuf>,
    /// Chronological record of every physical mutation this attempt made.
    pub log: Vec<FileModification>,
    pub writer: PatchWriter,
    pub backups: BackupStore,
    /// Dedup sets: archives already unpacked, scripts already decompiled,
    /// files already deleted. Two mods asking for the same pre-pass get it
    /// once.
    pub extracted: HashSet<PathBuf>,
    pub decompiled: HashSet<PathBuf>,
    pub deleted: HashSet<PathBuf>,
}

impl<'a> InstallSession<'a> {
    /// Snapshot the reserved set and open the backup store.
    pub(crate) fn begin(cfg: &'a InstallConfig) -> io::Result<Self> {
        std::fs::create_dir_all(&cfg.target_path)?;
        std::fs::create_dir_all(&cfg.temp_root)?;
        let reserved: HashSet<PathBuf> = list_files(&cfg.target_path).into_iter().collect();
        let backups = BackupStore::open(&cfg.backup_root, &cfg.target_path)?;
        Ok(Self {
            cfg,
            reserved,
            log: Vec::new(),
            writer: PatchWriter::new(),
            backups,
            extracted: HashSet::new(),
            decompiled: HashSet::new(),
            deleted: HashSet::new(),
        })
    }

    pub(crate) fn is_reserved(&self, path: &Path) -> bool {
        self.reserved.contains(path)
    }

    /// Preserve a reserved file's pre-attempt bytes before its first mutation.
    /// No-op for files the batch itself introduced.
    pub(crate) fn backup_if_reserved(&self, path: &Path) -> io::Result<()> {
        if self.is_reserved(path) && path.exists() {
            self.backups.backup(path)?;
        }
        Ok(())
    }

    pub(crate) fn record(&mut self, m: FileModification) {
        self.log.push(m);
    }
}
