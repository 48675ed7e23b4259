//! The append-only audit log of physical mutations.
//!
//! `FileModification` records what the orchestrator actually did, in
//! chronological order; it is the sole source of truth for rollback and is
//! persisted after a commit so the next run can reason about previously
//! installed mods. Declared `Action`s are intent; this log is fact.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::action::ModId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModificationKind {
    Added,
    Moved,
    Deleted,
    Edited,
    Replaced,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileModification {
    pub file_path: PathBuf,
    pub kind: ModificationKind,
    /// Whether `file_path` existed in the target tree before the attempt began.
    pub reserved_file: bool,
    pub mod_id: ModId,
    /// Present only for `Moved`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
}

impl FileModification {
    pub fn new(
        file_path: impl Into<PathBuf>,
        kind: ModificationKind,
        reserved_file: bool,
        mod_id: ModId,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind,
            reserved_file,
            mod_id,
            destination: None,
        }
    }

    pub fn moved(
        file_path: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        reserved_file: bool,
        mod_id: ModId,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            kind: ModificationKind::Moved,
            reserved_file,
            mod_id,
            destination: Some(destination.into()),
        }
    }
}
