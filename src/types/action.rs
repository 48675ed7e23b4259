//! The closed set of declarative file operations a mod may contribute.
//!
//! Actions are immutable once loaded; ownership belongs to the mod package
//! that declared them. Serialization uses an `action` tag so manifests stay
//! readable and the set stays closed: unknown tags fail at load time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use super::modpath::ModPath;

/// One byte-level edit inside a `WriteToFile` action.
///
/// `start_offset`/`end_offset` are expressed against the file's original,
/// pre-attempt layout. When `end_offset` is present the edit replaces the
/// range `[start, end)`; otherwise `replace` selects overwrite (true) or
/// insertion (false) at `start_offset`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WriteContent {
    pub start_offset: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<ModPath>,
    #[serde(default)]
    pub replace: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "PascalCase")]
pub enum Action {
    CopyFile {
        target: ModPath,
        destination: ModPath,
    },
    CopyFiles {
        target_directory: ModPath,
        destination: ModPath,
        file_filter: String,
        #[serde(default)]
        include_subfolders: bool,
    },
    MoveFile {
        target: ModPath,
        destination: ModPath,
    },
    MoveFiles {
        target_directory: ModPath,
        destination: ModPath,
        file_filter: String,
        #[serde(default)]
        include_subfolders: bool,
    },
    ReplaceFile {
        target: ModPath,
        replacement: ModPath,
    },
    ReplaceFiles {
        target_directory: ModPath,
        destination: ModPath,
        file_filter: String,
        #[serde(default)]
        include_subfolders: bool,
    },
    DeleteFiles {
        targets: Vec<ModPath>,
    },
    WriteToFile {
        target: ModPath,
        content: Vec<WriteContent>,
    },
    ExtractArchive {
        targets: Vec<ModPath>,
        #[serde(default)]
        delete_when_complete: bool,
    },
    DecompileScript {
        targets: Vec<ModPath>,
    },
}

/// Stable identifier a mod package declares for itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModId(pub String);

impl std::fmt::Display for ModId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A resolved mod as handed to the installer: identity, cache location,
/// user-chosen parameters, and the parsed action list. The package loader
/// that produces these is an external collaborator.
#[derive(Clone, Debug)]
pub struct ModDescriptor {
    pub id: ModId,
    /// Directory name under the configured mod cache root.
    pub cache_name: String,
    pub parameters: HashMap<String, String>,
    pub actions: Vec<Action>,
}

impl ModDescriptor {
    pub fn new(id: impl Into<String>, cache_name: impl Into<String>) -> Self {
        Self {
            id: ModId(id.into()),
            cache_name: cache_name.into(),
            parameters: HashMap::new(),
            actions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_actions(mut self, actions: Vec<Action>) -> Self {
        self.actions = actions;
        self
    }

    /// The mod's cache directory under `mod_cache_root`.
    #[must_use]
    pub fn cache_dir(&self, mod_cache_root: &std::path::Path) -> PathBuf {
        mod_cache_root.join(&self.cache_name)
    }
}

/// An action paired with its owning mod, as stored in the per-kind buckets.
#[derive(Clone, Debug)]
pub struct ModAction {
    pub mod_id: ModId,
    pub cache_dir: PathBuf,
    pub action: Action,
}

/// Declared actions of the current install batch, bucketed by kind.
///
/// Insertion order across mods is preserved per bucket; that order is the
/// tie-break when two actions are compatible but order-sensitive (two inserts
/// into the same file, for instance). Rebuilt fresh for every attempt.
#[derive(Clone, Debug, Default)]
pub struct ModActionCollection {
    pub extracts: Vec<ModAction>,
    pub decompiles: Vec<ModAction>,
    pub copies: Vec<ModAction>,
    pub bulk_copies: Vec<ModAction>,
    pub replaces: Vec<ModAction>,
    pub bulk_replaces: Vec<ModAction>,
    pub writes: Vec<ModAction>,
    pub moves: Vec<ModAction>,
    pub bulk_moves: Vec<ModAction>,
    pub deletes: Vec<ModAction>,
}

impl ModActionCollection {
    /// Bucket every declared action of `mod_` in declaration order.
    pub fn add_mod(&mut self, mod_: &ModDescriptor, mod_cache_root: &std::path::Path) {
        let cache_dir = mod_.cache_dir(mod_cache_root);
        for action in &mod_.actions {
            let entry = ModAction {
                mod_id: mod_.id.clone(),
                cache_dir: cache_dir.clone(),
                action: action.clone(),
            };
            match action {
                Action::ExtractArchive { .. } => self.extracts.push(entry),
                Action::DecompileScript { .. } => self.decompiles.push(entry),
                Action::CopyFile { .. } => self.copies.push(entry),
                Action::CopyFiles { .. } => self.bulk_copies.push(entry),
                Action::ReplaceFile { .. } => self.replaces.push(entry),
                Action::ReplaceFiles { .. } => self.bulk_replaces.push(entry),
                Action::WriteToFile { .. } => self.writes.push(entry),
                Action::MoveFile { .. } => self.moves.push(entry),
                Action::MoveFiles { .. } => self.bulk_moves.push(entry),
                Action::DeleteFiles { .. } => self.deletes.push(entry),
            }
        }
    }

    /// All buckets in the fixed apply precedence order.
    pub fn iter_all(&self) -> impl Iterator<Item = &ModAction> {
        self.extracts
            .iter()
            .chain(&self.decompiles)
            .chain(&self.copies)
            .chain(&self.bulk_copies)
            .chain(&self.replaces)
            .chain(&self.bulk_replaces)
            .chain(&self.writes)
            .chain(&self.moves)
            .chain(&self.bulk_moves)
            .chain(&self.deletes)
    }
}
