//! Archive extraction collaborator.
//!
//! The engine treats the unpacker as a black box that produces files on disk:
//! `extract(archive, out_dir)` must leave the archive's contents under
//! `out_dir/<archive stem>/`. Failures surface as I/O errors on the
//! orchestrator's failure path.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, archive: &Path, out_dir: &Path) -> io::Result<()>;
}

/// Runs the QuickBMS executable with a game-specific unpack script.
///
/// Expects `<tool_root>/quickbms/quickbms` and a `.bms` script next to it.
#[derive(Debug)]
pub struct QuickBmsExtractor {
    tool_root: PathBuf,
    script: PathBuf,
}

impl QuickBmsExtractor {
    #[must_use]
    pub fn new(tool_root: impl Into<PathBuf>, script: impl Into<PathBuf>) -> Self {
        Self {
            tool_root: tool_root.into(),
            script: script.into(),
        }
    }
}

impl ArchiveExtractor for QuickBmsExtractor {
    fn extract(&self, archive: &Path, out_dir: &Path) -> io::Result<()> {
        let program = self.tool_root.join("quickbms").join("quickbms");
        let status = Command::new(&program)
            .arg(&self.script)
            .arg(archive)
            .arg(out_dir)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "quickbms exited with {status} for {}",
                archive.display()
            )))
        }
    }
}
