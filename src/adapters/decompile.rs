//! Bytecode-to-source decompilation collaborator.
//!
//! `decompile(input, output)` must leave the decompiled source at `output`.
//! Same failure contract as the extractor: errors are caught by the
//! orchestrator and trigger rollback.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

pub trait ScriptDecompiler: Send + Sync {
    fn decompile(&self, input: &Path, output: &Path) -> io::Result<()>;
}

/// Runs the unluac jar and captures its stdout as the decompiled source.
#[derive(Debug)]
pub struct UnluacDecompiler {
    jar: PathBuf,
}

impl UnluacDecompiler {
    #[must_use]
    pub fn new(jar: impl Into<PathBuf>) -> Self {
        Self { jar: jar.into() }
    }
}

impl ScriptDecompiler for UnluacDecompiler {
    fn decompile(&self, input: &Path, output: &Path) -> io::Result<()> {
        let out_file = File::create(output)?;
        let status = Command::new("java")
            .arg("-jar")
            .arg(&self.jar)
            .arg(input)
            .stdout(out_file)
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "unluac exited with {status} for {}",
                input.display()
            )))
        }
    }
}
