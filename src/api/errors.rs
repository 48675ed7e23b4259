use std::path::PathBuf;

use thiserror::Error;

/// Errors the embedder must handle before any attempt runs.
///
/// Everything that happens after the lock is held is reported through
/// `InstallReport::status` instead; a runtime failure mid-attempt rolls the
/// tree back rather than surfacing here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("locking timeout: {0}")]
    LockingTimeout(String),
    #[error("filesystem error: {0}")]
    FilesystemError(String),
}

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        use crate::types::errors::ErrorKind::{InvalidPath, Io, Lock};
        match e.kind {
            InvalidPath | Io => ApiError::FilesystemError(e.msg),
            Lock => ApiError::LockingTimeout(e.msg),
        }
    }
}

/// Failure inside one install attempt. Triggers the revert path.
#[derive(Debug, Error)]
pub(crate) enum InstallError {
    #[error("target file missing: {0}")]
    MissingTarget(PathBuf),
    #[error("no archive extractor configured")]
    NoExtractor,
    #[error("no script decompiler configured")]
    NoDecompiler,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
