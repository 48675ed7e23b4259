// Facade for API module; delegates to submodules under src/api/

use crate::adapters::{ArchiveExtractor, LockManager, ScriptDecompiler};
use crate::config::InstallConfig;
use crate::constants::DEFAULT_LOCK_TIMEOUT_MS;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{InstallReport, ModDescriptor};

mod apply;
pub mod errors;
mod handlers;
mod session;

pub use errors::ApiError;

/// The install engine facade.
///
/// Construct one per target installation, attach the collaborators the batch
/// needs, then call [`install`](Self::install) per batch. The installer holds
/// no mutable state of its own; everything per-attempt lives in the session.
pub struct Installer<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    cfg: InstallConfig,
    extractor: Option<Box<dyn ArchiveExtractor>>, // needed only for ExtractArchive actions
    decompiler: Option<Box<dyn ScriptDecompiler>>, // needed only for DecompileScript actions
    lock: Option<Box<dyn LockManager>>, // None when the embedder is single-process
    lock_timeout_ms: u64,
}

impl<E: FactsEmitter, A: AuditSink> Installer<E, A> {
    pub fn new(facts: E, audit: A, cfg: InstallConfig) -> Self {
        Self {
            facts,
            audit,
            cfg,
            extractor: None,
            decompiler: None,
            lock: None,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_extractor(mut self, extractor: Box<dyn ArchiveExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    #[must_use]
    pub fn with_decompiler(mut self, decompiler: Box<dyn ScriptDecompiler>) -> Self {
        self.decompiler = Some(decompiler);
        self
    }

    #[must_use]
    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    #[must_use]
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Install `mods` as one batch.
    ///
    /// With `ignore_warnings` false, any warning-severity collision aborts
    /// before mutation with `ResolvableConflict`; the caller may present the
    /// warnings and retry with `ignore_warnings` true. Clash-severity
    /// collisions always abort.
    pub fn install(
        &self,
        mods: &[ModDescriptor],
        ignore_warnings: bool,
    ) -> Result<InstallReport, ApiError> {
        apply::run(self, mods, ignore_warnings)
    }
}
