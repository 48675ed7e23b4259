use uuid::Uuid;

use super::collision::Collision;
use super::modification::FileModification;

/// Terminal status of one install batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InstallStatus {
    Success,
    /// Only warnings were found; the caller may retry with warnings tolerated.
    ResolvableConflict,
    /// At least one clash; the batch cannot proceed as declared.
    UnresolvableConflict,
    /// A runtime failure occurred and the tree was rolled back to the batch
    /// minus its newest mod.
    RolledBackError,
    /// Rollback itself failed; all tracked state was wiped.
    FatalError,
}

impl InstallStatus {
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Outcome of `Installer::install`: the status, every collision found, and
/// the committed modification log (the persisted baseline consumed by the
/// next run).
#[derive(Clone, Debug)]
pub struct InstallReport {
    pub status: InstallStatus,
    pub collisions: Vec<Collision>,
    pub modifications: Vec<FileModification>,
    pub batch_uuid: Option<Uuid>,
    pub duration_ms: u64,
}
