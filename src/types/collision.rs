use serde::{Deserialize, Serialize};

use super::action::ModId;

/// How badly two mods interfere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Advisory; does not block the batch unless warnings are not tolerated.
    Warning,
    /// Always aborts the batch.
    Clash,
}

/// Detected interference between two mods' operations.
///
/// Derived by the collision detector, reported in the install result, never
/// stored long-term.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Collision {
    pub offending_mod_id: ModId,
    pub severity: Severity,
    pub description: String,
}

impl Collision {
    pub fn new(offending_mod_id: ModId, severity: Severity, description: impl Into<String>) -> Self {
        Self {
            offending_mod_id,
            severity,
            description: description.into(),
        }
    }
}
