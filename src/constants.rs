//! Shared crate-wide constants for Modbay.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Path prefix resolved against the configured game/target directory.
pub const GAME_PREFIX: &str = "[GAME]";

/// Path prefix resolved against the owning mod's cache directory.
pub const MOD_PREFIX: &str = "[MOD]";

/// Suffix appended to the file stem of decompiler output staged in the temp
/// directory; e.g. `boot.lua` decompiles into `boot_decomp.lua`.
pub const DECOMP_SUFFIX: &str = "_decomp";

/// Poll interval in milliseconds for the file-backed lock manager (see `adapters/lock.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// Default lock timeout used by `Installer::new()` unless overridden by `with_lock_timeout_ms()`.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// UUIDv5 namespace tag for deterministic batch/action IDs.
pub const NS_TAG: &str = "https://modbay/install";
