#![forbid(unsafe_code)]
//! Modbay: collision-checked, transactional mod installs.
//!
//! Safety model highlights:
//! - Every install attempt is all-or-nothing: reserved files are backed up before
//!   their first mutation, and any runtime failure rolls the target tree back by
//!   re-running the attempt without the newest mod.
//! - Byte-level edits go through an offset-translating patch writer, so offsets
//!   authored against the original file layout stay valid after earlier edits
//!   have shifted bytes.
//! - Interference between independently authored mods is detected before any
//!   mutation and reported as `Collision` values, never thrown.

pub mod constants;
pub mod adapters;
pub mod api;
pub mod config;
pub mod detect;
pub mod fs;
pub mod logging;
pub mod types;

pub use api::*;
