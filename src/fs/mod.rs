//! Filesystem layer: the offset-translating patch writer, the reserved-file
//! backup store, and plain copy/move/list primitives.

pub mod backup;
pub mod meta;
pub mod ops;
pub mod patch;

pub use backup::BackupStore;
pub use patch::{PatchWriter, WriteRecord};
