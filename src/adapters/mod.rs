//! External collaborator seams: archive unpacking, bytecode decompilation,
//! and cross-process attempt serialization.

pub mod decompile;
pub mod extract;
pub mod lock;

pub use decompile::{ScriptDecompiler, UnluacDecompiler};
pub use extract::{ArchiveExtractor, QuickBmsExtractor};
pub use lock::{FileLockManager, LockGuard, LockManager};
