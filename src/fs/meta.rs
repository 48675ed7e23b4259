//! Content hashing helpers.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

/// SHA-256 of a file's contents, lowercase hex.
pub fn sha256_hex_of(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Whether two files have byte-identical contents. Unreadable files compare
/// as different; the detector treats that conservatively.
#[must_use]
pub fn same_content(a: &Path, b: &Path) -> bool {
    match (sha256_hex_of(a), sha256_hex_of(b)) {
        (Ok(ha), Ok(hb)) => ha == hb,
        _ => false,
    }
}
