//! Offset-translating binary patch writer.
//!
//! Mods author byte edits against the *original* layout of a file. Once one
//! edit has inserted or removed bytes, every later offset in that file is
//! stale; the writer keeps a per-file history of prior writes and remaps each
//! caller-supplied offset through it before touching the disk. Owns no
//! cross-file state and assumes a single writer per install attempt.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// One completed (or noted) write against a single file.
///
/// `offset` is in the file's original, pre-attempt coordinates.
/// `bytes_added` is the signed net growth: positive for insertion, zero for
/// in-place overwrite, negative for a range replacement that shrank the file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WriteRecord {
    pub offset: u64,
    pub bytes_written: u64,
    pub bytes_added: i64,
}

/// Per-attempt write history and the physical write primitives.
#[derive(Debug, Default)]
pub struct PatchWriter {
    cache: HashMap<PathBuf, Vec<WriteRecord>>,
}

impl PatchWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Translate an original-coordinate offset to the file's current physical
    /// coordinates: every prior write whose original offset is <= `offset`
    /// contributes its `bytes_added` delta.
    #[must_use]
    pub fn translate(&self, path: &Path, offset: u64) -> u64 {
        let Some(writes) = self.cache.get(path) else {
            return offset;
        };
        let mut delta: i64 = 0;
        let mut ordered: Vec<&WriteRecord> = writes.iter().collect();
        ordered.sort_by_key(|w| w.offset);
        for w in ordered {
            if w.offset <= offset {
                delta += w.bytes_added;
            } else {
                break;
            }
        }
        offset.saturating_add_signed(delta)
    }

    /// Splice or overwrite `bytes` at original offset `offset`.
    ///
    /// Insert mode grows the file by `bytes.len()`; overwrite mode replaces
    /// `bytes.len()` bytes in place with zero net growth. The history entry is
    /// recorded keyed by the original coordinates.
    pub fn write(
        &mut self,
        path: &Path,
        bytes: &[u8],
        offset: u64,
        insert: bool,
    ) -> io::Result<WriteRecord> {
        let actual = self.translate(path, offset) as usize;
        let mut file = std::fs::read(path)?;

        if insert {
            if actual > file.len() {
                return Err(out_of_bounds(path, actual, file.len()));
            }
            file.splice(actual..actual, bytes.iter().copied());
        } else {
            let end = actual
                .checked_add(bytes.len())
                .ok_or_else(|| out_of_bounds(path, actual, file.len()))?;
            if end > file.len() {
                return Err(out_of_bounds(path, end, file.len()));
            }
            file[actual..end].copy_from_slice(bytes);
        }
        std::fs::write(path, &file)?;

        let record = WriteRecord {
            offset,
            bytes_written: bytes.len() as u64,
            bytes_added: if insert { bytes.len() as i64 } else { 0 },
        };
        self.note(path, record);
        Ok(record)
    }

    /// Remove original range `[start, end)` and substitute `bytes`; net growth
    /// is `bytes.len() - (end - start)`.
    pub fn write_range(
        &mut self,
        path: &Path,
        bytes: &[u8],
        start: u64,
        end: u64,
    ) -> io::Result<WriteRecord> {
        if end < start {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("range end {end} precedes start {start}"),
            ));
        }
        let actual_start = self.translate(path, start) as usize;
        let actual_end = self.translate(path, end) as usize;
        let mut file = std::fs::read(path)?;
        if actual_end > file.len() || actual_start > actual_end {
            return Err(out_of_bounds(path, actual_end, file.len()));
        }
        file.splice(actual_start..actual_end, bytes.iter().copied());
        std::fs::write(path, &file)?;

        let record = WriteRecord {
            offset: start,
            bytes_written: bytes.len() as u64,
            bytes_added: bytes.len() as i64 - (end - start) as i64,
        };
        self.note(path, record);
        Ok(record)
    }

    /// Append a history entry without performing a physical write.
    ///
    /// The collision detector uses this to simulate another mod's declared
    /// writes before asking `can_write` about a candidate.
    pub fn note(&mut self, path: &Path, record: WriteRecord) {
        self.cache.entry(path.to_path_buf()).or_default().push(record);
    }

    /// Conservative write-vs-write interference query.
    ///
    /// Returns false when the candidate's start (or, when `replace` is set,
    /// its end) falls strictly inside the translated range of any write
    /// already in the history. Overlap anywhere means reject; no merge policy
    /// is attempted for partially overlapping replacements.
    #[must_use]
    pub fn can_write(
        &self,
        path: &Path,
        start: u64,
        end: Option<u64>,
        len: u64,
        replace: bool,
    ) -> bool {
        let Some(writes) = self.cache.get(path) else {
            return true;
        };
        for (idx, w) in writes.iter().enumerate() {
            let phys_start = self.physical_start(writes, idx);
            let phys_end = phys_start + w.bytes_written;
            let candidate_start = self.translate(path, start);
            if candidate_start > phys_start && candidate_start < phys_end {
                return false;
            }
            if replace {
                let candidate_end = self.translate(path, end.unwrap_or(start + len));
                if candidate_end > phys_start && candidate_end < phys_end {
                    return false;
                }
            }
        }
        true
    }

    /// Current physical start of history entry `idx`: deltas of every entry
    /// that landed at a lower original offset, or at the same offset earlier
    /// in insertion order.
    fn physical_start(&self, writes: &[WriteRecord], idx: usize) -> u64 {
        let this = &writes[idx];
        let mut delta: i64 = 0;
        for (j, w) in writes.iter().enumerate() {
            if j == idx {
                continue;
            }
            if w.offset < this.offset || (w.offset == this.offset && j < idx) {
                delta += w.bytes_added;
            }
        }
        this.offset.saturating_add_signed(delta)
    }

    /// Drop all history (start of a fresh attempt).
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

fn out_of_bounds(path: &Path, wanted: usize, len: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidInput,
        format!(
            "write beyond end of {} (offset {wanted}, file length {len})",
            path.display()
        ),
    )
}
