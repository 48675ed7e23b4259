//! Collision detector: classifies interference between mods' declared actions.
//!
//! Pure with respect to the install session: the detector reads action
//! declarations (and, for bulk actions and content comparisons, the files they
//! reference) but never mutates anything. Severity is `Clash` when two mods
//! try to own the same bytes or the same destination, `Warning` when the
//! interaction is usually harmless (deleting a file another mod moved away).
//!
//! "Different content" is decided by content hash, not path equality: two mods
//! producing byte-identical output at the same destination do not collide.

use std::path::PathBuf;

use crate::config::InstallConfig;
use crate::fs::meta::same_content;
use crate::fs::ops::filtered_files;
use crate::fs::patch::{PatchWriter, WriteRecord};
use crate::types::{
    Action, Collision, FileModification, ModActionCollection, ModId, ModPath, ModificationKind,
    Severity, WriteContent,
};

/// A declared byte edit with its length resolved (text or data-file size).
#[derive(Clone, Copy, Debug)]
struct ResolvedWrite {
    start: u64,
    end: Option<u64>,
    len: u64,
    replace: bool,
}

impl ResolvedWrite {
    /// History entry equivalent to this declared edit, for `can_write`
    /// simulation.
    fn as_record(self) -> WriteRecord {
        match self.end {
            Some(end) => WriteRecord {
                offset: self.start,
                bytes_written: self.len,
                bytes_added: self.len as i64 - end.saturating_sub(self.start) as i64,
            },
            None => WriteRecord {
                offset: self.start,
                bytes_written: self.len,
                bytes_added: if self.replace { 0 } else { self.len as i64 },
            },
        }
    }

    /// A range replacement or in-place overwrite claims ownership of existing
    /// bytes; a pure insert does not.
    const fn claims_bytes(self) -> bool {
        self.replace || self.end.is_some()
    }
}

/// One singular file operation after path resolution and bulk expansion.
#[derive(Clone, Debug)]
enum OpKind {
    Copy { source: PathBuf, dest: PathBuf },
    Move { source: PathBuf, dest: PathBuf },
    Replace { target: PathBuf, replacement: PathBuf },
    Delete { target: PathBuf },
    Write { target: PathBuf, edits: Vec<ResolvedWrite> },
}

#[derive(Clone, Debug)]
struct FileOp {
    mod_id: ModId,
    kind: OpKind,
}

/// Report every conflicting pairing between `candidate`'s operations and (a)
/// the operations of every other mod in the collection, and (b) the persisted
/// modification log of previously installed mods.
///
/// Running this once per mod in install order and accumulating the results is
/// the complete algorithm; symmetric pairs are order-independent, so no global
/// fixed-point pass is needed.
pub fn collisions_for(
    cfg: &InstallConfig,
    collection: &ModActionCollection,
    candidate: &ModId,
    baseline: &[FileModification],
) -> Vec<Collision> {
    let ops = normalize(cfg, collection);
    // Order-stable partition, not a destructive split.
    let mine: Vec<&FileOp> = ops.iter().filter(|op| &op.mod_id == candidate).collect();
    let others: Vec<&FileOp> = ops.iter().filter(|op| &op.mod_id != candidate).collect();

    let mut collisions = Vec::new();
    for op in &mine {
        check_op(candidate, op, &others, &mut collisions);
        check_against_log(candidate, op, baseline, &mut collisions);
    }
    collisions
}

fn check_op(
    candidate: &ModId,
    op: &FileOp,
    others: &[&FileOp],
    out: &mut Vec<Collision>,
) {
    match &op.kind {
        OpKind::Write { target, edits } => {
            for other in others {
                match &other.kind {
                    OpKind::Delete { target: t } if t == target => {
                        out.push(clash(candidate, other, "write to", "deleted by"));
                    }
                    OpKind::Move { source, .. } if source == target => {
                        out.push(clash(candidate, other, "write to", "moved by"));
                    }
                    OpKind::Replace { target: t, .. } if t == target => {
                        out.push(clash(candidate, other, "write to", "replaced by"));
                    }
                    OpKind::Write { target: t, edits: other_edits } if t == target => {
                        if writes_interfere(target, edits, other_edits) {
                            out.push(clash(candidate, other, "write to", "written to by"));
                        }
                    }
                    _ => {}
                }
            }
        }
        OpKind::Move { source, dest } => {
            for other in others {
                match &other.kind {
                    OpKind::Write { target, .. } if target == source => {
                        out.push(clash(candidate, other, "move", "written to by"));
                    }
                    OpKind::Replace { target, .. } if target == source => {
                        out.push(clash(candidate, other, "move", "replaced by"));
                    }
                    OpKind::Move { source: s, dest: d } if s == source && d != dest => {
                        out.push(clash(candidate, other, "move", "moved elsewhere by"));
                    }
                    OpKind::Move { source: s, dest: d } if d == dest && s != source => {
                        if !same_content(source, s) {
                            out.push(dest_clash(candidate, other, "move"));
                        }
                    }
                    OpKind::Copy { source: s, dest: d } if d == dest && s != source => {
                        if !same_content(source, s) {
                            out.push(dest_clash(candidate, other, "move"));
                        }
                    }
                    OpKind::Delete { target } if target == source => {
                        out.push(warning(candidate, other, "move", "deleted by"));
                    }
                    _ => {}
                }
            }
        }
        OpKind::Replace { target, replacement } => {
            for other in others {
                match &other.kind {
                    OpKind::Move { source, .. } if source == target => {
                        out.push(clash(candidate, other, "replace", "moved by"));
                    }
                    OpKind::Delete { target: t } if t == target => {
                        out.push(clash(candidate, other, "replace", "deleted by"));
                    }
                    OpKind::Write { target: t, .. } if t == target => {
                        out.push(clash(candidate, other, "replace", "written to by"));
                    }
                    OpKind::Replace { target: t, replacement: r } if t == target => {
                        if !same_content(replacement, r) {
                            out.push(clash(candidate, other, "replace", "replaced by"));
                        }
                    }
                    _ => {}
                }
            }
        }
        OpKind::Delete { target } => {
            for other in others {
                match &other.kind {
                    OpKind::Write { target: t, .. } if t == target => {
                        out.push(clash(candidate, other, "delete", "written to by"));
                    }
                    OpKind::Replace { target: t, .. } if t == target => {
                        out.push(clash(candidate, other, "delete", "replaced by"));
                    }
                    OpKind::Move { source, .. } if source == target => {
                        out.push(warning(candidate, other, "delete", "moved by"));
                    }
                    _ => {}
                }
            }
        }
        OpKind::Copy { source, dest } => {
            for other in others {
                match &other.kind {
                    OpKind::Copy { source: s, dest: d } | OpKind::Move { source: s, dest: d }
                        if d == dest && s != source =>
                    {
                        if !same_content(source, s) {
                            out.push(dest_clash(candidate, other, "copy"));
                        }
                    }
                    _ => {}
                }
            }
        }
    }
}

/// Check one operation against the persisted modification log. The log is the
/// record of what previous installs did to the tree; only the most recent
/// entry for a given path matters, and entries written by the candidate itself
/// are ignored.
fn check_against_log(
    candidate: &ModId,
    op: &FileOp,
    baseline: &[FileModification],
    out: &mut Vec<Collision>,
) {
    let last = |path: &std::path::Path| {
        baseline
            .iter()
            .rev()
            .find(|m| &m.mod_id != candidate && m.file_path == path)
    };
    match &op.kind {
        OpKind::Write { target, .. } => {
            if let Some(m) = last(target) {
                let reason = match m.kind {
                    ModificationKind::Deleted => Some("deleted by"),
                    ModificationKind::Moved => Some("moved by"),
                    ModificationKind::Replaced => Some("replaced by"),
                    // Write offsets are only tracked within one install run, so
                    // a later run cannot translate over a prior run's edits.
                    ModificationKind::Edited => Some("written to by"),
                    ModificationKind::Added => None,
                };
                if let Some(reason) = reason {
                    out.push(log_collision(candidate, m, Severity::Clash, "write to", reason));
                }
            }
        }
        OpKind::Move { source, dest } => {
            if let Some(m) = last(source) {
                match m.kind {
                    ModificationKind::Moved => {
                        if m.destination.as_deref() != Some(dest.as_path()) {
                            out.push(log_collision(
                                candidate,
                                m,
                                Severity::Clash,
                                "move",
                                "moved elsewhere by",
                            ));
                        }
                    }
                    ModificationKind::Replaced => {
                        out.push(log_collision(candidate, m, Severity::Clash, "move", "replaced by"));
                    }
                    ModificationKind::Edited => {
                        out.push(log_collision(candidate, m, Severity::Clash, "move", "written to by"));
                    }
                    ModificationKind::Deleted => {
                        out.push(log_collision(candidate, m, Severity::Warning, "move", "deleted by"));
                    }
                    ModificationKind::Added => {}
                }
            }
            if let Some(m) = last(dest) {
                if !matches!(m.kind, ModificationKind::Moved | ModificationKind::Deleted)
                    && !same_content(source, dest)
                {
                    out.push(log_dest_collision(candidate, m, "move"));
                }
            }
        }
        OpKind::Replace { target, replacement } => {
            if let Some(m) = last(target) {
                match m.kind {
                    ModificationKind::Moved => {
                        out.push(log_collision(candidate, m, Severity::Clash, "replace", "moved by"));
                    }
                    ModificationKind::Deleted => {
                        out.push(log_collision(candidate, m, Severity::Clash, "replace", "deleted by"));
                    }
                    ModificationKind::Edited => {
                        out.push(log_collision(
                            candidate,
                            m,
                            Severity::Clash,
                            "replace",
                            "written to by",
                        ));
                    }
                    ModificationKind::Replaced => {
                        if !same_content(replacement, target) {
                            out.push(log_collision(
                                candidate,
                                m,
                                Severity::Clash,
                                "replace",
                                "replaced by",
                            ));
                        }
                    }
                    ModificationKind::Added => {}
                }
            }
        }
        OpKind::Delete { target } => {
            if let Some(m) = last(target) {
                match m.kind {
                    ModificationKind::Edited => {
                        out.push(log_collision(candidate, m, Severity::Clash, "delete", "written to by"));
                    }
                    ModificationKind::Replaced => {
                        out.push(log_collision(candidate, m, Severity::Clash, "delete", "replaced by"));
                    }
                    ModificationKind::Moved => {
                        out.push(log_collision(candidate, m, Severity::Warning, "delete", "moved by"));
                    }
                    ModificationKind::Added | ModificationKind::Deleted => {}
                }
            }
        }
        OpKind::Copy { source, dest } => {
            if let Some(m) = last(dest) {
                if !matches!(m.kind, ModificationKind::Moved | ModificationKind::Deleted)
                    && !same_content(source, dest)
                {
                    out.push(log_dest_collision(candidate, m, "copy"));
                }
            }
        }
    }
}

/// Write-vs-write interference over one file: a clash exists only when at
/// least one side claims existing bytes (overwrite or range replacement) and
/// the declared ranges overlap. The query runs through the patch writer's
/// `can_write` primitive, seeded with the opposing side's declared edits, in
/// both directions so containment is caught from either end.
fn writes_interfere(
    target: &std::path::Path,
    mine: &[ResolvedWrite],
    theirs: &[ResolvedWrite],
) -> bool {
    let any_claims = mine.iter().any(|e| e.claims_bytes())
        || theirs.iter().any(|e| e.claims_bytes());
    if !any_claims {
        // Two pure inserts are order-sensitive but compatible.
        return false;
    }
    if !simulate(target, theirs, mine) || !simulate(target, mine, theirs) {
        return true;
    }
    // Strict containment escapes the boundary queries once translation has
    // collapsed the inner offset onto the claimed range's start; compare the
    // declared intervals in original coordinates as well.
    mine.iter()
        .any(|a| theirs.iter().any(|b| ranges_overlap(a, b)))
}

/// The byte interval an edit claims ownership of, in original coordinates.
/// Pure inserts claim nothing.
fn claimed_range(e: &ResolvedWrite) -> Option<(u64, u64)> {
    match e.end {
        Some(end) => Some((e.start, end)),
        None if e.replace => Some((e.start, e.start + e.len)),
        None => None,
    }
}

fn ranges_overlap(a: &ResolvedWrite, b: &ResolvedWrite) -> bool {
    match (claimed_range(a), claimed_range(b)) {
        (Some((s1, e1)), Some((s2, e2))) => s1 < e2 && s2 < e1,
        (Some((s, e)), None) => b.start > s && b.start < e,
        (None, Some((s, e))) => a.start > s && a.start < e,
        (None, None) => false,
    }
}

/// Seed a scratch history with `seed`'s edits and ask whether every edit in
/// `incoming` would still be writable.
fn simulate(target: &std::path::Path, seed: &[ResolvedWrite], incoming: &[ResolvedWrite]) -> bool {
    let mut scratch = PatchWriter::new();
    for e in seed {
        scratch.note(target, e.as_record());
    }
    incoming.iter().all(|e| {
        scratch.can_write(target, e.start, e.end, e.len, e.claims_bytes())
    })
}

fn normalize(cfg: &InstallConfig, collection: &ModActionCollection) -> Vec<FileOp> {
    let mut ops = Vec::new();
    for ma in collection.iter_all() {
        let resolve = |p: &ModPath| p.resolve(&cfg.target_path, &ma.cache_dir);
        match &ma.action {
            Action::CopyFile { target, destination } => ops.push(FileOp {
                mod_id: ma.mod_id.clone(),
                kind: OpKind::Copy { source: resolve(target), dest: resolve(destination) },
            }),
            Action::MoveFile { target, destination } => ops.push(FileOp {
                mod_id: ma.mod_id.clone(),
                kind: OpKind::Move { source: resolve(target), dest: resolve(destination) },
            }),
            Action::ReplaceFile { target, replacement } => ops.push(FileOp {
                mod_id: ma.mod_id.clone(),
                kind: OpKind::Replace { target: resolve(target), replacement: resolve(replacement) },
            }),
            Action::DeleteFiles { targets } => {
                for t in targets {
                    ops.push(FileOp {
                        mod_id: ma.mod_id.clone(),
                        kind: OpKind::Delete { target: resolve(t) },
                    });
                }
            }
            Action::WriteToFile { target, content } => {
                let edits = content
                    .iter()
                    .map(|c| resolve_write(c, &resolve))
                    .collect();
                ops.push(FileOp {
                    mod_id: ma.mod_id.clone(),
                    kind: OpKind::Write { target: resolve(target), edits },
                });
            }
            Action::CopyFiles { target_directory, destination, file_filter, include_subfolders } => {
                for (source, dest) in
                    expand_bulk(&resolve(target_directory), &resolve(destination), file_filter, *include_subfolders)
                {
                    ops.push(FileOp {
                        mod_id: ma.mod_id.clone(),
                        kind: OpKind::Copy { source, dest },
                    });
                }
            }
            Action::MoveFiles { target_directory, destination, file_filter, include_subfolders } => {
                for (source, dest) in
                    expand_bulk(&resolve(target_directory), &resolve(destination), file_filter, *include_subfolders)
                {
                    ops.push(FileOp {
                        mod_id: ma.mod_id.clone(),
                        kind: OpKind::Move { source, dest },
                    });
                }
            }
            Action::ReplaceFiles { target_directory, destination, file_filter, include_subfolders } => {
                for (replacement, target) in
                    expand_bulk(&resolve(target_directory), &resolve(destination), file_filter, *include_subfolders)
                {
                    ops.push(FileOp {
                        mod_id: ma.mod_id.clone(),
                        kind: OpKind::Replace { target, replacement },
                    });
                }
            }
            // Non-core pre-passes carry no collision rules of their own.
            Action::ExtractArchive { .. } | Action::DecompileScript { .. } => {}
        }
    }
    ops
}

/// Expand a bulk action into (source file, destination file) pairs by
/// enumerating the source directory. Directories that do not exist yet (for
/// instance, produced only by a later extraction) expand to nothing.
pub(crate) fn expand_bulk(
    dir: &std::path::Path,
    dest_root: &std::path::Path,
    file_filter: &str,
    include_subfolders: bool,
) -> Vec<(PathBuf, PathBuf)> {
    let Ok(files) = filtered_files(dir, file_filter, include_subfolders) else {
        return Vec::new();
    };
    files
        .into_iter()
        .filter_map(|f| {
            let rel = f.strip_prefix(dir).ok()?.to_path_buf();
            Some((f, dest_root.join(rel)))
        })
        .collect()
}

fn resolve_write(c: &WriteContent, resolve: &dyn Fn(&ModPath) -> PathBuf) -> ResolvedWrite {
    let len = match (&c.text, &c.data_file) {
        (Some(text), _) => text.len() as u64,
        (None, Some(data)) => std::fs::metadata(resolve(data)).map_or(0, |m| m.len()),
        (None, None) => 0,
    };
    ResolvedWrite { start: c.start_offset, end: c.end_offset, len, replace: c.replace }
}

fn clash(candidate: &ModId, other: &FileOp, verb: &str, reason: &str) -> Collision {
    Collision::new(
        other.mod_id.clone(),
        Severity::Clash,
        describe(candidate, &other.mod_id, verb, reason),
    )
}

fn warning(candidate: &ModId, other: &FileOp, verb: &str, reason: &str) -> Collision {
    Collision::new(
        other.mod_id.clone(),
        Severity::Warning,
        describe(candidate, &other.mod_id, verb, reason),
    )
}

fn dest_clash(candidate: &ModId, other: &FileOp, verb: &str) -> Collision {
    Collision::new(
        other.mod_id.clone(),
        Severity::Clash,
        format!(
            "Mod collision detected while installing mod ({candidate}): attempting to {verb} a file to a destination already written by another mod with different data (conflicting mod: {})",
            other.mod_id
        ),
    )
}

fn log_collision(
    candidate: &ModId,
    m: &FileModification,
    severity: Severity,
    verb: &str,
    reason: &str,
) -> Collision {
    Collision::new(
        m.mod_id.clone(),
        severity,
        format!(
            "Mod collision detected while installing mod ({candidate}): attempting to {verb} a file that has been {reason} an installed mod (conflicting mod: {})",
            m.mod_id
        ),
    )
}

fn log_dest_collision(candidate: &ModId, m: &FileModification, verb: &str) -> Collision {
    Collision::new(
        m.mod_id.clone(),
        Severity::Clash,
        format!(
            "Mod collision detected while installing mod ({candidate}): attempting to {verb} a file to a destination already written by an installed mod with different data (conflicting mod: {})",
            m.mod_id
        ),
    )
}

fn describe(candidate: &ModId, offender: &ModId, verb: &str, reason: &str) -> String {
    format!(
        "Mod collision detected while installing mod ({candidate}): attempting to {verb} a file that has been {reason} another mod (conflicting mod: {offender})"
    )
}
