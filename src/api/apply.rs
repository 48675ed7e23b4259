//! Install loop: validate, snapshot, apply, and the revert ladder.
//!
//! The transaction unit is the attempt. A runtime failure does not patch up
//! the tree in place; it undoes the attempt and re-runs it with the newest
//! mod dropped, until an attempt succeeds or the mod list is empty. A failure
//! while already reverting abandons the ladder, restores what the backup
//! store holds, and reports `FatalError`.

use std::io;
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::adapters::LockGuard;
use crate::config::InstallConfig;
use crate::detect;
use crate::fs::BackupStore;
use crate::logging::audit::{AuditCtx, Stage, StageLogger};
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::ids::batch_id;
use crate::types::{
    Action, Collision, FileModification, InstallReport, InstallStatus, ModActionCollection,
    ModDescriptor, ModPath, ModificationKind, Severity,
};
use uuid::Uuid;

use super::errors::{ApiError, InstallError};
use super::handlers;
use super::session::InstallSession;
use super::Installer;

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    mods: &[ModDescriptor],
    ignore_warnings: bool,
) -> Result<InstallReport, ApiError> {
    let t0 = Instant::now();
    let bid = batch_id(mods);

    let _guard: Option<Box<dyn LockGuard>> = match &api.lock {
        Some(lock) => Some(lock.acquire_process_lock(api.lock_timeout_ms)?),
        None => None,
    };

    let tctx = AuditCtx::new(&api.facts, bid.to_string());
    let slog = StageLogger::new(&tctx);
    api.audit.log(Level::Info, "install: starting");

    let mut count = mods.len();
    let mut reverting = false;
    let mut collisions: Vec<Collision> = Vec::new();
    let mut run_log: Vec<FileModification> = Vec::new();

    loop {
        slog.stage(Stage::ApplyAttempt)
            .merge(json!({ "mods": count, "reverting": reverting }))
            .emit_success();
        let tolerate = ignore_warnings || reverting;
        let prev = std::mem::take(&mut run_log);
        let outcome = attempt(
            api,
            &slog,
            &mods[..count],
            tolerate,
            !reverting,
            &prev,
            &mut run_log,
            &mut collisions,
        );
        match outcome {
            Ok(Some(status)) => {
                // Conflicts are only detected on the first attempt, before
                // any mutation.
                api.audit.log(Level::Warn, "install: aborted on collisions");
                slog.stage(Stage::ApplyResult)
                    .merge(json!({ "status": status_str(status), "collisions": collisions.len() }))
                    .emit_failure();
                return Ok(report(status, collisions, Vec::new(), bid, t0));
            }
            Ok(None) => {
                commit(&api.cfg).map_err(|e| ApiError::FilesystemError(e.to_string()))?;
                let status = if reverting {
                    slog.stage(Stage::RollbackSummary)
                        .merge(json!({ "mods_kept": count }))
                        .emit_success();
                    InstallStatus::RolledBackError
                } else {
                    InstallStatus::Success
                };
                slog.stage(Stage::ApplyResult)
                    .merge(json!({ "status": status_str(status) }))
                    .emit_success();
                api.audit.log(Level::Info, "install: finished");
                let mut modifications = api.cfg.baseline.clone();
                modifications.extend(run_log);
                return Ok(report(status, collisions, modifications, bid, t0));
            }
            Err(e) => {
                api.audit
                    .log(Level::Error, &format!("install: attempt failed: {e}"));
                slog.stage(Stage::Rollback)
                    .merge(json!({ "error": e.to_string(), "mods": count }))
                    .emit_failure();
                if reverting || count == 0 {
                    wipe(&api.cfg);
                    slog.stage(Stage::RollbackSummary)
                        .merge(json!({ "error": e.to_string() }))
                        .emit_failure();
                    return Ok(report(
                        InstallStatus::FatalError,
                        collisions,
                        Vec::new(),
                        bid,
                        t0,
                    ));
                }
                reverting = true;
                count -= 1;
            }
        }
    }
}

/// One transactional attempt over `mods`. Undoes the previous attempt first,
/// then validates (unless reverting), then applies every bucket in precedence
/// order. `run_log` receives the attempt's modification log even on failure
/// so the next rung of the ladder can undo it.
#[allow(clippy::too_many_arguments)]
fn attempt<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    slog: &StageLogger<'_>,
    mods: &[ModDescriptor],
    tolerate_warnings: bool,
    validate: bool,
    prev: &[FileModification],
    run_log: &mut Vec<FileModification>,
    collisions_out: &mut Vec<Collision>,
) -> Result<Option<InstallStatus>, InstallError> {
    let cfg = &api.cfg;
    undo_previous(cfg, prev)?;

    let mut collection = ModActionCollection::default();
    if validate {
        let mut found = Vec::new();
        for m in mods {
            collection.add_mod(m, &cfg.mod_cache_root);
            found.extend(detect::collisions_for(cfg, &collection, &m.id, &cfg.baseline));
        }
        for c in &found {
            let ev = slog.stage(Stage::Collision).merge(json!({
                "offending_mod": c.offending_mod_id.0,
                "description": c.description,
            }));
            match c.severity {
                Severity::Clash => ev.emit_failure(),
                Severity::Warning => ev.emit_warn(),
            }
        }
        let clash = found.iter().any(|c| c.severity == Severity::Clash);
        let warned = found.iter().any(|c| c.severity == Severity::Warning);
        *collisions_out = found;
        if clash {
            slog.stage(Stage::Validate).emit_failure();
            return Ok(Some(InstallStatus::UnresolvableConflict));
        }
        if warned && !tolerate_warnings {
            slog.stage(Stage::Validate).emit_failure();
            return Ok(Some(InstallStatus::ResolvableConflict));
        }
        slog.stage(Stage::Validate).emit_success();
    } else {
        for m in mods {
            collection.add_mod(m, &cfg.mod_cache_root);
        }
    }

    let mut session = InstallSession::begin(cfg)?;
    let result = apply_actions(api, slog, &collection, &mut session);
    *run_log = std::mem::take(&mut session.log);
    result?;
    Ok(None)
}

fn apply_actions<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    slog: &StageLogger<'_>,
    collection: &ModActionCollection,
    session: &mut InstallSession<'_>,
) -> Result<(), InstallError> {
    let cfg = session.cfg;
    for ma in collection.iter_all() {
        let resolve = |p: &ModPath| p.resolve(&cfg.target_path, &ma.cache_dir);
        let applied = dispatch(api, session, ma, &resolve);
        let ev = slog.stage(Stage::Action).merge(json!({
            "mod": ma.mod_id.0,
            "action": action_name(&ma.action),
        }));
        match applied {
            Ok(()) => ev.emit_success(),
            Err(e) => {
                ev.merge(json!({ "error": e.to_string() })).emit_failure();
                return Err(e);
            }
        }
    }
    Ok(())
}

fn dispatch<E: FactsEmitter, A: AuditSink>(
    api: &Installer<E, A>,
    session: &mut InstallSession<'_>,
    ma: &crate::types::ModAction,
    resolve: &dyn Fn(&ModPath) -> std::path::PathBuf,
) -> Result<(), InstallError> {
    match &ma.action {
        Action::ExtractArchive {
            targets,
            delete_when_complete,
        } => {
            let extractor = api.extractor.as_deref().ok_or(InstallError::NoExtractor)?;
            for t in targets {
                handlers::extract_archive(
                    session,
                    extractor,
                    &ma.mod_id,
                    &resolve(t),
                    *delete_when_complete,
                )?;
            }
            Ok(())
        }
        Action::DecompileScript { targets } => {
            let decompiler = api
                .decompiler
                .as_deref()
                .ok_or(InstallError::NoDecompiler)?;
            for t in targets {
                handlers::decompile_script(session, decompiler, &ma.mod_id, &resolve(t))?;
            }
            Ok(())
        }
        Action::CopyFile {
            target,
            destination,
        } => handlers::copy_into(session, &ma.mod_id, &resolve(target), &resolve(destination)),
        Action::CopyFiles {
            target_directory,
            destination,
            file_filter,
            include_subfolders,
        } => {
            for (src, dest) in detect::expand_bulk(
                &resolve(target_directory),
                &resolve(destination),
                file_filter,
                *include_subfolders,
            ) {
                handlers::copy_into(session, &ma.mod_id, &src, &dest)?;
            }
            Ok(())
        }
        Action::ReplaceFile {
            target,
            replacement,
        } => handlers::replace_into(session, &ma.mod_id, &resolve(replacement), &resolve(target)),
        Action::ReplaceFiles {
            target_directory,
            destination,
            file_filter,
            include_subfolders,
        } => {
            for (replacement, target) in detect::expand_bulk(
                &resolve(target_directory),
                &resolve(destination),
                file_filter,
                *include_subfolders,
            ) {
                handlers::replace_into(session, &ma.mod_id, &replacement, &target)?;
            }
            Ok(())
        }
        Action::WriteToFile { target, content } => {
            handlers::write_to(session, &ma.mod_id, &resolve(target), content, resolve)
        }
        Action::MoveFile {
            target,
            destination,
        } => handlers::move_into(session, &ma.mod_id, &resolve(target), &resolve(destination)),
        Action::MoveFiles {
            target_directory,
            destination,
            file_filter,
            include_subfolders,
        } => {
            for (src, dest) in detect::expand_bulk(
                &resolve(target_directory),
                &resolve(destination),
                file_filter,
                *include_subfolders,
            ) {
                handlers::move_into(session, &ma.mod_id, &src, &dest)?;
            }
            Ok(())
        }
        Action::DeleteFiles { targets } => {
            for t in targets {
                handlers::delete_file(session, &ma.mod_id, &resolve(t))?;
            }
            Ok(())
        }
    }
}

/// Undo one attempt's effects: remove what it added (newest first), copy
/// every backup over its original location, and clear scratch space. With an
/// empty `prev` this still consumes backups left behind by an interrupted
/// earlier process.
fn undo_previous(cfg: &InstallConfig, prev: &[FileModification]) -> io::Result<()> {
    // Every Added record names a single file; undo never removes a directory,
    // so files that predate the attempt cannot be swept away with it.
    for m in prev.iter().rev() {
        if m.kind == ModificationKind::Added && m.file_path.exists() {
            std::fs::remove_file(&m.file_path)?;
        }
    }
    let backups = BackupStore::open(&cfg.backup_root, &cfg.target_path)?;
    backups.restore_all()?;
    if cfg.temp_root.exists() {
        std::fs::remove_dir_all(&cfg.temp_root)?;
    }
    Ok(())
}

/// Commit: the attempt's effects are final, so its safety net goes away.
fn commit(cfg: &InstallConfig) -> io::Result<()> {
    let backups = BackupStore::open(&cfg.backup_root, &cfg.target_path)?;
    backups.discard()?;
    if cfg.temp_root.exists() {
        std::fs::remove_dir_all(&cfg.temp_root)?;
    }
    Ok(())
}

/// Last resort after a failed revert: put back whatever the backup store
/// still holds, then drop all tracked state. Best effort by construction.
fn wipe(cfg: &InstallConfig) {
    if let Ok(backups) = BackupStore::open(&cfg.backup_root, &cfg.target_path) {
        let _ = backups.restore_all();
        let _ = backups.discard();
    }
    let _ = std::fs::remove_dir_all(&cfg.temp_root);
}

fn report(
    status: InstallStatus,
    collisions: Vec<Collision>,
    modifications: Vec<FileModification>,
    bid: Uuid,
    t0: Instant,
) -> InstallReport {
    InstallReport {
        status,
        collisions,
        modifications,
        batch_uuid: Some(bid),
        duration_ms: u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

const fn status_str(status: InstallStatus) -> &'static str {
    match status {
        InstallStatus::Success => "success",
        InstallStatus::ResolvableConflict => "resolvable_conflict",
        InstallStatus::UnresolvableConflict => "unresolvable_conflict",
        InstallStatus::RolledBackError => "rolled_back_error",
        InstallStatus::FatalError => "fatal_error",
    }
}

const fn action_name(a: &Action) -> &'static str {
    match a {
        Action::CopyFile { .. } => "copy_file",
        Action::CopyFiles { .. } => "copy_files",
        Action::MoveFile { .. } => "move_file",
        Action::MoveFiles { .. } => "move_files",
        Action::ReplaceFile { .. } => "replace_file",
        Action::ReplaceFiles { .. } => "replace_files",
        Action::DeleteFiles { .. } => "delete_files",
        Action::WriteToFile { .. } => "write_to_file",
        Action::ExtractArchive { .. } => "extract_archive",
        Action::DecompileScript { .. } => "decompile_script",
    }
}
