//! One handler per action kind. Handlers mutate the tree through the session
//! so every physical change is backed up first and logged after.

use std::path::{Path, PathBuf};

use crate::adapters::{ArchiveExtractor, ScriptDecompiler};
use crate::constants::DECOMP_SUFFIX;
use crate::fs::ops;
use crate::types::{FileModification, ModId, ModPath, ModificationKind, WriteContent};

use super::errors::InstallError;
use super::session::InstallSession;

pub(crate) fn copy_into(
    s: &mut InstallSession,
    mod_id: &ModId,
    source: &Path,
    dest: &Path,
) -> Result<(), InstallError> {
    if !source.exists() {
        return Err(InstallError::MissingTarget(source.to_path_buf()));
    }
    let reserved = s.is_reserved(dest);
    s.backup_if_reserved(dest)?;
    ops::copy_file(source, dest)?;
    let kind = if reserved {
        ModificationKind::Replaced
    } else {
        ModificationKind::Added
    };
    s.record(FileModification::new(dest, kind, reserved, mod_id.clone()));
    Ok(())
}

pub(crate) fn replace_into(
    s: &mut InstallSession,
    mod_id: &ModId,
    replacement: &Path,
    target: &Path,
) -> Result<(), InstallError> {
    if !replacement.exists() {
        return Err(InstallError::MissingTarget(replacement.to_path_buf()));
    }
    // A replace differs from a copy in that the target must already be there.
    if !target.exists() {
        return Err(InstallError::MissingTarget(target.to_path_buf()));
    }
    let reserved = s.is_reserved(target);
    s.backup_if_reserved(target)?;
    ops::copy_file(replacement, target)?;
    s.record(FileModification::new(
        target,
        ModificationKind::Replaced,
        reserved,
        mod_id.clone(),
    ));
    Ok(())
}

pub(crate) fn move_into(
    s: &mut InstallSession,
    mod_id: &ModId,
    source: &Path,
    dest: &Path,
) -> Result<(), InstallError> {
    // A second mod moving the same file to the same place is satisfied by the
    // first move.
    let already_moved = s.log.iter().any(|m| {
        m.kind == ModificationKind::Moved
            && m.file_path == source
            && m.destination.as_deref() == Some(dest)
    });
    if already_moved {
        return Ok(());
    }
    if !source.exists() {
        return Err(InstallError::MissingTarget(source.to_path_buf()));
    }
    let source_reserved = s.is_reserved(source);
    let dest_reserved = s.is_reserved(dest);
    s.backup_if_reserved(source)?;
    s.backup_if_reserved(dest)?;
    ops::move_file(source, dest)?;
    s.record(FileModification::moved(
        source,
        dest,
        source_reserved,
        mod_id.clone(),
    ));
    let kind = if dest_reserved {
        ModificationKind::Replaced
    } else {
        ModificationKind::Added
    };
    s.record(FileModification::new(
        dest,
        kind,
        dest_reserved,
        mod_id.clone(),
    ));
    Ok(())
}

/// Deleting an absent file is a no-op; repeated deletes of the same path are
/// collapsed through the dedup set.
pub(crate) fn delete_file(
    s: &mut InstallSession,
    mod_id: &ModId,
    target: &Path,
) -> Result<(), InstallError> {
    if s.deleted.contains(target) {
        return Ok(());
    }
    if target.exists() {
        let reserved = s.is_reserved(target);
        s.backup_if_reserved(target)?;
        std::fs::remove_file(target)?;
        s.record(FileModification::new(
            target,
            ModificationKind::Deleted,
            reserved,
            mod_id.clone(),
        ));
    }
    s.deleted.insert(target.to_path_buf());
    Ok(())
}

/// Apply each declared edit through the offset-translating writer, in
/// declaration order. Payload comes from inline text or a data file in the
/// mod's cache; an entry with neither is skipped.
pub(crate) fn write_to(
    s: &mut InstallSession,
    mod_id: &ModId,
    target: &Path,
    content: &[WriteContent],
    resolve: &dyn Fn(&ModPath) -> PathBuf,
) -> Result<(), InstallError> {
    if !target.exists() {
        return Err(InstallError::MissingTarget(target.to_path_buf()));
    }
    let reserved = s.is_reserved(target);
    s.backup_if_reserved(target)?;
    let mut wrote = false;
    for c in content {
        let bytes: Vec<u8> = match (&c.text, &c.data_file) {
            (Some(text), _) => text.clone().into_bytes(),
            (None, Some(data)) => std::fs::read(resolve(data))?,
            (None, None) => continue,
        };
        match c.end_offset {
            Some(end) => {
                s.writer.write_range(target, &bytes, c.start_offset, end)?;
            }
            None => {
                s.writer.write(target, &bytes, c.start_offset, !c.replace)?;
            }
        }
        wrote = true;
    }
    if wrote {
        s.record(FileModification::new(
            target,
            ModificationKind::Edited,
            reserved,
            mod_id.clone(),
        ));
    }
    Ok(())
}

/// Unpack an archive, leaving its contents under a directory named after the
/// archive stem next to it. The archive is unpacked into scratch space first
/// and each produced file is moved into place on its own, so a destination
/// that already exists in the tree is backed up before it is overwritten and
/// every landed file is logged individually for revert.
pub(crate) fn extract_archive(
    s: &mut InstallSession,
    extractor: &dyn ArchiveExtractor,
    mod_id: &ModId,
    archive: &Path,
    delete_when_complete: bool,
) -> Result<(), InstallError> {
    if !s.extracted.contains(archive) {
        if !archive.exists() {
            return Err(InstallError::MissingTarget(archive.to_path_buf()));
        }
        let parent = archive.parent().unwrap_or_else(|| Path::new("."));
        let stem = archive.file_stem().unwrap_or_default();
        let scratch_root = s.cfg.temp_root.join("extract");
        let scratch = scratch_root.join(stem);
        std::fs::create_dir_all(&scratch_root)?;
        extractor.extract(archive, &scratch_root)?;
        let out_root = parent.join(stem);
        for produced in ops::list_files(&scratch) {
            let rel = produced.strip_prefix(&scratch).map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("{} escaped its unpack directory", produced.display()),
                )
            })?;
            let dest = out_root.join(rel);
            let reserved = s.is_reserved(&dest);
            s.backup_if_reserved(&dest)?;
            ops::move_file(&produced, &dest)?;
            let kind = if reserved {
                ModificationKind::Replaced
            } else {
                ModificationKind::Added
            };
            s.record(FileModification::new(dest, kind, reserved, mod_id.clone()));
        }
        if scratch.exists() {
            std::fs::remove_dir_all(&scratch)?;
        }
        s.extracted.insert(archive.to_path_buf());
    }
    if delete_when_complete && !s.deleted.contains(archive) {
        let reserved = s.is_reserved(archive);
        s.backup_if_reserved(archive)?;
        std::fs::remove_file(archive)?;
        s.record(FileModification::new(
            archive,
            ModificationKind::Deleted,
            reserved,
            mod_id.clone(),
        ));
        s.deleted.insert(archive.to_path_buf());
    }
    Ok(())
}

/// Decompile a script into scratch space, then move the result over the
/// original so the tree never holds a half-written script.
pub(crate) fn decompile_script(
    s: &mut InstallSession,
    decompiler: &dyn ScriptDecompiler,
    mod_id: &ModId,
    script: &Path,
) -> Result<(), InstallError> {
    if s.decompiled.contains(script) {
        return Ok(());
    }
    if !script.exists() {
        return Err(InstallError::MissingTarget(script.to_path_buf()));
    }
    let reserved = s.is_reserved(script);
    s.backup_if_reserved(script)?;
    // Scratch name keeps the extension so boot.lua decompiles through
    // boot_decomp.lua, not boot.lua_decomp.
    let stem = script.file_stem().unwrap_or_default().to_string_lossy();
    let scratch_name = match script.extension() {
        Some(ext) => format!("{stem}{DECOMP_SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{DECOMP_SUFFIX}"),
    };
    let scratch = s.cfg.temp_root.join(scratch_name);
    decompiler.decompile(script, &scratch)?;
    ops::move_file(&scratch, script)?;
    s.record(FileModification::new(
        script,
        ModificationKind::Edited,
        reserved,
        mod_id.clone(),
    ));
    s.decompiled.insert(script.to_path_buf());
    Ok(())
}
