//! Happy-path batch: every action kind lands, the safety net is discarded,
//! and the report's log matches what happened.

mod common;

use common::{mod_with, CollectingEmitter, TestEnv};
use modbay::types::{Action, InstallStatus, ModificationKind, WriteContent};

#[test]
fn two_mod_batch_commits() {
    let env = TestEnv::new();
    env.game_file("scripts/boot.lua", b"print('boot')");
    env.game_file("old.bin", b"relic");
    env.game_file("junk.txt", b"junk");
    env.game_file("cfg.ini", b"old config");
    env.mod_file("a", "assets/new.bin", b"fresh");
    env.mod_file("b", "cfg.ini", b"new config");

    let a = mod_with(
        "mod.a",
        "a",
        vec![
            Action::CopyFile {
                target: "[MOD]/assets/new.bin".parse().unwrap(),
                destination: "[GAME]/assets/new.bin".parse().unwrap(),
            },
            Action::WriteToFile {
                target: "[GAME]/scripts/boot.lua".parse().unwrap(),
                content: vec![WriteContent {
                    start_offset: 0,
                    end_offset: None,
                    text: Some("-- patched\n".to_string()),
                    data_file: None,
                    replace: false,
                }],
            },
        ],
    );
    let b = mod_with(
        "mod.b",
        "b",
        vec![
            Action::MoveFile {
                target: "[GAME]/old.bin".parse().unwrap(),
                destination: "[GAME]/archive/old.bin".parse().unwrap(),
            },
            Action::DeleteFiles {
                targets: vec!["[GAME]/junk.txt".parse().unwrap()],
            },
            Action::ReplaceFile {
                target: "[GAME]/cfg.ini".parse().unwrap(),
                replacement: "[MOD]/cfg.ini".parse().unwrap(),
            },
        ],
    );

    let facts = CollectingEmitter::default();
    let installer = env.installer_with(facts.clone());
    let report = installer.install(&[a, b], false).unwrap();

    assert_eq!(report.status, InstallStatus::Success);
    assert!(report.collisions.is_empty());
    assert!(report.batch_uuid.is_some());

    assert_eq!(
        std::fs::read(env.game_path("assets/new.bin")).unwrap(),
        b"fresh"
    );
    assert_eq!(
        std::fs::read(env.game_path("scripts/boot.lua")).unwrap(),
        b"-- patched\nprint('boot')"
    );
    assert!(!env.game_path("old.bin").exists());
    assert_eq!(
        std::fs::read(env.game_path("archive/old.bin")).unwrap(),
        b"relic"
    );
    assert!(!env.game_path("junk.txt").exists());
    assert_eq!(std::fs::read(env.game_path("cfg.ini")).unwrap(), b"new config");

    // Commit drops the safety net.
    assert!(!env.cfg.backup_root.exists());
    assert!(!env.cfg.temp_root.exists());

    let kinds: Vec<ModificationKind> = report.modifications.iter().map(|m| m.kind).collect();
    assert!(kinds.contains(&ModificationKind::Added));
    assert!(kinds.contains(&ModificationKind::Edited));
    assert!(kinds.contains(&ModificationKind::Moved));
    assert!(kinds.contains(&ModificationKind::Deleted));
    assert!(kinds.contains(&ModificationKind::Replaced));
    let moved = report
        .modifications
        .iter()
        .find(|m| m.kind == ModificationKind::Moved)
        .unwrap();
    assert_eq!(
        moved.destination.as_deref(),
        Some(env.game_path("archive/old.bin").as_path())
    );

    let stages = facts.stages();
    assert!(stages.iter().any(|s| s == "validate"));
    assert!(stages.iter().any(|s| s == "apply.attempt"));
    assert!(stages.iter().any(|s| s == "action"));
    assert!(stages.iter().any(|s| s == "apply.result"));
}

#[test]
fn committed_log_extends_the_baseline() {
    let env = TestEnv::new();
    env.mod_file("a", "x.bin", b"x");
    let a = mod_with(
        "mod.a",
        "a",
        vec![Action::CopyFile {
            target: "[MOD]/x.bin".parse().unwrap(),
            destination: "[GAME]/x.bin".parse().unwrap(),
        }],
    );
    let first = env.installer().install(&[a], false).unwrap();
    assert_eq!(first.status, InstallStatus::Success);
    assert_eq!(first.modifications.len(), 1);

    // Second run with the committed log as baseline: an unrelated mod is fine.
    let cfg = env.cfg.clone().with_baseline(first.modifications.clone());
    env.mod_file("b", "y.bin", b"y");
    let b = mod_with(
        "mod.b",
        "b",
        vec![Action::CopyFile {
            target: "[MOD]/y.bin".parse().unwrap(),
            destination: "[GAME]/y.bin".parse().unwrap(),
        }],
    );
    let installer = modbay::Installer::new(
        CollectingEmitter::default(),
        common::NullAudit,
        cfg,
    );
    let second = installer.install(&[b], false).unwrap();
    assert_eq!(second.status, InstallStatus::Success);
    // Baseline entries carry over ahead of the new run's log.
    assert_eq!(second.modifications.len(), 2);
    assert_eq!(second.modifications[0].file_path, first.modifications[0].file_path);
}

#[test]
fn empty_batch_is_a_trivial_success() {
    let env = TestEnv::new();
    let report = env.installer().install(&[], false).unwrap();
    assert_eq!(report.status, InstallStatus::Success);
    assert!(report.modifications.is_empty());
}
