//! Revert ladder: a runtime failure re-runs the batch without its newest mod
//! and leaves the tree as if the dropped mod was never requested.

mod common;

use common::{mod_with, TestEnv};
use modbay::types::{Action, InstallStatus, ModificationKind, WriteContent};

#[test]
fn failing_second_mod_rolls_back_to_first() {
    let env = TestEnv::new();
    env.mod_file("a", "x.bin", b"from a");
    // mod.b's payload is deliberately absent from its cache.
    let a = mod_with(
        "mod.a",
        "a",
        vec![Action::CopyFile {
            target: "[MOD]/x.bin".parse().unwrap(),
            destination: "[GAME]/x.bin".parse().unwrap(),
        }],
    );
    let b = mod_with(
        "mod.b",
        "b",
        vec![Action::CopyFile {
            target: "[MOD]/missing.bin".parse().unwrap(),
            destination: "[GAME]/y.bin".parse().unwrap(),
        }],
    );

    let report = env.installer().install(&[a, b], false).unwrap();
    assert_eq!(report.status, InstallStatus::RolledBackError);

    // The surviving subset is installed; the failed mod left no trace.
    assert_eq!(std::fs::read(env.game_path("x.bin")).unwrap(), b"from a");
    assert!(!env.game_path("y.bin").exists());
    assert_eq!(report.modifications.len(), 1);
    assert_eq!(report.modifications[0].kind, ModificationKind::Added);

    assert!(!env.cfg.backup_root.exists());
    assert!(!env.cfg.temp_root.exists());
}

#[test]
fn single_failing_mod_restores_the_pristine_tree() {
    let env = TestEnv::new();
    env.game_file("data.bin", b"abcdefghij");

    // The write lands first (writes precede moves), then the move fails.
    let bad = mod_with(
        "mod.bad",
        "bad",
        vec![
            Action::WriteToFile {
                target: "[GAME]/data.bin".parse().unwrap(),
                content: vec![WriteContent {
                    start_offset: 3,
                    end_offset: None,
                    text: Some("XX".to_string()),
                    data_file: None,
                    replace: false,
                }],
            },
            Action::MoveFile {
                target: "[GAME]/missing.bin".parse().unwrap(),
                destination: "[GAME]/m2.bin".parse().unwrap(),
            },
        ],
    );

    let report = env.installer().install(&[bad], false).unwrap();
    assert_eq!(report.status, InstallStatus::RolledBackError);
    assert!(report.modifications.is_empty());
    // The partial edit was undone from backup.
    assert_eq!(std::fs::read(env.game_path("data.bin")).unwrap(), b"abcdefghij");
}

#[test]
fn failed_revert_restores_backups_and_reports_fatal() {
    let env = TestEnv::new();
    env.game_file("data.bin", b"stock bytes");
    env.mod_file("a", "payload.bin", b"payload");

    // mod.a consumes its cache file on the first attempt, so re-applying it
    // during the revert cannot succeed.
    let a = mod_with(
        "mod.a",
        "a",
        vec![Action::MoveFile {
            target: "[MOD]/payload.bin".parse().unwrap(),
            destination: "[GAME]/payload.bin".parse().unwrap(),
        }],
    );
    // mod.b edits a stock file (writes precede moves), then fails.
    let b = mod_with(
        "mod.b",
        "b",
        vec![
            Action::WriteToFile {
                target: "[GAME]/data.bin".parse().unwrap(),
                content: vec![WriteContent {
                    start_offset: 2,
                    end_offset: None,
                    text: Some("ZZ".to_string()),
                    data_file: None,
                    replace: false,
                }],
            },
            Action::MoveFile {
                target: "[GAME]/missing.bin".parse().unwrap(),
                destination: "[GAME]/m.bin".parse().unwrap(),
            },
        ],
    );

    let report = env.installer().install(&[a, b], false).unwrap();
    assert_eq!(report.status, InstallStatus::FatalError);
    assert!(report.modifications.is_empty());

    // Backups were put back and all tracked state dropped.
    assert_eq!(std::fs::read(env.game_path("data.bin")).unwrap(), b"stock bytes");
    assert!(!env.game_path("payload.bin").exists());
    assert!(!env.game_path("m.bin").exists());
    assert!(!env.cfg.backup_root.exists());
    assert!(!env.cfg.temp_root.exists());
}

#[test]
fn reserved_files_are_restored_before_the_revert_reapplies() {
    let env = TestEnv::new();
    env.game_file("cfg.ini", b"stock config");
    env.mod_file("good", "cfg.ini", b"modded config");

    let good = mod_with(
        "mod.good",
        "good",
        vec![Action::ReplaceFile {
            target: "[GAME]/cfg.ini".parse().unwrap(),
            replacement: "[MOD]/cfg.ini".parse().unwrap(),
        }],
    );
    // Fails in the writes bucket, after mod.good's replace has landed.
    let bad = mod_with(
        "mod.bad",
        "bad",
        vec![Action::WriteToFile {
            target: "[GAME]/absent.bin".parse().unwrap(),
            content: vec![WriteContent {
                start_offset: 0,
                end_offset: None,
                text: Some("x".to_string()),
                data_file: None,
                replace: false,
            }],
        }],
    );

    let report = env.installer().install(&[good, bad], false).unwrap();
    assert_eq!(report.status, InstallStatus::RolledBackError);
    // The revert restored the stock file from backup before re-replacing it.
    assert_eq!(
        std::fs::read(env.game_path("cfg.ini")).unwrap(),
        b"modded config"
    );
    assert_eq!(report.modifications.len(), 1);
    assert_eq!(report.modifications[0].kind, ModificationKind::Replaced);
    assert!(!env.cfg.backup_root.exists());
}
