//! Conflict outcomes abort before any mutation.

mod common;

use common::{mod_with, TestEnv};
use modbay::types::{Action, InstallStatus, WriteContent};

fn mover() -> modbay::types::ModDescriptor {
    mod_with(
        "mod.mover",
        "mover",
        vec![Action::MoveFile {
            target: "[GAME]/f.bin".parse().unwrap(),
            destination: "[GAME]/moved/f.bin".parse().unwrap(),
        }],
    )
}

fn deleter() -> modbay::types::ModDescriptor {
    mod_with(
        "mod.deleter",
        "deleter",
        vec![Action::DeleteFiles {
            targets: vec!["[GAME]/f.bin".parse().unwrap()],
        }],
    )
}

#[test]
fn warnings_abort_without_touching_the_tree() {
    let env = TestEnv::new();
    env.game_file("f.bin", b"payload");

    let report = env
        .installer()
        .install(&[mover(), deleter()], false)
        .unwrap();
    assert_eq!(report.status, InstallStatus::ResolvableConflict);
    assert_eq!(report.collisions.len(), 1);
    assert!(report.modifications.is_empty());
    // Nothing moved, nothing deleted.
    assert_eq!(std::fs::read(env.game_path("f.bin")).unwrap(), b"payload");
    assert!(!env.game_path("moved/f.bin").exists());
}

#[test]
fn tolerated_warnings_proceed() {
    let env = TestEnv::new();
    env.game_file("f.bin", b"payload");

    let report = env
        .installer()
        .install(&[mover(), deleter()], true)
        .unwrap();
    assert_eq!(report.status, InstallStatus::Success);
    // The move ran first; the delete then found nothing at the source.
    assert_eq!(
        std::fs::read(env.game_path("moved/f.bin")).unwrap(),
        b"payload"
    );
    assert!(!env.game_path("f.bin").exists());
}

#[test]
fn clashes_abort_even_when_warnings_are_tolerated() {
    let env = TestEnv::new();
    env.game_file("x.lua", b"print('hi')");
    let writer = mod_with(
        "mod.writer",
        "writer",
        vec![Action::WriteToFile {
            target: "[GAME]/x.lua".parse().unwrap(),
            content: vec![WriteContent {
                start_offset: 0,
                end_offset: None,
                text: Some("-- hi\n".to_string()),
                data_file: None,
                replace: false,
            }],
        }],
    );
    let deleter = mod_with(
        "mod.deleter",
        "deleter",
        vec![Action::DeleteFiles {
            targets: vec!["[GAME]/x.lua".parse().unwrap()],
        }],
    );

    let report = env.installer().install(&[writer, deleter], true).unwrap();
    assert_eq!(report.status, InstallStatus::UnresolvableConflict);
    assert!(!report.collisions.is_empty());
    assert_eq!(std::fs::read(env.game_path("x.lua")).unwrap(), b"print('hi')");
}
