//! Shared fixtures for the integration suite.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use log::Level;
use serde_json::Value;

use modbay::config::InstallConfig;
use modbay::logging::{AuditSink, FactsEmitter};
use modbay::types::{Action, ModDescriptor};
use modbay::Installer;

/// Collects every emitted fact for assertions. Clone-able so a copy can stay
/// with the test while the installer owns the other.
#[derive(Clone, Default)]
pub struct CollectingEmitter {
    events: Arc<Mutex<Vec<Value>>>,
}

impl CollectingEmitter {
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    pub fn stages(&self) -> Vec<String> {
        self.events()
            .iter()
            .filter_map(|e| e.get("stage").and_then(Value::as_str).map(String::from))
            .collect()
    }
}

impl FactsEmitter for CollectingEmitter {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, fields: Value) {
        self.events.lock().unwrap().push(fields);
    }
}

#[derive(Default)]
pub struct NullAudit;

impl AuditSink for NullAudit {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// A scratch installation: game tree, mod cache, temp and backup roots.
pub struct TestEnv {
    pub td: tempfile::TempDir,
    pub cfg: InstallConfig,
}

impl TestEnv {
    pub fn new() -> Self {
        let td = tempfile::tempdir().unwrap();
        let game = td.path().join("game");
        let cache = td.path().join("cache");
        let temp = td.path().join("temp");
        let backup = td.path().join("backup");
        std::fs::create_dir_all(&game).unwrap();
        std::fs::create_dir_all(&cache).unwrap();
        let cfg = InstallConfig::new(game, cache, temp, backup);
        Self { td, cfg }
    }

    pub fn game_file(&self, rel: &str, bytes: &[u8]) -> PathBuf {
        let p = self.cfg.target_path.join(rel);
        write_file(&p, bytes);
        p
    }

    pub fn mod_file(&self, cache_name: &str, rel: &str, bytes: &[u8]) -> PathBuf {
        let p = self.cfg.mod_cache_root.join(cache_name).join(rel);
        write_file(&p, bytes);
        p
    }

    pub fn game_path(&self, rel: &str) -> PathBuf {
        self.cfg.target_path.join(rel)
    }

    pub fn installer(&self) -> Installer<CollectingEmitter, NullAudit> {
        self.installer_with(CollectingEmitter::default())
    }

    /// Keep a clone of `facts` to assert on emitted events afterwards.
    pub fn installer_with(&self, facts: CollectingEmitter) -> Installer<CollectingEmitter, NullAudit> {
        Installer::new(facts, NullAudit, self.cfg.clone())
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}

pub fn mod_with(id: &str, cache_name: &str, actions: Vec<Action>) -> ModDescriptor {
    ModDescriptor::new(id, cache_name).with_actions(actions)
}
