//! Audit helpers that emit one structured fact per engine stage.
//!
//! Every fact carries a minimal envelope: `schema_version`, `ts`, `batch_id`,
//! and `stage`. Stages cover the install lifecycle: `validate`, `collision`,
//! `apply.attempt`, `action`, `apply.result`, `rollback`, `rollback.summary`.

use serde_json::{json, Value};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use super::facts::FactsEmitter;

pub(crate) const SCHEMA_VERSION: i64 = 1;

pub const TS_ZERO: &str = "1970-01-01T00:00:00Z";

pub fn now_iso() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| TS_ZERO.to_string())
}

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub batch_id: String,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, batch_id: String) -> Self {
        Self { facts, batch_id }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug)]
pub enum Stage {
    Validate,
    Collision,
    ApplyAttempt,
    Action,
    ApplyResult,
    Rollback,
    RollbackSummary,
}

impl Stage {
    const fn as_event(self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Collision => "collision",
            Stage::ApplyAttempt => "apply.attempt",
            Stage::Action => "action",
            Stage::ApplyResult => "apply.result",
            Stage::Rollback => "rollback",
            Stage::RollbackSummary => "rollback.summary",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug)]
pub enum Decision {
    Success,
    Failure,
    Warn,
}

impl Decision {
    const fn as_str(self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
            Decision::Warn => "warn",
        }
    }
}

/// Builder facade over audit emission with a centralized envelope.
pub(crate) struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub(crate) fn stage(&'a self, stage: Stage) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, stage)
    }
}

pub(crate) struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    /// Merge extra fields into the event (object values only).
    pub(crate) fn merge(mut self, extra: Value) -> Self {
        if let Value::Object(map) = extra {
            for (k, v) in map {
                self.fields.insert(k, v);
            }
        }
        self
    }

    fn emit(mut self, decision: Decision) {
        self.fields
            .insert("schema_version".to_string(), json!(SCHEMA_VERSION));
        self.fields.insert("ts".to_string(), json!(now_iso()));
        self.fields
            .insert("batch_id".to_string(), json!(self.ctx.batch_id));
        self.ctx.facts.emit(
            "modbay",
            self.stage.as_event(),
            decision.as_str(),
            Value::Object(self.fields),
        );
    }

    pub(crate) fn emit_success(self) {
        self.emit(Decision::Success);
    }

    pub(crate) fn emit_failure(self) {
        self.emit(Decision::Failure);
    }

    pub(crate) fn emit_warn(self) {
        self.emit(Decision::Warn);
    }
}
