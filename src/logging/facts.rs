use std::io::Write;
use std::sync::Mutex;

use log::Level;
use serde_json::Value;

/// Structured event channel: one JSON fact per engine decision.
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Human-readable leveled log channel.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Writes one JSON object per emitted fact to an owned line-oriented writer.
/// `Default` targets process stderr. The audit channel forwards to the `log`
/// facade, so embedders keep their own formatting for the human side.
pub struct JsonlSink {
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonlSink {
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    fn write_line(&self, line: &Value) {
        // A sink that cannot write must never fail an install.
        if let Ok(mut out) = self.out.lock() {
            let _ = serde_json::to_writer(&mut *out, line);
            let _ = out.write_all(b"\n");
        }
    }
}

impl Default for JsonlSink {
    fn default() -> Self {
        Self::stderr()
    }
}

impl FactsEmitter for JsonlSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let mut line = match fields {
            Value::Object(_) => fields,
            other => serde_json::json!({ "fields": other }),
        };
        if let Some(map) = line.as_object_mut() {
            map.insert("subsystem".into(), Value::String(subsystem.into()));
            map.insert("event".into(), Value::String(event.into()));
            map.insert("decision".into(), Value::String(decision.into()));
        }
        self.write_line(&line);
    }
}

impl AuditSink for JsonlSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(level, "{msg}");
    }
}
