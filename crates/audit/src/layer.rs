//! `tracing` layer that turns events into audit records.

use std::fmt;

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

use crate::sink::{AuditRecord, AuditSink};

/// Target prefixes that are never captured.
///
/// The writer's own diagnostics and the database driver it calls would
/// otherwise feed back into the sink.
const EXCLUDED_TARGETS: [&str; 2] = ["steamwatch_audit", "sqlx"];

/// Keys written by the layer itself. Event fields with these names are
/// overwritten.
const RESERVED_KEYS: [&str; 4] = ["level", "target", "time", "message"];

/// Captures every event that passes its filter and forwards it to `K`.
pub struct AuditLayer<K> {
    sink: K,
}

impl<K: AuditSink> AuditLayer<K> {
    pub fn new(sink: K) -> Self {
        Self { sink }
    }
}

/// Per-layer filter for [`AuditLayer`]: the steamwatch crates at `DEBUG`
/// and above.
pub fn targets() -> Targets {
    Targets::new().with_target("steamwatch", LevelFilter::DEBUG)
}

fn is_excluded(target: &str) -> bool {
    EXCLUDED_TARGETS.iter().any(|prefix| target.starts_with(prefix))
}

impl<S, K> Layer<S> for AuditLayer<K>
where
    S: Subscriber,
    K: AuditSink,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if is_excluded(meta.target()) {
            return;
        }

        let mut visitor = JsonVisitor::default();
        event.record(&mut visitor);

        let now = Utc::now();
        let mut raw = visitor.fields;
        let message = visitor.message.unwrap_or_default();
        raw.insert("level".into(), Value::from(meta.level().as_str().to_ascii_lowercase()));
        raw.insert("target".into(), Value::from(meta.target()));
        raw.insert("time".into(), Value::from(now.to_rfc3339()));
        raw.insert("message".into(), Value::from(message));

        self.sink.append(AuditRecord {
            raw: Value::Object(raw),
            created_at: now,
        });
    }
}

/// Collects event fields into a JSON object.
#[derive(Default)]
struct JsonVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl JsonVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        let name = field.name();
        if name == "message" {
            self.message = Some(match value {
                Value::String(s) => s,
                other => other.to_string(),
            });
        } else if !RESERVED_KEYS.contains(&name) {
            self.fields.insert(name.to_string(), value);
        }
    }
}

impl Visit for JsonVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        let value = serde_json::Number::from_f64(value)
            .map(Value::Number)
            .unwrap_or_else(|| Value::from(value.to_string()));
        self.insert(field, value);
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}
