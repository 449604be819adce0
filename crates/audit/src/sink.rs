//! Destination for captured audit records.

use std::sync::Mutex;

use serde_json::Value;
use steamwatch_core::types::Timestamp;
use tokio::sync::mpsc;

/// One captured log line, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditRecord {
    pub raw: Value,
    pub created_at: Timestamp,
}

/// Capability to accept audit records.
///
/// Called synchronously from inside the tracing layer, so implementations
/// must not block and must not emit tracing events of their own.
pub trait AuditSink: Send + Sync + 'static {
    fn append(&self, record: AuditRecord);
}

/// Forwards records to an [`AuditWriter`](crate::AuditWriter) over an
/// unbounded channel.
///
/// The sender lives inside the global subscriber, so it is never dropped on
/// its own. Call [`ChannelSink::close`] at shutdown to let the writer drain
/// and exit.
#[derive(Debug)]
pub struct ChannelSink {
    sender: Mutex<Option<mpsc::UnboundedSender<AuditRecord>>>,
}

impl ChannelSink {
    /// Create a sink and the receiver its records arrive on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AuditRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                sender: Mutex::new(Some(tx)),
            },
            rx,
        )
    }

    /// Stop accepting records. Records already queued are still delivered.
    pub fn close(&self) {
        if let Ok(mut sender) = self.sender.lock() {
            sender.take();
        }
    }
}

impl AuditSink for ChannelSink {
    fn append(&self, record: AuditRecord) {
        if let Ok(sender) = self.sender.lock() {
            if let Some(tx) = sender.as_ref() {
                // A closed receiver means the writer is gone; drop the record.
                let _ = tx.send(record);
            }
        }
    }
}

impl<T: AuditSink> AuditSink for std::sync::Arc<T> {
    fn append(&self, record: AuditRecord) {
        (**self).append(record);
    }
}
