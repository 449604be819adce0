//! Audit trail of structured log lines.
//!
//! Every `tracing` event emitted by the steamwatch crates is turned into a
//! JSON record by [`AuditLayer`], handed to an injected [`AuditSink`], and
//! persisted to `audit_logs` by [`AuditWriter`].
//!
//! ```text
//! tracing::info!(..) -> AuditLayer -> ChannelSink -> mpsc -> AuditWriter -> audit_logs
//! ```

pub mod layer;
pub mod sink;
pub mod writer;

pub use layer::{targets, AuditLayer};
pub use sink::{AuditRecord, AuditSink, ChannelSink};
pub use writer::AuditWriter;
