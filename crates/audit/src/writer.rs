//! Background task that persists captured records to `audit_logs`.

use std::sync::Arc;

use steamwatch_core::snowflake::Snowflake;
use steamwatch_core::types::DbId;
use steamwatch_db::repositories::AuditLogRepo;
use steamwatch_db::DbPool;
use tokio::sync::mpsc;

use crate::sink::AuditRecord;

/// Persists audit records as they arrive.
pub struct AuditWriter;

impl AuditWriter {
    /// Run the persistence loop.
    ///
    /// Exits once every sender is gone (see
    /// [`ChannelSink::close`](crate::ChannelSink::close)) and the queue is
    /// drained. A failed insert is logged and the record dropped.
    pub async fn run(
        pool: DbPool,
        ids: Arc<Snowflake>,
        mut receiver: mpsc::UnboundedReceiver<AuditRecord>,
    ) {
        let mut written = 0u64;
        while let Some(record) = receiver.recv().await {
            match Self::persist(&pool, &ids, &record).await {
                Ok(_) => written += 1,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist audit record");
                }
            }
        }
        tracing::info!(written, "Audit channel closed, writer shutting down");
    }

    async fn persist(
        pool: &DbPool,
        ids: &Snowflake,
        record: &AuditRecord,
    ) -> Result<DbId, sqlx::Error> {
        let entry = AuditLogRepo::create(pool, ids.generate(), record.created_at, &record.raw).await?;
        Ok(entry.id)
    }
}
