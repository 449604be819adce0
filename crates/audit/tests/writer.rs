use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use steamwatch_audit::{AuditRecord, AuditSink, AuditWriter, ChannelSink};
use steamwatch_core::search::{Pagination, SortOrder};
use steamwatch_core::snowflake::Snowflake;
use steamwatch_db::models::audit_log::AuditLogSearch;
use steamwatch_db::repositories::AuditLogRepo;

#[sqlx::test(migrations = "../../db/migrations")]
async fn writer_drains_queue_after_close(pool: PgPool) {
    let (sink, rx) = ChannelSink::channel();
    let ids = Arc::new(Snowflake::new(1).unwrap());
    let writer = tokio::spawn(AuditWriter::run(pool.clone(), ids, rx));

    for n in 0..5 {
        sink.append(AuditRecord {
            raw: json!({ "level": "info", "message": "tick", "n": n }),
            created_at: Utc::now(),
        });
    }
    sink.close();
    writer.await.unwrap();

    let page = AuditLogRepo::search(
        &pool,
        &AuditLogSearch {
            sort_by_id: Some(SortOrder::Asc),
            pagination: Pagination::unbounded(),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(page.total_count, 5);
    let ns: Vec<_> = page.items.iter().map(|e| e.raw["n"].as_i64().unwrap()).collect();
    assert_eq!(ns, vec![0, 1, 2, 3, 4]);
}
