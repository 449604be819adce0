//! Repository for the `audit_logs` table.

use sqlx::{PgExecutor, PgPool};
use steamwatch_core::types::{DbId, Timestamp};

use crate::models::audit_log::{AuditLog, AuditLogSearch};
use crate::search::{self, Compare, Predicates, SearchPage, SearchRequest, Searchable, Sort};

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "id, raw, created_at";

impl Searchable for AuditLog {
    const TABLE: &'static str = "audit_logs";
    const ALIAS: &'static str = "al";
    const COLUMNS: &'static str = COLUMNS;
}

/// Provides insert and query operations for audit logs.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Insert one captured log line.
    pub async fn create<'e, E: PgExecutor<'e>>(
        executor: E,
        id: DbId,
        created_at: Timestamp,
        raw: &serde_json::Value,
    ) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (id, raw, created_at) VALUES ($1, $2, $3) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(id)
            .bind(raw)
            .bind(created_at)
            .fetch_one(executor)
            .await
    }

    /// Search audit logs by creation time, optionally sorted by id.
    pub async fn search(
        pool: &PgPool,
        params: &AuditLogSearch,
    ) -> Result<SearchPage<AuditLog>, sqlx::Error> {
        let mut predicates = Predicates::new();
        predicates
            .push_opt("created_at", Compare::Gte, params.start_created_at)
            .push_opt("created_at", Compare::Lte, params.end_created_at);

        let req = SearchRequest {
            predicates,
            sort: params.sort_by_id.map(|order| Sort { column: "id", order }),
            pagination: params.pagination,
        };

        search::search::<AuditLog>(pool, &req).await
    }
}
