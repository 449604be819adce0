//! Handlers for the audit trail.

use axum::extract::{Query, State};
use axum::Json;
use steamwatch_db::models::audit_log::AuditLog;
use steamwatch_db::repositories::AuditLogRepo;

use crate::error::AppResult;
use crate::query::AuditLogParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/audit_logs
///
/// Each entry is the captured log line with `audit_id` and
/// `audit_created_at` merged in.
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(params): Query<AuditLogParams>,
) -> AppResult<Json<PageResponse<AuditLog>>> {
    let search = params.into_search()?;
    let page = AuditLogRepo::search(&state.pool, &search).await?;
    Ok(Json(PageResponse::new("audit_logs", page)))
}
