//! Audit log entity models (captured structured log lines).
//!
//! Audit logs have no `updated_at` field (immutable records).

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sqlx::FromRow;
use steamwatch_core::search::{Pagination, SortOrder};
use steamwatch_core::types::{DbId, Timestamp};

/// One captured log line.
///
/// Serializes as a single flat object: `audit_id` and `audit_created_at`
/// followed by the fields of `raw`, so the stored record reads like the
/// captured log line.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLog {
    pub id: DbId,
    pub raw: serde_json::Value,
    pub created_at: Timestamp,
}

impl Serialize for AuditLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("audit_id", &self.id)?;
        map.serialize_entry("audit_created_at", &self.created_at.to_rfc3339())?;
        match &self.raw {
            serde_json::Value::Object(fields) => {
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
            }
            serde_json::Value::Null => {}
            other => map.serialize_entry("raw", other)?,
        }
        map.end()
    }
}

/// Filters for searching audit logs.
#[derive(Debug, Clone, Default)]
pub struct AuditLogSearch {
    pub start_created_at: Option<Timestamp>,
    pub end_created_at: Option<Timestamp>,
    pub sort_by_id: Option<SortOrder>,
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
