//! Query parameters for the history endpoints.
//!
//! Every value arrives as a string and is parsed leniently: a malformed
//! `page`, `limit`, `steam_id`, or timestamp is ignored and the default
//! applies. Only requests that are well-formed but unsatisfiable are
//! rejected: an unknown sort direction, an inverted time range, or a
//! negative `steam_id`.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use steamwatch_core::error::CoreError;
use steamwatch_core::search::{parse_sort, validate_time_range, Pagination, SortOrder};
use steamwatch_core::steam_id::SteamId;
use steamwatch_core::types::Timestamp;
use steamwatch_db::models::audit_log::AuditLogSearch;
use steamwatch_db::models::player::PlayerSearch;
use steamwatch_db::models::player_event::PlayerEventSearch;

/// `GET /api/players` and `GET /api/player_events`.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub steam_id: Option<String>,
    pub start_created_at: Option<String>,
    pub end_created_at: Option<String>,
    #[serde(rename = "sort_by[created_at]")]
    pub sort_by_created_at: Option<String>,
}

/// `GET /api/audit_logs`.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub start_created_at: Option<String>,
    pub end_created_at: Option<String>,
    #[serde(rename = "sort_by[id]")]
    pub sort_by_id: Option<String>,
}

impl HistoryParams {
    pub fn into_player_search(self) -> Result<PlayerSearch, CoreError> {
        let f = HistoryFilters::parse(&self)?;
        Ok(PlayerSearch {
            steam_id: f.steam_id,
            start_created_at: f.start,
            end_created_at: f.end,
            sort_by_created_at: f.sort,
            pagination: f.pagination,
        })
    }

    pub fn into_event_search(self) -> Result<PlayerEventSearch, CoreError> {
        let f = HistoryFilters::parse(&self)?;
        Ok(PlayerEventSearch {
            steam_id: f.steam_id,
            start_created_at: f.start,
            end_created_at: f.end,
            sort_by_created_at: f.sort,
            pagination: f.pagination,
        })
    }
}

impl AuditLogParams {
    pub fn into_search(self) -> Result<AuditLogSearch, CoreError> {
        let sort_by_id = parse_sort("sort_by[id]", self.sort_by_id.as_deref())?;
        let (start, end) = time_range(&self.start_created_at, &self.end_created_at)?;
        Ok(AuditLogSearch {
            start_created_at: start,
            end_created_at: end,
            sort_by_id,
            pagination: pagination(&self.page, &self.limit),
        })
    }
}

/// Shared shape of the player and player event filters.
struct HistoryFilters {
    steam_id: Option<SteamId>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
    sort: Option<SortOrder>,
    pagination: Pagination,
}

impl HistoryFilters {
    fn parse(params: &HistoryParams) -> Result<Self, CoreError> {
        let sort = parse_sort("sort_by[created_at]", params.sort_by_created_at.as_deref())?;
        let (start, end) = time_range(&params.start_created_at, &params.end_created_at)?;
        Ok(Self {
            steam_id: steam_id(&params.steam_id)?,
            start,
            end,
            sort,
            pagination: pagination(&params.page, &params.limit),
        })
    }
}

// ---------------------------------------------------------------------------
// Lenient field parsers
// ---------------------------------------------------------------------------

fn int(raw: &Option<String>) -> Option<i64> {
    raw.as_deref().and_then(|v| v.trim().parse().ok())
}

fn timestamp(raw: &Option<String>) -> Option<Timestamp> {
    raw.as_deref()
        .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn pagination(page: &Option<String>, limit: &Option<String>) -> Pagination {
    Pagination::from_query(int(page), int(limit))
}

/// An unparseable id is ignored; a negative one is rejected.
fn steam_id(raw: &Option<String>) -> Result<Option<SteamId>, CoreError> {
    int(raw).map(SteamId::new).transpose()
}

fn time_range(
    start: &Option<String>,
    end: &Option<String>,
) -> Result<(Option<Timestamp>, Option<Timestamp>), CoreError> {
    let (start, end) = (timestamp(start), timestamp(end));
    validate_time_range(start, end)?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn some(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let params = HistoryParams {
            page: some("abc"),
            limit: some("1.5"),
            steam_id: some("not-a-number"),
            start_created_at: some("yesterday"),
            ..Default::default()
        };
        let search = params.into_player_search().unwrap();
        assert_eq!(search.pagination, Pagination::new(1, 25));
        assert_eq!(search.steam_id, None);
        assert_eq!(search.start_created_at, None);
    }

    #[test]
    fn well_formed_values_are_used() {
        let params = HistoryParams {
            page: some("2"),
            limit: some("500"),
            steam_id: some("76561197960287930"),
            start_created_at: some("2025-01-01T00:00:00Z"),
            end_created_at: some("2025-01-02T00:00:00+02:00"),
            sort_by_created_at: some("DESC"),
        };
        let search = params.into_event_search().unwrap();
        assert_eq!(search.pagination, Pagination::new(2, 100));
        assert_eq!(search.steam_id.unwrap().get(), 76561197960287930);
        assert_eq!(search.sort_by_created_at, Some(SortOrder::Desc));
        assert_eq!(
            search.end_created_at.unwrap().to_rfc3339(),
            "2025-01-01T22:00:00+00:00"
        );
    }

    #[test]
    fn negative_steam_id_is_rejected() {
        let params = HistoryParams {
            steam_id: some("-7"),
            ..Default::default()
        };
        assert_matches!(params.into_player_search(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = AuditLogParams {
            start_created_at: some("2025-02-01T00:00:00Z"),
            end_created_at: some("2025-01-01T00:00:00Z"),
            ..Default::default()
        };
        assert_matches!(params.into_search(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn unknown_sort_direction_is_rejected() {
        let params = AuditLogParams {
            sort_by_id: some("sideways"),
            ..Default::default()
        };
        let err = params.into_search().unwrap_err();
        assert!(err.to_string().contains("sort_by[id]"));
    }
}
