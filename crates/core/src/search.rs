//! Pagination, sorting, and filter validation for the search endpoints.
//!
//! This module lives in `core` (zero internal deps) so the repository layer
//! and the HTTP handlers agree on the same rules.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of rows per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

/// Maximum number of rows per page.
pub const MAX_PAGE_LIMIT: i64 = 100;

// ---------------------------------------------------------------------------
// Sort order
// ---------------------------------------------------------------------------

/// Direction of a single-key sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = CoreError;

    /// Accepts `asc` or `desc` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(CoreError::Validation(format!(
                "invalid sort order: {s}, must be 'asc' or 'desc'"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Parse an optional sort direction for `field`.
///
/// `None` means "no sort requested"; a present but invalid value is a
/// validation error so the query is rejected before touching the database.
pub fn parse_sort(field: &str, value: Option<&str>) -> Result<Option<SortOrder>, CoreError> {
    value
        .map(|v| {
            v.parse::<SortOrder>().map_err(|_| {
                CoreError::Validation(format!(
                    "invalid sort order for {field}: {v}, must be 'asc' or 'desc'"
                ))
            })
        })
        .transpose()
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

/// Requested page window.
///
/// A zero `page` or `limit` means "unpaginated": the full filtered set is
/// returned. Callers must only do that for small, known sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

/// A resolved `LIMIT`/`OFFSET` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Return every matching row.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Resolve HTTP query values: a missing or non-positive page becomes 1,
    /// a missing or non-positive limit becomes [`DEFAULT_PAGE_LIMIT`], and a
    /// limit above [`MAX_PAGE_LIMIT`] is clamped.
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .min(MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    /// Compute the window to apply, or `None` when unpaginated.
    pub fn window(self) -> Option<PageWindow> {
        if self.page == 0 || self.limit == 0 {
            return None;
        }
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, MAX_PAGE_LIMIT);
        Some(PageWindow {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        })
    }
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Reject a creation-time range whose start lies after its end.
pub fn validate_time_range(
    start: Option<Timestamp>,
    end: Option<Timestamp>,
) -> Result<(), CoreError> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => Err(CoreError::Validation(format!(
            "start_created_at ({}) must not be after end_created_at ({})",
            s.to_rfc3339(),
            e.to_rfc3339()
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    // -- SortOrder -----------------------------------------------------------

    #[test]
    fn sort_order_is_case_insensitive() {
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert_eq!("Desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
    }

    #[test]
    fn sort_order_rejects_anything_else() {
        assert_matches!("sideways".parse::<SortOrder>(), Err(CoreError::Validation(_)));
        assert_matches!("".parse::<SortOrder>(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn parse_sort_absent_is_none() {
        assert_eq!(parse_sort("id", None).unwrap(), None);
        assert_eq!(parse_sort("id", Some("desc")).unwrap(), Some(SortOrder::Desc));
    }

    #[test]
    fn parse_sort_names_the_field() {
        let err = parse_sort("created_at", Some("up")).unwrap_err();
        assert!(err.to_string().contains("created_at"));
    }

    // -- Pagination ----------------------------------------------------------

    #[test]
    fn zero_page_or_limit_is_unpaginated() {
        assert_eq!(Pagination::new(0, 25).window(), None);
        assert_eq!(Pagination::new(3, 0).window(), None);
        assert_eq!(Pagination::unbounded().window(), None);
    }

    #[test]
    fn negative_page_is_treated_as_first_page() {
        let w = Pagination::new(-5, 25).window().unwrap();
        assert_eq!(w.page, 1);
        assert_eq!(w.offset, 0);
    }

    #[test]
    fn limit_is_clamped_to_max() {
        let w = Pagination::new(1, 500).window().unwrap();
        assert_eq!(w.limit, 100);
    }

    #[test]
    fn offset_is_page_minus_one_times_limit() {
        let w = Pagination::new(4, 10).window().unwrap();
        assert_eq!(w.offset, 30);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let w = Pagination::from_query(Some(i64::MAX / 10), Some(100))
            .window()
            .unwrap();
        assert_eq!(w.offset, i64::MAX);
        assert_eq!(w.limit, 100);
    }

    #[test]
    fn from_query_applies_defaults() {
        assert_eq!(Pagination::from_query(None, None), Pagination::new(1, 25));
        assert_eq!(Pagination::from_query(Some(0), Some(0)), Pagination::new(1, 25));
        assert_eq!(Pagination::from_query(Some(-5), Some(500)), Pagination::new(1, 100));
        assert_eq!(Pagination::from_query(Some(3), Some(10)), Pagination::new(3, 10));
    }

    // -- Time range ----------------------------------------------------------

    #[test]
    fn time_range_rejects_inverted_bounds() {
        let now = Utc::now();
        assert!(validate_time_range(Some(now), Some(now - Duration::hours(1))).is_err());
        assert!(validate_time_range(Some(now), Some(now)).is_ok());
        assert!(validate_time_range(None, Some(now)).is_ok());
    }
}
