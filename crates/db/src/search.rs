//! Generic filter / sort / paginate engine shared by every searchable table.
//!
//! A repository describes its table through [`Searchable`], turns its
//! optional filter struct into [`Predicates`], and hands a
//! [`SearchRequest`] to [`search`]. Count and page are read inside one
//! `REPEATABLE READ` transaction so `total_count` always matches the page.

use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::{FromRow, PgPool, Postgres};
use steamwatch_core::search::{Pagination, SortOrder};
use steamwatch_core::types::Timestamp;

// ---------------------------------------------------------------------------
// Table description
// ---------------------------------------------------------------------------

/// A row type that can be served by [`search`].
pub trait Searchable: for<'r> FromRow<'r, PgRow> + Send + Unpin {
    /// Table name.
    const TABLE: &'static str;
    /// Alias used to qualify predicate and sort columns.
    const ALIAS: &'static str;
    /// Column list for SELECT.
    const COLUMNS: &'static str;
}

// ---------------------------------------------------------------------------
// Predicates
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built predicates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BindValue {
    BigInt(i64),
    Timestamp(Timestamp),
}

impl From<i64> for BindValue {
    fn from(v: i64) -> Self {
        Self::BigInt(v)
    }
}

impl From<Timestamp> for BindValue {
    fn from(v: Timestamp) -> Self {
        Self::Timestamp(v)
    }
}

/// Comparison operator for a single predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compare {
    Eq,
    Gte,
    Lte,
}

impl Compare {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gte => ">=",
            Self::Lte => "<=",
        }
    }
}

/// Ordered list of `(condition, bind value)` pairs, ANDed together.
///
/// Absent filters contribute nothing; they are never turned into
/// wildcards.
#[derive(Debug, Clone, Default)]
pub struct Predicates {
    conditions: Vec<(String, Compare)>,
    binds: Vec<BindValue>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column <op> value`.
    pub fn push(&mut self, column: &str, op: Compare, value: impl Into<BindValue>) -> &mut Self {
        self.conditions.push((column.to_string(), op));
        self.binds.push(value.into());
        self
    }

    /// Add `column <op> value` only when `value` is present.
    pub fn push_opt<V: Into<BindValue>>(
        &mut self,
        column: &str,
        op: Compare,
        value: Option<V>,
    ) -> &mut Self {
        if let Some(v) = value {
            self.push(column, op, v);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.binds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }

    pub fn binds(&self) -> &[BindValue] {
        &self.binds
    }

    /// Render the WHERE clause with `$1..$n` placeholders, qualifying each
    /// column with `alias`. Empty when there are no predicates.
    pub fn where_clause(&self, alias: &str) -> String {
        if self.conditions.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .conditions
            .iter()
            .enumerate()
            .map(|(i, (column, op))| format!("{alias}.{column} {} ${}", op.as_sql(), i + 1))
            .collect();
        format!("WHERE {}", parts.join(" AND "))
    }
}

// ---------------------------------------------------------------------------
// Request / result
// ---------------------------------------------------------------------------

/// A single-key sort on an allowed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub order: SortOrder,
}

/// Everything [`search`] needs besides the table description.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub predicates: Predicates,
    pub sort: Option<Sort>,
    pub pagination: Pagination,
}

/// A page of results plus the total count of the filtered set.
///
/// `page` and `per_page` are 0 when the request was unpaginated.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i64,
    pub per_page: i64,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Build the `(count_sql, select_sql)` pair for a request.
pub fn build_sql<T: Searchable>(req: &SearchRequest) -> (String, String) {
    let mut from = format!("FROM {} AS {}", T::TABLE, T::ALIAS);
    if !req.predicates.is_empty() {
        from.push(' ');
        from.push_str(&req.predicates.where_clause(T::ALIAS));
    }

    let count_sql = format!("SELECT COUNT(*)::BIGINT {from}");

    let mut select_sql = format!("SELECT {} {from}", T::COLUMNS);
    if let Some(sort) = req.sort {
        select_sql.push_str(&format!(
            " ORDER BY {}.{} {}",
            T::ALIAS,
            sort.column,
            sort.order.as_sql()
        ));
    }
    if req.pagination.window().is_some() {
        let next = req.predicates.len() + 1;
        select_sql.push_str(&format!(" LIMIT ${next} OFFSET ${}", next + 1));
    }

    (count_sql, select_sql)
}

/// Run a filtered, sorted, paginated search over `T`'s table.
pub async fn search<T: Searchable>(
    pool: &PgPool,
    req: &SearchRequest,
) -> Result<SearchPage<T>, sqlx::Error> {
    let (count_sql, select_sql) = build_sql::<T>(req);
    let window = req.pagination.window();

    tracing::debug!(
        table = T::TABLE,
        filters = req.predicates.len(),
        sort = ?req.sort,
        page = window.map(|w| w.page),
        limit = window.map(|w| w.limit),
        "Searching"
    );

    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let total_count = bind_scalar(sqlx::query_scalar::<_, i64>(&count_sql), req.predicates.binds())
        .fetch_one(&mut *tx)
        .await?;

    let mut q = bind_rows(sqlx::query_as::<_, T>(&select_sql), req.predicates.binds());
    if let Some(w) = window {
        q = q.bind(w.limit).bind(w.offset);
    }
    let items = q.fetch_all(&mut *tx).await?;

    tx.commit().await?;

    Ok(SearchPage {
        items,
        total_count,
        page: window.map_or(0, |w| w.page),
        per_page: window.map_or(0, |w| w.limit),
    })
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_rows<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    binds: &[BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in binds {
        match *val {
            BindValue::BigInt(v) => q = q.bind(v),
            BindValue::Timestamp(v) => q = q.bind(v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    binds: &[BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in binds {
        match *val {
            BindValue::BigInt(v) => q = q.bind(v),
            BindValue::Timestamp(v) => q = q.bind(v),
        }
    }
    q
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
