//! Raw SQL helpers
//!
//! Convenience functions over any [`PgQuery`] for the common result shapes:
//! all rows, at most one row, exactly one row, a single scalar, and rows mapped
//! through [`FromRow`]. Each helper issues exactly one boundary call.

use crate::error::QueryError;
use crate::executor::PgQuery;
use crate::row::{FromRow, ResultRow};
use crate::value::{PgValue, TryGetable};

/// Execute a query and return every row
///
/// # Arguments
///
/// * `executor` - The executor to use for database operations
/// * `sql` - SQL query string with `$n` placeholders
/// * `params` - Parameters to bind (empty slice for no parameters)
///
/// # Errors
///
/// Returns `QueryError` if the query fails.
///
/// # Examples
///
/// ```
/// use pgquery::{params, query_all, MockHost, QueryMarshaller};
///
/// let db = QueryMarshaller::new(MockHost::new().append_query_results(vec![vec![]]));
/// let rows = query_all(&db, "SELECT * FROM users WHERE active = $1", &params![true])?;
/// assert!(rows.is_empty());
/// # Ok::<(), pgquery::QueryError>(())
/// ```
pub fn query_all<E: PgQuery>(
    executor: &E,
    sql: &str,
    params: &[PgValue],
) -> Result<Vec<ResultRow>, QueryError> {
    executor.query(sql, params)
}

/// Execute a query that returns zero or one row
///
/// # Returns
///
/// `Ok(None)` when the query matched nothing, `Ok(Some(row))` for a single row.
///
/// # Errors
///
/// Returns `QueryError` if the query fails or returns more than one row.
pub fn query_opt<E: PgQuery>(
    executor: &E,
    sql: &str,
    params: &[PgValue],
) -> Result<Option<ResultRow>, QueryError> {
    let mut rows = executor.query(sql, params)?;
    match rows.len() {
        0 => Ok(None),
        1 => Ok(rows.pop()),
        n => Err(QueryError::unexpected(format!(
            "expected at most one row, got {n}"
        ))),
    }
}

/// Execute a query that returns exactly one row
///
/// # Errors
///
/// Returns `QueryError` if:
/// - The query execution fails
/// - No rows are returned
/// - Multiple rows are returned
///
/// # Examples
///
/// ```
/// use pgquery::{params, query_one, MockHost, PgValue, QueryMarshaller, ResultRow, ResultRowEntry};
///
/// let host = MockHost::new().append_query_results(vec![vec![ResultRow::from(vec![
///     ResultRowEntry::new("name", PgValue::Text("ada".into())),
/// ])]]);
/// let db = QueryMarshaller::new(host);
/// let row = query_one(&db, "SELECT name FROM users WHERE id = $1", &params![42i64])?;
/// assert_eq!(row.try_get::<String, _>("name")?, "ada");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn query_one<E: PgQuery>(
    executor: &E,
    sql: &str,
    params: &[PgValue],
) -> Result<ResultRow, QueryError> {
    query_opt(executor, sql, params)?
        .ok_or_else(|| QueryError::unexpected("expected exactly one row, got 0"))
}

/// Execute a query and extract the first column of its single row
///
/// Typical for `SELECT count(*)`, `SELECT exists(...)` and `RETURNING id`.
///
/// # Errors
///
/// Returns `QueryError` if the query does not produce exactly one row, the row
/// has no columns, or the value cannot be converted to `T`.
pub fn query_value<T, E>(executor: &E, sql: &str, params: &[PgValue]) -> Result<T, QueryError>
where
    T: TryGetable,
    E: PgQuery,
{
    let row = query_one(executor, sql, params)?;
    row.try_get::<T, usize>(0)
        .map_err(|e| QueryError::unexpected(format!("failed to extract value: {e}")))
}

/// Execute a query and map every row through [`FromRow`]
///
/// # Errors
///
/// Returns `QueryError` if the query fails or any row cannot be mapped. Mapping
/// stops at the first row that fails.
///
/// # Examples
///
/// ```
/// use pgquery::{query_as, FromRow, MockHost, PgValue, QueryMarshaller, ResultRow, ResultRowEntry};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// let host = MockHost::new().append_query_results(vec![vec![ResultRow::from(vec![
///     ResultRowEntry::new("id", PgValue::Int8(7)),
///     ResultRowEntry::new("name", PgValue::Varchar("grace".into())),
/// ])]]);
/// let db = QueryMarshaller::new(host);
/// let users: Vec<User> = query_as(&db, "SELECT id, name FROM users", &[])?;
/// assert_eq!(users[0].id, 7);
/// assert_eq!(users[0].name, "grace");
/// # Ok::<(), pgquery::QueryError>(())
/// ```
pub fn query_as<T, E>(executor: &E, sql: &str, params: &[PgValue]) -> Result<Vec<T>, QueryError>
where
    T: FromRow,
    E: PgQuery,
{
    executor
        .query(sql, params)?
        .iter()
        .map(|row| {
            T::from_row(row)
                .map_err(|e| QueryError::unexpected(format!("failed to map row: {e}")))
        })
        .collect()
}

/// Execute one or more statements with no parameters and no results
///
/// # Errors
///
/// Returns `QueryError` if any statement fails.
pub fn execute_batch<E: PgQuery>(executor: &E, sql: &str) -> Result<(), QueryError> {
    executor.query_batch(sql)
}
