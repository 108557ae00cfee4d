/// Build a `Vec<PgValue>` parameter list from plain Rust values.
///
/// Every argument goes through [`IntoPgValue`](crate::IntoPgValue), so
/// `Option<T>` binds `NULL` for `None`.
///
/// ```
/// use pgquery::{params, PgValue};
///
/// let p = params![1i32, "ada", None::<i64>];
/// assert_eq!(
///     p,
///     vec![PgValue::Int4(1), PgValue::Text("ada".into()), PgValue::Null]
/// );
/// assert!(params![].is_empty());
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::PgValue>::new()
    };
    ($($value:expr),+ $(,)?) => {
        ::std::vec![$($crate::IntoPgValue::into_pg_value($value)),+]
    };
}
