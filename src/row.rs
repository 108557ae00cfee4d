//! Decoded result rows.
//!
//! A [`ResultRow`] is an ordered sequence of named column values. Rows are
//! fully materialized by the host before they cross the boundary, and after
//! decode they are plain owned data: iterate them as often as you like.

use crate::value::{PgValue, TryGetable, ValueExtractionError};

/// One column of a result row.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRowEntry {
    pub column_name: String,
    pub value: PgValue,
}

impl ResultRowEntry {
    pub fn new(column_name: impl Into<String>, value: PgValue) -> Self {
        Self {
            column_name: column_name.into(),
            value,
        }
    }
}

/// An ordered row of column values as returned by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultRow {
    entries: Vec<ResultRowEntry>,
}

impl ResultRow {
    pub fn new(entries: Vec<ResultRowEntry>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ResultRowEntry] {
        &self.entries
    }

    /// Column values in column order.
    pub fn values(&self) -> impl Iterator<Item = &PgValue> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// Column names in column order.
    pub fn columns(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.column_name.as_str())
    }

    pub fn get(&self, idx: usize) -> Option<&PgValue> {
        self.entries.get(idx).map(|e| &e.value)
    }

    /// First column with this name. Postgres allows duplicate names; later ones are
    /// only reachable by index.
    pub fn get_by_name(&self, name: &str) -> Option<&PgValue> {
        self.entries
            .iter()
            .find(|e| e.column_name == name)
            .map(|e| &e.value)
    }

    /// Extract and convert a column by index or name.
    ///
    /// # Errors
    ///
    /// Returns [`ValueExtractionError::MissingColumn`] if the column does not exist,
    /// otherwise whatever [`TryGetable::try_get`] reports for the value.
    ///
    /// ```
    /// use pgquery::{PgValue, ResultRow, ResultRowEntry};
    ///
    /// let row = ResultRow::from(vec![ResultRowEntry::new("id", PgValue::Int8(7))]);
    /// assert_eq!(row.try_get::<i64, _>("id"), Ok(7));
    /// assert_eq!(row.try_get::<i64, _>(0), Ok(7));
    /// ```
    pub fn try_get<T, I>(&self, idx: I) -> Result<T, ValueExtractionError>
    where
        T: TryGetable,
        I: ColumnIndex,
    {
        let value = idx
            .locate(self)
            .ok_or_else(|| ValueExtractionError::MissingColumn(idx.describe()))?;
        T::try_get(value.clone())
    }

    pub fn into_entries(self) -> Vec<ResultRowEntry> {
        self.entries
    }

    pub fn into_values(self) -> Vec<PgValue> {
        self.entries.into_iter().map(|e| e.value).collect()
    }
}

impl From<Vec<ResultRowEntry>> for ResultRow {
    fn from(entries: Vec<ResultRowEntry>) -> Self {
        Self::new(entries)
    }
}

impl FromIterator<ResultRowEntry> for ResultRow {
    fn from_iter<I: IntoIterator<Item = ResultRowEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for ResultRow {
    type Item = ResultRowEntry;
    type IntoIter = std::vec::IntoIter<ResultRowEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultRow {
    type Item = &'a ResultRowEntry;
    type IntoIter = std::slice::Iter<'a, ResultRowEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// A way of addressing a column in a [`ResultRow`].
pub trait ColumnIndex {
    fn locate<'r>(&self, row: &'r ResultRow) -> Option<&'r PgValue>;

    fn describe(&self) -> String;
}

impl ColumnIndex for usize {
    fn locate<'r>(&self, row: &'r ResultRow) -> Option<&'r PgValue> {
        row.get(*self)
    }

    fn describe(&self) -> String {
        format!("#{self}")
    }
}

impl ColumnIndex for &str {
    fn locate<'r>(&self, row: &'r ResultRow) -> Option<&'r PgValue> {
        row.get_by_name(self)
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }
}

impl ColumnIndex for String {
    fn locate<'r>(&self, row: &'r ResultRow) -> Option<&'r PgValue> {
        row.get_by_name(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

/// Build a value of `Self` from a decoded row.
///
/// Usually derived:
///
/// ```
/// use pgquery::{FromRow, PgValue, ResultRow, ResultRowEntry};
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     #[column_name("display_name")]
///     name: Option<String>,
/// }
///
/// let row = ResultRow::from(vec![
///     ResultRowEntry::new("id", PgValue::Int8(1)),
///     ResultRowEntry::new("display_name", PgValue::Null),
/// ]);
/// let user = User::from_row(&row)?;
/// assert_eq!(user.id, 1);
/// assert_eq!(user.name, None);
/// # Ok::<(), pgquery::ValueExtractionError>(())
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &ResultRow) -> Result<Self, ValueExtractionError>;
}

impl FromRow for ResultRow {
    fn from_row(row: &ResultRow) -> Result<Self, ValueExtractionError> {
        Ok(row.clone())
    }
}

macro_rules! impl_from_row_tuple {
    ($($name:ident : $idx:tt),+) => {
        impl<$($name: TryGetable),+> FromRow for ($($name,)+) {
            fn from_row(row: &ResultRow) -> Result<Self, ValueExtractionError> {
                Ok(($(row.try_get::<$name, usize>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A: 0);
impl_from_row_tuple!(A: 0, B: 1);
impl_from_row_tuple!(A: 0, B: 1, C: 2);
impl_from_row_tuple!(A: 0, B: 1, C: 2, D: 3);
