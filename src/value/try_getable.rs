//! TryGetable and TryGetableMany traits for safe value extraction
//!
//! These traits provide safe, error-aware extraction of values from [`PgValue`]
//! with proper error handling and type checking.

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use super::{Interval, PgValue};

/// Error type for value extraction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueExtractionError {
    /// The value is null
    #[error("Value is null")]
    NullValue,
    /// The value type doesn't match the expected type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },
    /// Value conversion failed (e.g., overflow, invalid format)
    #[error("Conversion error: {0}")]
    ConversionError(String),
    /// The row has no column with this name or index
    #[error("Column not found: {0}")]
    MissingColumn(String),
}

impl ValueExtractionError {
    fn mismatch(expected: &str, actual: &PgValue) -> Self {
        ValueExtractionError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }
}

/// Trait for safe value extraction with error handling
///
/// Returns `Result<T, ValueExtractionError>` instead of `Option<T>`, which
/// distinguishes between null values and type mismatches.
///
/// ## Usage
///
/// ```rust
/// use pgquery::{PgValue, TryGetable, ValueExtractionError};
///
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(PgValue::Int4(42));
/// assert_eq!(result, Ok(42));
///
/// let result: Result<i32, ValueExtractionError> = TryGetable::try_get(PgValue::Null);
/// assert!(matches!(result, Err(ValueExtractionError::NullValue)));
/// ```
pub trait TryGetable: Sized {
    /// Try to extract a value from a `PgValue`, returning an error if extraction fails.
    ///
    /// Returns:
    /// - `Ok(T)` if the value matches the expected type and is not null
    /// - `Err(ValueExtractionError::NullValue)` if the value is null
    /// - `Err(ValueExtractionError::TypeMismatch)` if the value type doesn't match
    /// - `Err(ValueExtractionError::ConversionError)` if conversion fails (e.g., overflow)
    fn try_get(value: PgValue) -> Result<Self, ValueExtractionError>;

    /// Try to extract a value, allowing null values to return `None`.
    fn try_get_opt(value: PgValue) -> Result<Option<Self>, ValueExtractionError> {
        match Self::try_get(value) {
            Ok(v) => Ok(Some(v)),
            Err(ValueExtractionError::NullValue) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

macro_rules! impl_try_getable {
    ($type:ty, $expected:expr, $($variant:ident),+) => {
        impl TryGetable for $type {
            fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
                match value {
                    $(PgValue::$variant(v) => Ok(v.into()),)+
                    PgValue::Null => Err(ValueExtractionError::NullValue),
                    other => Err(ValueExtractionError::mismatch($expected, &other)),
                }
            }
        }
    };
}

impl_try_getable!(bool, "bool", Bool);
impl_try_getable!(i16, "int2", Int2);
impl_try_getable!(i32, "int2 or int4", Int2, Int4);
impl_try_getable!(i64, "int2, int4 or int8", Int2, Int4, Int8);
impl_try_getable!(f32, "float4", Float4);
impl_try_getable!(f64, "float4 or float8", Float4, Float8);
impl_try_getable!(String, "text, varchar or bpchar", Text, Varchar, Bpchar);
impl_try_getable!(Vec<u8>, "bytea", Bytea);
impl_try_getable!(NaiveDate, "date", Date);
impl_try_getable!(NaiveTime, "time", Time);
impl_try_getable!(NaiveDateTime, "timestamp", Timestamp);
impl_try_getable!(DateTime<Utc>, "timestamptz", TimestampTz);
impl_try_getable!(Interval, "interval", Interval);
impl_try_getable!(uuid::Uuid, "uuid", Uuid);
impl_try_getable!(serde_json::Value, "json or jsonb", Json, Jsonb);
impl_try_getable!(IpAddr, "inet", Inet);

macro_rules! impl_try_getable_unsigned {
    ($type:ty, $expected:expr, $($variant:ident),+) => {
        impl TryGetable for $type {
            fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
                match value {
                    $(PgValue::$variant(v) => <$type>::try_from(v).map_err(|_| {
                        ValueExtractionError::ConversionError(format!(
                            "{} out of range for {}",
                            v,
                            stringify!($type)
                        ))
                    }),)+
                    PgValue::Null => Err(ValueExtractionError::NullValue),
                    other => Err(ValueExtractionError::mismatch($expected, &other)),
                }
            }
        }
    };
}

impl_try_getable_unsigned!(u8, "int2", Int2);
impl_try_getable_unsigned!(u16, "int2 or int4", Int2, Int4);
impl_try_getable_unsigned!(u32, "int2, int4 or int8", Int2, Int4, Int8);
impl_try_getable_unsigned!(u64, "int2, int4 or int8", Int2, Int4, Int8);

impl TryGetable for Decimal {
    fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
        match value {
            PgValue::Numeric(s) => Decimal::from_str(&s)
                .map_err(|e| ValueExtractionError::ConversionError(format!("numeric {s}: {e}"))),
            PgValue::Int2(v) => Ok(Decimal::from(v)),
            PgValue::Int4(v) => Ok(Decimal::from(v)),
            PgValue::Int8(v) => Ok(Decimal::from(v)),
            PgValue::Null => Err(ValueExtractionError::NullValue),
            other => Err(ValueExtractionError::mismatch("numeric", &other)),
        }
    }
}

impl TryGetable for PgValue {
    fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
        Ok(value)
    }
}

impl<T: TryGetable> TryGetable for Option<T> {
    fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
        match value {
            PgValue::Null => Ok(None),
            other => T::try_get(other).map(Some),
        }
    }
}

impl<T: TryGetable> TryGetable for Vec<T>
where
    T: ArrayElement,
{
    fn try_get(value: PgValue) -> Result<Self, ValueExtractionError> {
        match value {
            PgValue::Array(items) => T::try_get_many(items),
            PgValue::Null => Err(ValueExtractionError::NullValue),
            other => Err(ValueExtractionError::mismatch("array", &other)),
        }
    }
}

/// Marker for types that may be extracted as elements of a Postgres array.
///
/// `u8` is left out so `Vec<u8>` keeps meaning `bytea`.
pub trait ArrayElement: TryGetable {}

impl ArrayElement for bool {}
impl ArrayElement for i16 {}
impl ArrayElement for i32 {}
impl ArrayElement for i64 {}
impl ArrayElement for f32 {}
impl ArrayElement for f64 {}
impl ArrayElement for String {}
impl ArrayElement for uuid::Uuid {}
impl ArrayElement for PgValue {}
impl<T: ArrayElement> ArrayElement for Option<T> {}

/// Trait for extracting multiple values from collections
///
/// ## Usage
///
/// ```rust
/// use pgquery::{PgValue, TryGetableMany};
///
/// let values = vec![PgValue::Int4(1), PgValue::Int4(2), PgValue::Int4(3)];
/// let result: Result<Vec<i32>, _> = TryGetableMany::try_get_many(values);
/// assert_eq!(result, Ok(vec![1, 2, 3]));
/// ```
pub trait TryGetableMany: TryGetable {
    /// Try to extract multiple values, failing on the first value that does not convert.
    fn try_get_many<I>(values: I) -> Result<Vec<Self>, ValueExtractionError>
    where
        I: IntoIterator<Item = PgValue>,
    {
        values.into_iter().map(Self::try_get).collect()
    }
}

impl<T: TryGetable> TryGetableMany for T {}
