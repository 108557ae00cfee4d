//! IntoPgValue trait for type-safe parameter binding
//!
//! The `IntoPgValue` trait maps Rust types to their corresponding [`PgValue`]
//! variant so callers can bind native values without spelling out the variant.
//!
//! ## Usage
//!
//! ```rust
//! use pgquery::{IntoPgValue, PgValue};
//!
//! assert_eq!(42i32.into_pg_value(), PgValue::Int4(42));
//! assert_eq!(None::<i64>.into_pg_value(), PgValue::Null);
//! ```
//!
//! ## Implementation
//!
//! The trait is implemented for:
//!
//! - Integer types: `i16`, `i32`, `i64`, and `u8`, `u16`, `u32` widened to the next signed width
//! - Floating point: `f32`, `f64`
//! - Boolean: `bool`
//! - Text: `String`, `&str`
//! - Binary: `Vec<u8>`, `&[u8]`
//! - Date/time: `NaiveDate`, `NaiveTime`, `NaiveDateTime`, `DateTime<Utc>`, [`Interval`]
//! - `Uuid`, `serde_json::Value` (as `jsonb`), `IpAddr`, `rust_decimal::Decimal`
//! - `Option<T>` and `Vec<T>` for all above types

use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use super::{Interval, PgValue};

/// Trait for converting Rust values into a [`PgValue`] parameter.
pub trait IntoPgValue {
    /// Convert this value into its `PgValue` variant.
    fn into_pg_value(self) -> PgValue;
}

macro_rules! impl_into_pg_value {
    ($type:ty, $variant:ident) => {
        impl IntoPgValue for $type {
            fn into_pg_value(self) -> PgValue {
                PgValue::$variant(self)
            }
        }
    };
}

impl_into_pg_value!(bool, Bool);
impl_into_pg_value!(i16, Int2);
impl_into_pg_value!(i32, Int4);
impl_into_pg_value!(i64, Int8);
impl_into_pg_value!(f32, Float4);
impl_into_pg_value!(f64, Float8);
impl_into_pg_value!(String, Text);
impl_into_pg_value!(Vec<u8>, Bytea);
impl_into_pg_value!(NaiveDate, Date);
impl_into_pg_value!(NaiveTime, Time);
impl_into_pg_value!(NaiveDateTime, Timestamp);
impl_into_pg_value!(DateTime<Utc>, TimestampTz);
impl_into_pg_value!(Interval, Interval);
impl_into_pg_value!(uuid::Uuid, Uuid);
impl_into_pg_value!(serde_json::Value, Jsonb);
impl_into_pg_value!(IpAddr, Inet);

// Postgres has no unsigned integers; widen so the full range fits.

impl IntoPgValue for u8 {
    fn into_pg_value(self) -> PgValue {
        PgValue::Int2(i16::from(self))
    }
}

impl IntoPgValue for u16 {
    fn into_pg_value(self) -> PgValue {
        PgValue::Int4(i32::from(self))
    }
}

impl IntoPgValue for u32 {
    fn into_pg_value(self) -> PgValue {
        PgValue::Int8(i64::from(self))
    }
}

impl IntoPgValue for &str {
    fn into_pg_value(self) -> PgValue {
        PgValue::Text(self.to_owned())
    }
}

impl IntoPgValue for &String {
    fn into_pg_value(self) -> PgValue {
        PgValue::Text(self.clone())
    }
}

impl IntoPgValue for &[u8] {
    fn into_pg_value(self) -> PgValue {
        PgValue::Bytea(self.to_vec())
    }
}

impl IntoPgValue for Decimal {
    fn into_pg_value(self) -> PgValue {
        PgValue::Numeric(self.to_string())
    }
}

impl IntoPgValue for PgValue {
    fn into_pg_value(self) -> PgValue {
        self
    }
}

impl<T: IntoPgValue> IntoPgValue for Option<T> {
    fn into_pg_value(self) -> PgValue {
        match self {
            Some(v) => v.into_pg_value(),
            None => PgValue::Null,
        }
    }
}

// `Vec<u8>` already maps to `bytea`, so arrays of bytes go through `PgValue::Array` directly.
macro_rules! impl_into_pg_array {
    ($($type:ty),* $(,)?) => {
        $(
            impl IntoPgValue for Vec<$type> {
                fn into_pg_value(self) -> PgValue {
                    PgValue::Array(self.into_iter().map(IntoPgValue::into_pg_value).collect())
                }
            }
        )*
    };
}

impl_into_pg_array!(bool, i16, i32, i64, f32, f64, String, uuid::Uuid, Option<String>, Option<i32>, Option<i64>);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_into_pg_value() {
        assert_eq!(true.into_pg_value(), PgValue::Bool(true));
        assert_eq!(7i16.into_pg_value(), PgValue::Int2(7));
        assert_eq!(7i32.into_pg_value(), PgValue::Int4(7));
        assert_eq!(7i64.into_pg_value(), PgValue::Int8(7));
        assert_eq!(1.5f64.into_pg_value(), PgValue::Float8(1.5));
        assert_eq!("hi".into_pg_value(), PgValue::Text("hi".to_string()));
    }

    #[test]
    fn test_unsigned_widening() {
        assert_eq!(u8::MAX.into_pg_value(), PgValue::Int2(255));
        assert_eq!(u16::MAX.into_pg_value(), PgValue::Int4(65_535));
        assert_eq!(u32::MAX.into_pg_value(), PgValue::Int8(4_294_967_295));
    }

    #[test]
    fn test_option_none_is_null() {
        assert_eq!(None::<String>.into_pg_value(), PgValue::Null);
        assert_eq!(Some(3i32).into_pg_value(), PgValue::Int4(3));
    }

    #[test]
    fn test_decimal_binds_as_numeric_text() {
        let d = Decimal::new(12345, 2);
        assert_eq!(d.into_pg_value(), PgValue::Numeric("123.45".to_string()));
    }

    #[test]
    fn test_vec_binds_as_array() {
        let v = vec![Some(1i32), None];
        assert_eq!(
            v.into_pg_value(),
            PgValue::Array(vec![PgValue::Int4(1), PgValue::Null])
        );
    }

    #[test]
    fn test_bytes_bind_as_bytea() {
        assert_eq!(vec![1u8, 2].into_pg_value(), PgValue::Bytea(vec![1, 2]));
        assert_eq!(b"ab".as_slice().into_pg_value(), PgValue::Bytea(vec![b'a', b'b']));
    }
}
