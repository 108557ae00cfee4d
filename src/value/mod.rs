//! Value type system for pgquery
//!
//! [`PgValue`] is the single value space shared by query parameters and
//! decoded column values. The conversion traits map Rust types into and out
//! of it.
//!
//! ## Traits
//!
//! - **`IntoPgValue`** - Maps Rust types to their corresponding `PgValue` variant
//! - **`TryGetable`** - Safe value extraction with error handling
//! - **`TryGetableMany`** - Extract multiple values from collections

pub mod try_getable;
pub mod types;


use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

pub use try_getable::{TryGetable, TryGetableMany, ValueExtractionError};
pub use types::IntoPgValue;

/// A Postgres `interval`, stored the way the server stores it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Interval {
    pub months: i32,
    pub days: i32,
    pub microseconds: i64,
}

impl Interval {
    pub fn new(months: i32, days: i32, microseconds: i64) -> Self {
        Self {
            months,
            days,
            microseconds,
        }
    }
}

/// A single value that can be bound as a parameter or returned in a column.
///
/// The set of variants is closed and versioned together with the interface:
/// every codec in this crate matches it exhaustively, so a new variant
/// cannot be silently dropped on either side of the boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum PgValue {
    Null,
    Bool(bool),
    Int2(i16),
    Int4(i32),
    Int8(i64),
    Float4(f32),
    Float8(f64),
    /// `numeric` / `decimal`, kept as text so no precision is lost.
    Numeric(String),
    Text(String),
    Varchar(String),
    /// Blank-padded `char(n)`.
    Bpchar(String),
    Bytea(Vec<u8>),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    Interval(Interval),
    Uuid(uuid::Uuid),
    Json(serde_json::Value),
    Jsonb(serde_json::Value),
    Inet(IpAddr),
    MacAddr([u8; 6]),
    Point(f64, f64),
    Array(Vec<PgValue>),
    Hstore(Vec<(String, Option<String>)>),
}

impl PgValue {
    /// Postgres type name of this value, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            PgValue::Null => "null",
            PgValue::Bool(_) => "bool",
            PgValue::Int2(_) => "int2",
            PgValue::Int4(_) => "int4",
            PgValue::Int8(_) => "int8",
            PgValue::Float4(_) => "float4",
            PgValue::Float8(_) => "float8",
            PgValue::Numeric(_) => "numeric",
            PgValue::Text(_) => "text",
            PgValue::Varchar(_) => "varchar",
            PgValue::Bpchar(_) => "bpchar",
            PgValue::Bytea(_) => "bytea",
            PgValue::Date(_) => "date",
            PgValue::Time(_) => "time",
            PgValue::Timestamp(_) => "timestamp",
            PgValue::TimestampTz(_) => "timestamptz",
            PgValue::Interval(_) => "interval",
            PgValue::Uuid(_) => "uuid",
            PgValue::Json(_) => "json",
            PgValue::Jsonb(_) => "jsonb",
            PgValue::Inet(_) => "inet",
            PgValue::MacAddr(_) => "macaddr",
            PgValue::Point(_, _) => "point",
            PgValue::Array(_) => "array",
            PgValue::Hstore(_) => "hstore",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PgValue::Null)
    }
}

impl fmt::Display for PgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgValue::Null => write!(f, "NULL"),
            PgValue::Bool(v) => write!(f, "{v}"),
            PgValue::Int2(v) => write!(f, "{v}"),
            PgValue::Int4(v) => write!(f, "{v}"),
            PgValue::Int8(v) => write!(f, "{v}"),
            PgValue::Float4(v) => write!(f, "{v}"),
            PgValue::Float8(v) => write!(f, "{v}"),
            PgValue::Numeric(v) | PgValue::Text(v) | PgValue::Varchar(v) | PgValue::Bpchar(v) => {
                write!(f, "{v}")
            }
            PgValue::Bytea(v) => write!(f, "<{} bytes>", v.len()),
            PgValue::Date(v) => write!(f, "{v}"),
            PgValue::Time(v) => write!(f, "{v}"),
            PgValue::Timestamp(v) => write!(f, "{v}"),
            PgValue::TimestampTz(v) => write!(f, "{}", v.to_rfc3339()),
            PgValue::Interval(v) => write!(
                f,
                "{} mons {} days {} us",
                v.months, v.days, v.microseconds
            ),
            PgValue::Uuid(v) => write!(f, "{v}"),
            PgValue::Json(v) | PgValue::Jsonb(v) => write!(f, "{v}"),
            PgValue::Inet(v) => write!(f, "{v}"),
            PgValue::MacAddr(m) => write!(
                f,
                "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                m[0], m[1], m[2], m[3], m[4], m[5]
            ),
            PgValue::Point(x, y) => write!(f, "({x},{y})"),
            PgValue::Array(items) => {
                write!(f, "{{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "}}")
            }
            PgValue::Hstore(pairs) => {
                for (i, (k, v)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match v {
                        Some(v) => write!(f, "\"{k}\"=>\"{v}\"")?,
                        None => write!(f, "\"{k}\"=>NULL")?,
                    }
                }
                Ok(())
            }
        }
    }
}
