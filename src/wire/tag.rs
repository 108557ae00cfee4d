//! One-byte discriminants for tagged values on the wire.

use std::fmt;

use crate::value::PgValue;

/// Every encoded value starts with a tag byte that identifies the
/// [`PgValue`] variant and therefore the layout of its payload.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueTag(u8);

impl ValueTag {
    pub const NULL: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const INT2: Self = Self(2);
    pub const INT4: Self = Self(3);
    pub const INT8: Self = Self(4);
    pub const FLOAT4: Self = Self(5);
    pub const FLOAT8: Self = Self(6);
    pub const NUMERIC: Self = Self(7);
    pub const TEXT: Self = Self(8);
    pub const VARCHAR: Self = Self(9);
    pub const BPCHAR: Self = Self(10);
    pub const BYTEA: Self = Self(11);
    pub const DATE: Self = Self(12);
    pub const TIME: Self = Self(13);
    pub const TIMESTAMP: Self = Self(14);
    pub const TIMESTAMPTZ: Self = Self(15);
    pub const INTERVAL: Self = Self(16);
    pub const UUID: Self = Self(17);
    pub const JSON: Self = Self(18);
    pub const JSONB: Self = Self(19);
    pub const INET: Self = Self(20);
    pub const MACADDR: Self = Self(21);
    pub const POINT: Self = Self(22);
    pub const ARRAY: Self = Self(23);
    pub const HSTORE: Self = Self(24);

    /// Tag for the variant of `value`.
    pub fn of(value: &PgValue) -> Self {
        match value {
            PgValue::Null => Self::NULL,
            PgValue::Bool(_) => Self::BOOL,
            PgValue::Int2(_) => Self::INT2,
            PgValue::Int4(_) => Self::INT4,
            PgValue::Int8(_) => Self::INT8,
            PgValue::Float4(_) => Self::FLOAT4,
            PgValue::Float8(_) => Self::FLOAT8,
            PgValue::Numeric(_) => Self::NUMERIC,
            PgValue::Text(_) => Self::TEXT,
            PgValue::Varchar(_) => Self::VARCHAR,
            PgValue::Bpchar(_) => Self::BPCHAR,
            PgValue::Bytea(_) => Self::BYTEA,
            PgValue::Date(_) => Self::DATE,
            PgValue::Time(_) => Self::TIME,
            PgValue::Timestamp(_) => Self::TIMESTAMP,
            PgValue::TimestampTz(_) => Self::TIMESTAMPTZ,
            PgValue::Interval(_) => Self::INTERVAL,
            PgValue::Uuid(_) => Self::UUID,
            PgValue::Json(_) => Self::JSON,
            PgValue::Jsonb(_) => Self::JSONB,
            PgValue::Inet(_) => Self::INET,
            PgValue::MacAddr(_) => Self::MACADDR,
            PgValue::Point(_, _) => Self::POINT,
            PgValue::Array(_) => Self::ARRAY,
            PgValue::Hstore(_) => Self::HSTORE,
        }
    }

    /// Whether this byte names a known variant in the current interface version.
    pub fn is_known(self) -> bool {
        self.0 <= Self::HSTORE.0
    }
}

impl From<u8> for ValueTag {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl From<ValueTag> for u8 {
    fn from(value: ValueTag) -> Self {
        value.0
    }
}

impl PartialEq<u8> for ValueTag {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            ValueTag::NULL => "Null",
            ValueTag::BOOL => "Bool",
            ValueTag::INT2 => "Int2",
            ValueTag::INT4 => "Int4",
            ValueTag::INT8 => "Int8",
            ValueTag::FLOAT4 => "Float4",
            ValueTag::FLOAT8 => "Float8",
            ValueTag::NUMERIC => "Numeric",
            ValueTag::TEXT => "Text",
            ValueTag::VARCHAR => "Varchar",
            ValueTag::BPCHAR => "Bpchar",
            ValueTag::BYTEA => "Bytea",
            ValueTag::DATE => "Date",
            ValueTag::TIME => "Time",
            ValueTag::TIMESTAMP => "Timestamp",
            ValueTag::TIMESTAMPTZ => "TimestampTz",
            ValueTag::INTERVAL => "Interval",
            ValueTag::UUID => "Uuid",
            ValueTag::JSON => "Json",
            ValueTag::JSONB => "Jsonb",
            ValueTag::INET => "Inet",
            ValueTag::MACADDR => "MacAddr",
            ValueTag::POINT => "Point",
            ValueTag::ARRAY => "Array",
            ValueTag::HSTORE => "Hstore",
            _ => "Unknown",
        };
        write!(f, "{name}({})", self.0)
    }
}

impl fmt::Debug for ValueTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueTag({})", self.0)
    }
}
