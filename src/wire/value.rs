//! Encoding of individual tagged values.
//!
//! ```text
//! +-----+-----------------------------+
//! | tag |  payload (layout per tag)   |
//! +-----+-----------------------------+
//!  1 byte
//! ```
//!
//! Fixed-size scalars are stored inline. Variable-length data is a `u32`
//! little-endian byte length followed by the bytes. Dates and timestamps use
//! the Postgres epoch (2000-01-01) at microsecond resolution.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use bytes::{Buf, BufMut, BytesMut};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike};

use super::tag::ValueTag;
use crate::error::WireError;
use crate::value::{Interval, PgValue};

/// Days between 0001-01-01 (CE day 1) and 2000-01-01.
const PG_EPOCH_DAYS_FROM_CE: i32 = 730_120;
/// Microseconds between the Unix epoch and 2000-01-01T00:00:00Z.
const PG_EPOCH_UNIX_MICROS: i64 = 946_684_800_000_000;
const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Arrays may nest; anything deeper than this is rejected rather than recursed into.
pub(crate) const MAX_NESTING: usize = 32;

pub(crate) fn ensure(buf: &impl Buf, needed: usize) -> Result<(), WireError> {
    if buf.remaining() < needed {
        return Err(WireError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

pub(crate) fn put_len(buf: &mut BytesMut, what: &'static str, len: usize) -> Result<(), WireError> {
    let len = u32::try_from(len).map_err(|_| WireError::TooLong { what, len })?;
    buf.put_u32_le(len);
    Ok(())
}

pub(crate) fn put_bytes(buf: &mut BytesMut, what: &'static str, bytes: &[u8]) -> Result<(), WireError> {
    put_len(buf, what, bytes.len())?;
    buf.put_slice(bytes);
    Ok(())
}

pub(crate) fn put_str(buf: &mut BytesMut, what: &'static str, s: &str) -> Result<(), WireError> {
    put_bytes(buf, what, s.as_bytes())
}

pub(crate) fn get_u8(buf: &mut impl Buf) -> Result<u8, WireError> {
    ensure(buf, 1)?;
    Ok(buf.get_u8())
}

pub(crate) fn get_len(buf: &mut impl Buf) -> Result<usize, WireError> {
    ensure(buf, 4)?;
    Ok(buf.get_u32_le() as usize)
}

pub(crate) fn get_bytes(buf: &mut impl Buf) -> Result<Vec<u8>, WireError> {
    let len = get_len(buf)?;
    ensure(buf, len)?;
    let mut out = vec![0u8; len];
    buf.copy_to_slice(&mut out);
    Ok(out)
}

pub(crate) fn get_string(buf: &mut impl Buf, what: &'static str) -> Result<String, WireError> {
    String::from_utf8(get_bytes(buf)?).map_err(|_| WireError::InvalidUtf8(what))
}

/// Upper bound for a `Vec::with_capacity` driven by a count read off the wire.
pub(crate) fn capacity_hint(count: usize, buf: &impl Buf) -> usize {
    count.min(buf.remaining())
}

fn invalid(what: &'static str, detail: impl Into<String>) -> WireError {
    WireError::InvalidValue {
        what,
        detail: detail.into(),
    }
}

/// Append `value` as `[tag][payload]`.
pub(crate) fn put_value(buf: &mut BytesMut, value: &PgValue) -> Result<(), WireError> {
    put_value_nested(buf, value, 0)
}

fn put_value_nested(buf: &mut BytesMut, value: &PgValue, depth: usize) -> Result<(), WireError> {
    if depth > MAX_NESTING {
        return Err(invalid("array", format!("nesting deeper than {MAX_NESTING}")));
    }
    buf.put_u8(ValueTag::of(value).into());
    match value {
        PgValue::Null => {}
        PgValue::Bool(v) => buf.put_u8(u8::from(*v)),
        PgValue::Int2(v) => buf.put_i16_le(*v),
        PgValue::Int4(v) => buf.put_i32_le(*v),
        PgValue::Int8(v) => buf.put_i64_le(*v),
        PgValue::Float4(v) => buf.put_u32_le(v.to_bits()),
        PgValue::Float8(v) => buf.put_u64_le(v.to_bits()),
        PgValue::Numeric(s) => put_str(buf, "numeric", s)?,
        PgValue::Text(s) => put_str(buf, "text", s)?,
        PgValue::Varchar(s) => put_str(buf, "varchar", s)?,
        PgValue::Bpchar(s) => put_str(buf, "bpchar", s)?,
        PgValue::Bytea(b) => put_bytes(buf, "bytea", b)?,
        PgValue::Date(d) => buf.put_i32_le(d.num_days_from_ce() - PG_EPOCH_DAYS_FROM_CE),
        PgValue::Time(t) => buf.put_i64_le(time_to_micros(t)),
        PgValue::Timestamp(ts) => buf.put_i64_le(datetime_to_micros(&ts.and_utc())),
        PgValue::TimestampTz(ts) => buf.put_i64_le(datetime_to_micros(ts)),
        PgValue::Interval(iv) => {
            buf.put_i32_le(iv.months);
            buf.put_i32_le(iv.days);
            buf.put_i64_le(iv.microseconds);
        }
        PgValue::Uuid(u) => buf.put_slice(u.as_bytes()),
        PgValue::Json(j) | PgValue::Jsonb(j) => {
            let text = serde_json::to_string(j).map_err(|e| invalid("json", e.to_string()))?;
            put_str(buf, "json", &text)?;
        }
        PgValue::Inet(IpAddr::V4(a)) => {
            buf.put_u8(4);
            buf.put_slice(&a.octets());
        }
        PgValue::Inet(IpAddr::V6(a)) => {
            buf.put_u8(6);
            buf.put_slice(&a.octets());
        }
        PgValue::MacAddr(m) => buf.put_slice(m),
        PgValue::Point(x, y) => {
            buf.put_u64_le(x.to_bits());
            buf.put_u64_le(y.to_bits());
        }
        PgValue::Array(items) => {
            put_len(buf, "array", items.len())?;
            for item in items {
                put_value_nested(buf, item, depth + 1)?;
            }
        }
        PgValue::Hstore(pairs) => {
            put_len(buf, "hstore", pairs.len())?;
            for (key, val) in pairs {
                put_str(buf, "hstore key", key)?;
                match val {
                    Some(v) => {
                        buf.put_u8(1);
                        put_str(buf, "hstore value", v)?;
                    }
                    None => buf.put_u8(0),
                }
            }
        }
    }
    Ok(())
}

/// Read one `[tag][payload]` value.
pub(crate) fn get_value(buf: &mut impl Buf) -> Result<PgValue, WireError> {
    get_value_nested(buf, 0)
}

fn get_value_nested(buf: &mut impl Buf, depth: usize) -> Result<PgValue, WireError> {
    if depth > MAX_NESTING {
        return Err(invalid("array", format!("nesting deeper than {MAX_NESTING}")));
    }
    let tag = ValueTag::from(get_u8(buf)?);
    let value = match tag {
        ValueTag::NULL => PgValue::Null,
        ValueTag::BOOL => match get_u8(buf)? {
            0 => PgValue::Bool(false),
            1 => PgValue::Bool(true),
            other => return Err(invalid("bool", format!("byte {other}"))),
        },
        ValueTag::INT2 => {
            ensure(buf, 2)?;
            PgValue::Int2(buf.get_i16_le())
        }
        ValueTag::INT4 => {
            ensure(buf, 4)?;
            PgValue::Int4(buf.get_i32_le())
        }
        ValueTag::INT8 => {
            ensure(buf, 8)?;
            PgValue::Int8(buf.get_i64_le())
        }
        ValueTag::FLOAT4 => {
            ensure(buf, 4)?;
            PgValue::Float4(f32::from_bits(buf.get_u32_le()))
        }
        ValueTag::FLOAT8 => {
            ensure(buf, 8)?;
            PgValue::Float8(f64::from_bits(buf.get_u64_le()))
        }
        ValueTag::NUMERIC => PgValue::Numeric(get_string(buf, "numeric")?),
        ValueTag::TEXT => PgValue::Text(get_string(buf, "text")?),
        ValueTag::VARCHAR => PgValue::Varchar(get_string(buf, "varchar")?),
        ValueTag::BPCHAR => PgValue::Bpchar(get_string(buf, "bpchar")?),
        ValueTag::BYTEA => PgValue::Bytea(get_bytes(buf)?),
        ValueTag::DATE => {
            ensure(buf, 4)?;
            let days = buf.get_i32_le();
            let date = days
                .checked_add(PG_EPOCH_DAYS_FROM_CE)
                .and_then(NaiveDate::from_num_days_from_ce_opt)
                .ok_or_else(|| invalid("date", format!("{days} days from epoch")))?;
            PgValue::Date(date)
        }
        ValueTag::TIME => {
            ensure(buf, 8)?;
            PgValue::Time(micros_to_time(buf.get_i64_le())?)
        }
        ValueTag::TIMESTAMP => {
            ensure(buf, 8)?;
            PgValue::Timestamp(micros_to_datetime(buf.get_i64_le(), "timestamp")?.naive_utc())
        }
        ValueTag::TIMESTAMPTZ => {
            ensure(buf, 8)?;
            PgValue::TimestampTz(micros_to_datetime(buf.get_i64_le(), "timestamptz")?)
        }
        ValueTag::INTERVAL => {
            ensure(buf, 16)?;
            let months = buf.get_i32_le();
            let days = buf.get_i32_le();
            let microseconds = buf.get_i64_le();
            PgValue::Interval(Interval::new(months, days, microseconds))
        }
        ValueTag::UUID => {
            ensure(buf, 16)?;
            let mut raw = [0u8; 16];
            buf.copy_to_slice(&mut raw);
            PgValue::Uuid(uuid::Uuid::from_bytes(raw))
        }
        ValueTag::JSON => PgValue::Json(get_json(buf)?),
        ValueTag::JSONB => PgValue::Jsonb(get_json(buf)?),
        ValueTag::INET => match get_u8(buf)? {
            4 => {
                ensure(buf, 4)?;
                let mut raw = [0u8; 4];
                buf.copy_to_slice(&mut raw);
                PgValue::Inet(IpAddr::V4(Ipv4Addr::from(raw)))
            }
            6 => {
                ensure(buf, 16)?;
                let mut raw = [0u8; 16];
                buf.copy_to_slice(&mut raw);
                PgValue::Inet(IpAddr::V6(Ipv6Addr::from(raw)))
            }
            other => return Err(invalid("inet", format!("address family {other}"))),
        },
        ValueTag::MACADDR => {
            ensure(buf, 6)?;
            let mut raw = [0u8; 6];
            buf.copy_to_slice(&mut raw);
            PgValue::MacAddr(raw)
        }
        ValueTag::POINT => {
            ensure(buf, 16)?;
            let x = f64::from_bits(buf.get_u64_le());
            let y = f64::from_bits(buf.get_u64_le());
            PgValue::Point(x, y)
        }
        ValueTag::ARRAY => {
            let count = get_len(buf)?;
            let mut items = Vec::with_capacity(capacity_hint(count, buf));
            for _ in 0..count {
                items.push(get_value_nested(buf, depth + 1)?);
            }
            PgValue::Array(items)
        }
        ValueTag::HSTORE => {
            let count = get_len(buf)?;
            let mut pairs = Vec::with_capacity(capacity_hint(count, buf));
            for _ in 0..count {
                let key = get_string(buf, "hstore key")?;
                let val = match get_u8(buf)? {
                    0 => None,
                    1 => Some(get_string(buf, "hstore value")?),
                    other => return Err(invalid("hstore", format!("presence byte {other}"))),
                };
                pairs.push((key, val));
            }
            PgValue::Hstore(pairs)
        }
        unknown => return Err(WireError::UnknownTag(unknown.into())),
    };
    Ok(value)
}

fn get_json(buf: &mut impl Buf) -> Result<serde_json::Value, WireError> {
    let text = get_string(buf, "json")?;
    serde_json::from_str(&text).map_err(|e| invalid("json", e.to_string()))
}

/// Sub-second microseconds, with chrono's leap second (nanos >= 1e9) pinned to
/// the last microsecond of the second so it never rolls into the next one.
fn subsec_micros(nanos: u32) -> i64 {
    i64::from(nanos / 1_000).min(999_999)
}

fn time_to_micros(t: &NaiveTime) -> i64 {
    i64::from(t.num_seconds_from_midnight()) * 1_000_000 + subsec_micros(t.nanosecond())
}

fn datetime_to_micros(ts: &DateTime<chrono::Utc>) -> i64 {
    ts.timestamp() * 1_000_000 + subsec_micros(ts.timestamp_subsec_nanos()) - PG_EPOCH_UNIX_MICROS
}

fn micros_to_time(micros: i64) -> Result<NaiveTime, WireError> {
    if !(0..MICROS_PER_DAY).contains(&micros) {
        return Err(invalid("time", format!("{micros} us from midnight")));
    }
    let secs = (micros / 1_000_000) as u32;
    let nanos = (micros % 1_000_000) as u32 * 1_000;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
        .ok_or_else(|| invalid("time", format!("{micros} us from midnight")))
}

fn micros_to_datetime(micros: i64, what: &'static str) -> Result<DateTime<chrono::Utc>, WireError> {
    micros
        .checked_add(PG_EPOCH_UNIX_MICROS)
        .and_then(DateTime::from_timestamp_micros)
        .ok_or_else(|| invalid(what, format!("{micros} us from epoch")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDateTime, TimeZone, Utc};

    fn roundtrip(value: PgValue) -> PgValue {
        let mut buf = BytesMut::new();
        put_value(&mut buf, &value).unwrap();
        let mut bytes = buf.freeze();
        let decoded = get_value(&mut bytes).unwrap();
        assert_eq!(bytes.remaining(), 0, "decoder left bytes behind");
        decoded
    }

    #[test]
    fn test_scalar_layout_is_inline() {
        let mut buf = BytesMut::new();
        put_value(&mut buf, &PgValue::Int4(1)).unwrap();
        assert_eq!(&buf[..], &[3, 1, 0, 0, 0]);

        let mut buf = BytesMut::new();
        put_value(&mut buf, &PgValue::Text("hi".into())).unwrap();
        assert_eq!(&buf[..], &[8, 2, 0, 0, 0, b'h', b'i']);
    }

    #[test]
    fn test_date_uses_postgres_epoch() {
        let epoch = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        let mut buf = BytesMut::new();
        put_value(&mut buf, &PgValue::Date(epoch)).unwrap();
        assert_eq!(&buf[..], &[12, 0, 0, 0, 0]);

        let before = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(roundtrip(PgValue::Date(before)), PgValue::Date(before));
    }

    #[test]
    fn test_timestamp_at_epoch_is_zero() {
        let epoch = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let mut buf = BytesMut::new();
        put_value(&mut buf, &PgValue::TimestampTz(epoch)).unwrap();
        assert_eq!(&buf[1..], &0i64.to_le_bytes());
    }

    #[test]
    fn test_temporal_roundtrip_keeps_microseconds() {
        let ts = NaiveDateTime::parse_from_str("1987-06-05 04:03:02.123456", "%Y-%m-%d %H:%M:%S%.f")
            .unwrap();
        assert_eq!(roundtrip(PgValue::Timestamp(ts)), PgValue::Timestamp(ts));

        let t = NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap();
        assert_eq!(roundtrip(PgValue::Time(t)), PgValue::Time(t));
    }

    #[test]
    fn test_leap_second_stays_in_its_second() {
        let t = NaiveTime::from_hms_milli_opt(23, 59, 59, 1_500).unwrap();
        let mut buf = BytesMut::new();
        put_value(&mut buf, &PgValue::Time(t)).unwrap();
        assert_eq!(&buf[1..], &(MICROS_PER_DAY - 1).to_le_bytes());
        assert_eq!(
            roundtrip(PgValue::Time(t)),
            PgValue::Time(NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap())
        );

        let leap = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 1_500)
            .unwrap();
        let last = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_micro_opt(23, 59, 59, 999_999)
            .unwrap();
        assert_eq!(roundtrip(PgValue::Timestamp(leap)), PgValue::Timestamp(last));
        assert_eq!(
            roundtrip(PgValue::TimestampTz(leap.and_utc())),
            PgValue::TimestampTz(last.and_utc())
        );
    }

    #[test]
    fn test_nested_array_roundtrip() {
        let value = PgValue::Array(vec![
            PgValue::Array(vec![PgValue::Int8(1), PgValue::Null]),
            PgValue::Array(vec![]),
        ]);
        assert_eq!(roundtrip(value.clone()), value);
    }

    #[test]
    fn test_inet_both_families() {
        let v4 = PgValue::Inet("10.0.0.1".parse().unwrap());
        let v6 = PgValue::Inet("::1".parse().unwrap());
        assert_eq!(roundtrip(v4.clone()), v4);
        assert_eq!(roundtrip(v6.clone()), v6);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let mut bytes = bytes::Bytes::from_static(&[0xee]);
        assert_eq!(get_value(&mut bytes), Err(WireError::UnknownTag(0xee)));
    }

    #[test]
    fn test_truncated_payload_rejected() {
        let mut bytes = bytes::Bytes::from_static(&[4, 1, 2, 3]);
        assert_eq!(
            get_value(&mut bytes),
            Err(WireError::UnexpectedEof {
                needed: 8,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let mut bytes = bytes::Bytes::from_static(&[8, 1, 0, 0, 0, 0xff]);
        assert_eq!(get_value(&mut bytes), Err(WireError::InvalidUtf8("text")));
    }

    #[test]
    fn test_bad_bool_byte_rejected() {
        let mut bytes = bytes::Bytes::from_static(&[1, 2]);
        assert!(matches!(
            get_value(&mut bytes),
            Err(WireError::InvalidValue { what: "bool", .. })
        ));
    }

    #[test]
    fn test_excessive_nesting_rejected() {
        let mut value = PgValue::Null;
        for _ in 0..=MAX_NESTING + 1 {
            value = PgValue::Array(vec![value]);
        }
        let mut buf = BytesMut::new();
        assert!(put_value(&mut buf, &value).is_err());
    }

    #[test]
    fn test_huge_count_does_not_preallocate() {
        // array claiming u32::MAX items with nothing behind it
        let mut bytes = bytes::Bytes::from_static(&[23, 0xff, 0xff, 0xff, 0xff]);
        assert!(matches!(
            get_value(&mut bytes),
            Err(WireError::UnexpectedEof { .. })
        ));
    }
}
