//! Tagged result frames.
//!
//! ```text
//! +---------+--------------+---------------------------+
//! | version | discriminant |          payload          |
//! +---------+--------------+---------------------------+
//!   1 byte    1 byte (0 ok, 1 err)
//!
//! rows ok:  [u32 rows]( [u32 columns]( [str name][value] )* )*
//! batch ok: (empty)
//! err:      [u8 kind][str message]
//! ```
//!
//! Exactly one discriminant is present and the payload must be consumed to
//! the last byte; anything else is a protocol failure.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::value::{capacity_hint, get_len, get_string, get_u8, get_value, put_len, put_str, put_value};
use super::WIRE_VERSION;
use crate::error::{QueryError, QueryErrorKind, WireError};
use crate::row::{ResultRow, ResultRowEntry};

const OK: u8 = 0;
const ERR: u8 = 1;

fn put_header(buf: &mut BytesMut, discriminant: u8) {
    buf.put_u8(WIRE_VERSION);
    buf.put_u8(discriminant);
}

fn put_error(buf: &mut BytesMut, err: &QueryError) -> Result<(), WireError> {
    put_header(buf, ERR);
    buf.put_u8(err.kind.to_wire());
    put_str(buf, "error message", &err.message)
}

pub(crate) fn encode_rows(result: &Result<Vec<ResultRow>, QueryError>) -> Result<Bytes, WireError> {
    let mut buf = BytesMut::new();
    match result {
        Ok(rows) => {
            put_header(&mut buf, OK);
            put_len(&mut buf, "row count", rows.len())?;
            for row in rows {
                put_len(&mut buf, "column count", row.len())?;
                for entry in row.entries() {
                    put_str(&mut buf, "column name", &entry.column_name)?;
                    put_value(&mut buf, &entry.value)?;
                }
            }
        }
        Err(err) => put_error(&mut buf, err)?,
    }
    Ok(buf.freeze())
}

pub(crate) fn encode_unit(result: &Result<(), QueryError>) -> Result<Bytes, WireError> {
    let mut buf = BytesMut::new();
    match result {
        Ok(()) => put_header(&mut buf, OK),
        Err(err) => put_error(&mut buf, err)?,
    }
    Ok(buf.freeze())
}

/// Read the header and, for the error arm, the error payload.
///
/// Returns `Ok(Ok(()))` when the caller should go on to read a success payload.
fn read_header(buf: &mut Bytes) -> Result<Result<(), QueryError>, WireError> {
    let version = get_u8(buf)?;
    if version != WIRE_VERSION {
        return Err(WireError::VersionMismatch {
            expected: WIRE_VERSION,
            found: version,
        });
    }
    match get_u8(buf)? {
        OK => Ok(Ok(())),
        ERR => {
            let code = get_u8(buf)?;
            let kind = QueryErrorKind::from_wire(code).ok_or(WireError::UnknownErrorKind(code))?;
            let message = get_string(buf, "error message")?;
            finish(buf)?;
            Ok(Err(QueryError { kind, message }))
        }
        other => Err(WireError::InvalidDiscriminant(other)),
    }
}

fn finish(buf: &Bytes) -> Result<(), WireError> {
    match buf.remaining() {
        0 => Ok(()),
        n => Err(WireError::TrailingBytes(n)),
    }
}

pub(crate) fn decode_rows(mut buf: Bytes) -> Result<Result<Vec<ResultRow>, QueryError>, WireError> {
    if let Err(err) = read_header(&mut buf)? {
        return Ok(Err(err));
    }
    let row_count = get_len(&mut buf)?;
    let mut rows = Vec::with_capacity(capacity_hint(row_count, &buf));
    for _ in 0..row_count {
        let col_count = get_len(&mut buf)?;
        let mut entries = Vec::with_capacity(capacity_hint(col_count, &buf));
        for _ in 0..col_count {
            let column_name = get_string(&mut buf, "column name")?;
            let value = get_value(&mut buf)?;
            entries.push(ResultRowEntry { column_name, value });
        }
        rows.push(ResultRow::new(entries));
    }
    finish(&buf)?;
    Ok(Ok(rows))
}

pub(crate) fn decode_unit(mut buf: Bytes) -> Result<Result<(), QueryError>, WireError> {
    if let Err(err) = read_header(&mut buf)? {
        return Ok(Err(err));
    }
    finish(&buf)?;
    Ok(Ok(()))
}
