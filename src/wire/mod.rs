//! Flat wire representation used across the isolation boundary.
//!
//! Guest and host are compiled independently, so both must agree on this
//! layout byte for byte. The layout is versioned together with the interface
//! ([`INTERFACE_VERSION`]); every buffer starts with [`WIRE_VERSION`] and a
//! buffer carrying any other version is rejected as a protocol failure.
//!
//! The guest only ever builds [`ParamBuffer`]s and consumes
//! [`ResponseBuffer`]s. The host-side halves ([`decode_params`],
//! [`ResponseBuffer::encode_rows`], [`ResponseBuffer::encode_unit`]) live here
//! as well so that a host, or the mock host, speaks exactly the same format.

mod response;
pub mod tag;
mod value;

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{QueryError, WireError};
use crate::row::ResultRow;
use crate::value::PgValue;

pub use tag::ValueTag;

/// Interface name of the capability.
pub const INTERFACE: &str = "pgquery:postgres/query";
/// Version of the interface as a whole. Changing the value space, the row shape
/// or the error taxonomy requires bumping this together with [`WIRE_VERSION`].
pub const INTERFACE_VERSION: &str = "0.1.1-draft";
/// Fully qualified interface id, also used as the wasm import module name.
pub const INTERFACE_ID: &str = "pgquery:postgres/query@0.1.1-draft";
/// First byte of every buffer that crosses the boundary.
pub const WIRE_VERSION: u8 = 1;

/// Encoded, call-scoped copy of a parameter list.
///
/// ```text
/// +---------+-----------+-----------------+
/// | version | u32 count | [tag][payload]* |
/// +---------+-----------+-----------------+
/// ```
///
/// The buffer owns copies of the values; nothing in it points back into caller memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBuffer {
    bytes: Bytes,
    count: usize,
}

impl ParamBuffer {
    /// Encode `params` in order.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::TooLong`] if a value or the list does not fit a `u32`
    /// length, or [`WireError::InvalidValue`] for values that cannot be encoded.
    pub fn encode(params: &[PgValue]) -> Result<Self, WireError> {
        let mut buf = BytesMut::with_capacity(5 + params.len() * 9);
        buf.put_u8(WIRE_VERSION);
        value::put_len(&mut buf, "parameter count", params.len())?;
        for param in params {
            value::put_value(&mut buf, param)?;
        }
        Ok(Self {
            bytes: buf.freeze(),
            count: params.len(),
        })
    }

    /// Raw bytes handed to the boundary call.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`: even an empty list carries its header.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of parameters encoded.
    pub fn count(&self) -> usize {
        self.count
    }
}

/// Decode a parameter buffer back into values. Host side of [`ParamBuffer::encode`].
///
/// # Errors
///
/// Returns a [`WireError`] if the buffer is truncated, carries trailing bytes,
/// another wire version, or an unknown value tag.
pub fn decode_params(bytes: &[u8]) -> Result<Vec<PgValue>, WireError> {
    let mut buf = bytes;
    let version = value::get_u8(&mut buf)?;
    if version != WIRE_VERSION {
        return Err(WireError::VersionMismatch {
            expected: WIRE_VERSION,
            found: version,
        });
    }
    let count = value::get_len(&mut buf)?;
    let mut params = Vec::with_capacity(value::capacity_hint(count, &buf));
    for _ in 0..count {
        params.push(value::get_value(&mut buf)?);
    }
    if !buf.is_empty() {
        return Err(WireError::TrailingBytes(buf.len()));
    }
    Ok(params)
}

/// A tagged reply as produced by the host.
///
/// Decoding takes the buffer by value: the reply is handed off once and cannot
/// be read again after the call that received it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseBuffer {
    bytes: Bytes,
}

impl ResponseBuffer {
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Host side: encode the outcome of `query`.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if a value or a length does not fit the format.
    pub fn encode_rows(result: &Result<Vec<ResultRow>, QueryError>) -> Result<Self, WireError> {
        response::encode_rows(result).map(|bytes| Self { bytes })
    }

    /// Host side: encode the outcome of `query-batch`.
    ///
    /// # Errors
    ///
    /// Returns a [`WireError`] if the error message does not fit the format.
    pub fn encode_unit(result: &Result<(), QueryError>) -> Result<Self, WireError> {
        response::encode_unit(result).map(|bytes| Self { bytes })
    }

    /// Decode a `query` reply into rows or the host's error.
    ///
    /// # Errors
    ///
    /// The outer error is a malformed buffer; the inner one is the host's answer.
    pub fn into_rows(self) -> Result<Result<Vec<ResultRow>, QueryError>, WireError> {
        response::decode_rows(self.bytes)
    }

    /// Decode a `query-batch` reply.
    ///
    /// # Errors
    ///
    /// The outer error is a malformed buffer; the inner one is the host's answer.
    pub fn into_unit(self) -> Result<Result<(), QueryError>, WireError> {
        response::decode_unit(self.bytes)
    }
}
