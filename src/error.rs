//! Error types for the query capability.
//!
//! Every failure a caller can observe is a [`QueryError`]. The transport and
//! wire errors exist so the marshaller can tell where a failure came from
//! before folding it into the single structured error.

use std::fmt;

/// Category of a [`QueryError`].
///
/// Part of the versioned interface: the wire encodes these as one byte, so the
/// set only changes together with [`crate::INTERFACE_VERSION`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryErrorKind {
    /// The boundary call could not reach the host, or the host's database is unavailable.
    ConnectionFailure,
    /// The database rejected or failed the statement (syntax, missing relation,
    /// constraint violation, type mismatch, ...).
    StatementFailure,
    /// The parameters did not fit the statement (count or type).
    InvalidParams,
    /// Malformed data crossed the boundary. Indicates mismatched interface versions.
    ProtocolFailure,
    /// Anything else.
    Unexpected,
}

impl QueryErrorKind {
    pub(crate) fn to_wire(self) -> u8 {
        match self {
            QueryErrorKind::ConnectionFailure => 0,
            QueryErrorKind::StatementFailure => 1,
            QueryErrorKind::InvalidParams => 2,
            QueryErrorKind::ProtocolFailure => 3,
            QueryErrorKind::Unexpected => 4,
        }
    }

    pub(crate) fn from_wire(code: u8) -> Option<Self> {
        match code {
            0 => Some(QueryErrorKind::ConnectionFailure),
            1 => Some(QueryErrorKind::StatementFailure),
            2 => Some(QueryErrorKind::InvalidParams),
            3 => Some(QueryErrorKind::ProtocolFailure),
            4 => Some(QueryErrorKind::Unexpected),
            _ => None,
        }
    }
}

impl fmt::Display for QueryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryErrorKind::ConnectionFailure => "connection failure",
            QueryErrorKind::StatementFailure => "statement failure",
            QueryErrorKind::InvalidParams => "invalid parameters",
            QueryErrorKind::ProtocolFailure => "protocol failure",
            QueryErrorKind::Unexpected => "unexpected error",
        };
        f.write_str(name)
    }
}

/// The single error shape returned by `query` and `query_batch`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct QueryError {
    pub kind: QueryErrorKind,
    pub message: String,
}

impl QueryError {
    pub fn new(kind: QueryErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::ConnectionFailure, message)
    }

    pub fn statement(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::StatementFailure, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::InvalidParams, message)
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::ProtocolFailure, message)
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(QueryErrorKind::Unexpected, message)
    }
}

/// The boundary call itself failed; no reply was produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("boundary call failed: {0}")]
pub struct TransportError(pub String);

impl From<TransportError> for QueryError {
    fn from(err: TransportError) -> Self {
        QueryError::connection(err.0)
    }
}

/// Malformed data found while decoding a wire buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    #[error("buffer truncated: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof { needed: usize, remaining: usize },
    #[error("wire version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u8, found: u8 },
    #[error("unknown value tag {0:#04x}")]
    UnknownTag(u8),
    #[error("invalid result discriminant {0}")]
    InvalidDiscriminant(u8),
    #[error("unknown error kind {0}")]
    UnknownErrorKind(u8),
    #[error("invalid UTF-8 in {0}")]
    InvalidUtf8(&'static str),
    #[error("invalid {what}: {detail}")]
    InvalidValue { what: &'static str, detail: String },
    #[error("{0} trailing bytes after payload")]
    TrailingBytes(usize),
    #[error("{what} length {len} does not fit the wire format")]
    TooLong { what: &'static str, len: usize },
}

impl From<WireError> for QueryError {
    fn from(err: WireError) -> Self {
        QueryError::protocol(err.to_string())
    }
}
