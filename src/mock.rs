//! Scripted host for tests.
//!
//! [`MockHost`] implements [`Boundary`] by replaying queued outcomes in order,
//! encoding each one with the real wire format. It records every call it sees
//! (operation, statement text and decoded parameters) so tests can assert on
//! what crossed the boundary.
//!
//! ```
//! use pgquery::{params, MockHost, PgQuery, PgValue, QueryError, QueryMarshaller};
//!
//! let host = MockHost::new()
//!     .append_query_errors(vec![QueryError::statement("relation not found")]);
//! let db = QueryMarshaller::new(&host);
//!
//! let err = db.query("SELECT * FROM missing WHERE id = $1", &params![7i32]).unwrap_err();
//! assert_eq!(err.message, "relation not found");
//! assert_eq!(host.calls()[0].params, vec![PgValue::Int4(7)]);
//! ```

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use crate::error::{QueryError, TransportError};
use crate::row::ResultRow;
use crate::transport::Boundary;
use crate::value::PgValue;
use crate::wire::{decode_params, ParamBuffer, ResponseBuffer};

/// One call observed by a [`MockHost`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// `"query"` or `"query-batch"`.
    pub operation: &'static str,
    pub query: String,
    /// Decoded parameters. Always empty for `query-batch`.
    pub params: Vec<PgValue>,
}

#[derive(Debug)]
enum Scripted {
    Rows(Result<Vec<ResultRow>, QueryError>),
    Unit(Result<(), QueryError>),
    Transport(String),
    Raw(ResponseBuffer),
}

/// In-memory stand-in for the host side of the capability.
#[derive(Debug, Default)]
pub struct MockHost {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
    check_placeholders: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, outcome: Scripted) -> Self {
        self.script
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    /// Queue one successful `query` reply per entry.
    pub fn append_query_results(self, results: Vec<Vec<ResultRow>>) -> Self {
        results
            .into_iter()
            .fold(self, |host, rows| host.push(Scripted::Rows(Ok(rows))))
    }

    /// Queue one failed `query` reply per entry.
    pub fn append_query_errors(self, errors: Vec<QueryError>) -> Self {
        errors
            .into_iter()
            .fold(self, |host, err| host.push(Scripted::Rows(Err(err))))
    }

    /// Queue one successful `query-batch` reply.
    pub fn append_batch_ok(self) -> Self {
        self.push(Scripted::Unit(Ok(())))
    }

    /// Queue one failed `query-batch` reply per entry.
    pub fn append_batch_errors(self, errors: Vec<QueryError>) -> Self {
        errors
            .into_iter()
            .fold(self, |host, err| host.push(Scripted::Unit(Err(err))))
    }

    /// Queue a call that never produces a reply.
    pub fn append_transport_failure(self, reason: impl Into<String>) -> Self {
        self.push(Scripted::Transport(reason.into()))
    }

    /// Queue an arbitrary reply buffer, answered verbatim to the next call of
    /// either operation.
    pub fn append_raw_response(self, response: ResponseBuffer) -> Self {
        self.push(Scripted::Raw(response))
    }

    /// Reject `query` calls whose highest `$n` placeholder does not match the
    /// parameter count, as the database would. A rejected call does not consume
    /// a queued outcome.
    pub fn check_placeholders(mut self) -> Self {
        self.check_placeholders = true;
        self
    }

    /// Calls observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of queued outcomes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn record(&self, operation: &'static str, query: &[u8], params: Vec<PgValue>) -> String {
        let query = String::from_utf8_lossy(query).into_owned();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                operation,
                query: query.clone(),
                params,
            });
        query
    }

    fn next(&self) -> Option<Scripted> {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Highest `$n` placeholder in `query`, ignoring quoting.
fn highest_placeholder(query: &str) -> usize {
    let bytes = query.as_bytes();
    let mut highest = 0;
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if let Ok(n) = query[start..end].parse::<usize>() {
                highest = highest.max(n);
            }
            i = end.max(start);
        } else {
            i += 1;
        }
    }
    highest
}

fn encode_rows(result: &Result<Vec<ResultRow>, QueryError>) -> Result<ResponseBuffer, TransportError> {
    ResponseBuffer::encode_rows(result)
        .map_err(|e| TransportError(format!("mock host could not encode reply: {e}")))
}

fn encode_unit(result: &Result<(), QueryError>) -> Result<ResponseBuffer, TransportError> {
    ResponseBuffer::encode_unit(result)
        .map_err(|e| TransportError(format!("mock host could not encode reply: {e}")))
}

impl Boundary for MockHost {
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError> {
        let decoded = match decode_params(params.as_bytes()) {
            Ok(values) => values,
            Err(e) => {
                self.record("query", query, Vec::new());
                return encode_rows(&Err(QueryError::invalid_params(e.to_string())));
            }
        };
        let param_count = decoded.len();
        let query = self.record("query", query, decoded);

        if self.check_placeholders {
            let expected = highest_placeholder(&query);
            if expected != param_count {
                return encode_rows(&Err(QueryError::invalid_params(format!(
                    "query expects {expected} parameters but {param_count} were supplied"
                ))));
            }
        }

        match self.next() {
            Some(Scripted::Rows(result)) => encode_rows(&result),
            Some(Scripted::Transport(reason)) => Err(TransportError(reason)),
            Some(Scripted::Raw(response)) => Ok(response),
            Some(Scripted::Unit(_)) => encode_rows(&Err(QueryError::unexpected(
                "mock host: next scripted outcome is for query-batch",
            ))),
            None => encode_rows(&Err(QueryError::unexpected(
                "mock host: no scripted outcome left for query",
            ))),
        }
    }

    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError> {
        self.record("query-batch", query, Vec::new());

        match self.next() {
            Some(Scripted::Unit(result)) => encode_unit(&result),
            Some(Scripted::Transport(reason)) => Err(TransportError(reason)),
            Some(Scripted::Raw(response)) => Ok(response),
            Some(Scripted::Rows(_)) => encode_unit(&Err(QueryError::unexpected(
                "mock host: next scripted outcome is for query",
            ))),
            None => encode_unit(&Err(QueryError::unexpected(
                "mock host: no scripted outcome left for query-batch",
            ))),
        }
    }
}
