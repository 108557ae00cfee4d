//! `PgQuery` and the query marshaller.
//!
//! [`PgQuery`] is what application code programs against. [`QueryMarshaller`]
//! implements it on top of any [`Boundary`]: it encodes the call, crosses the
//! boundary once, and decodes the reply. There is no retry, no cache, no
//! timeout and no cancellation at this layer; each call is one independent
//! request/response.

use std::sync::Arc;

use crate::config::MarshallerConfig;
use crate::error::{QueryError, TransportError, WireError};
use crate::instrument::{loggable_params, loggable_statement};
#[cfg(feature = "tracing")]
use crate::instrument::tracing_helpers;
use crate::row::ResultRow;
use crate::transport::Boundary;
use crate::value::PgValue;
use crate::wire::ParamBuffer;

/// Trait for issuing queries against the database capability
///
/// Abstracts the call site so helpers and application code work with any
/// implementation (the marshaller over a real boundary, a marshaller over the
/// mock host, a reference to either, ...).
///
/// # Examples
///
/// ```
/// use pgquery::{MockHost, PgQuery, QueryMarshaller};
///
/// let db = QueryMarshaller::new(MockHost::new().append_batch_ok());
/// db.query_batch("CREATE TABLE t(x int); INSERT INTO t VALUES (1);")?;
/// # Ok::<(), pgquery::QueryError>(())
/// ```
pub trait PgQuery {
    /// Execute a query and return all rows
    ///
    /// # Arguments
    ///
    /// * `query` - SQL text, non-empty. Placeholders (`$1`, `$2`, ...) bind positionally.
    /// * `params` - Parameters in placeholder order. May be empty.
    ///
    /// # Returns
    ///
    /// Every row of the fully materialized result set. An empty vector is a
    /// successful query that matched nothing, not a failure.
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if the host reports a failure, the host cannot be
    /// reached, or the reply is malformed. No rows are returned alongside an error.
    fn query(&self, query: &str, params: &[PgValue]) -> Result<Vec<ResultRow>, QueryError>;

    /// Execute one or more statements without parameters or results
    ///
    /// # Errors
    ///
    /// Returns `QueryError` if any statement fails. The error does not say which
    /// statement of the batch failed.
    fn query_batch(&self, query: &str) -> Result<(), QueryError>;
}

impl<E: PgQuery + ?Sized> PgQuery for &E {
    fn query(&self, query: &str, params: &[PgValue]) -> Result<Vec<ResultRow>, QueryError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &str) -> Result<(), QueryError> {
        (**self).query_batch(query)
    }
}

impl<E: PgQuery + ?Sized> PgQuery for Box<E> {
    fn query(&self, query: &str, params: &[PgValue]) -> Result<Vec<ResultRow>, QueryError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &str) -> Result<(), QueryError> {
        (**self).query_batch(query)
    }
}

impl<E: PgQuery + ?Sized> PgQuery for Arc<E> {
    fn query(&self, query: &str, params: &[PgValue]) -> Result<Vec<ResultRow>, QueryError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &str) -> Result<(), QueryError> {
        (**self).query_batch(query)
    }
}

/// Guest-side marshaller for the `postgres/query` capability.
///
/// Holds nothing but its boundary and an immutable config, so it is `Send` and
/// `Sync` whenever the boundary is, and concurrent calls share no state.
#[derive(Debug, Clone)]
pub struct QueryMarshaller<B> {
    boundary: B,
    config: MarshallerConfig,
}

impl<B: Boundary> QueryMarshaller<B> {
    /// Create a marshaller with the default config
    pub fn new(boundary: B) -> Self {
        Self::with_config(boundary, MarshallerConfig::default())
    }

    pub fn with_config(boundary: B, config: MarshallerConfig) -> Self {
        Self { boundary, config }
    }

    /// Get a reference to the underlying boundary
    pub fn boundary(&self) -> &B {
        &self.boundary
    }

    pub fn config(&self) -> &MarshallerConfig {
        &self.config
    }

    /// Consume the marshaller and return the underlying boundary
    pub fn into_boundary(self) -> B {
        self.boundary
    }

    fn reject_empty(query: &str) -> Result<(), QueryError> {
        if query.trim().is_empty() {
            return Err(QueryError::statement("empty query"));
        }
        Ok(())
    }

    fn transport_failed(operation: &str, statement: &str, err: TransportError) -> QueryError {
        let err = QueryError::from(err);
        log::warn!("{operation} failed ({statement}): {err}");
        err
    }

    /// Unwrap a decoded reply. Only a reply that could not be decoded is logged
    /// at `error!`; whatever the host reported, `ProtocolFailure` included, is a
    /// `warn!`.
    fn settle<T>(
        operation: &str,
        statement: &str,
        reply: Result<Result<T, QueryError>, WireError>,
    ) -> Result<T, QueryError> {
        match reply {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => {
                log::warn!("{operation} failed ({statement}): {err}");
                Err(err)
            }
            Err(wire) => {
                log::error!("{operation} reply could not be decoded ({statement}): {wire}");
                Err(wire.into())
            }
        }
    }
}

impl<B: Boundary> PgQuery for QueryMarshaller<B> {
    fn query(&self, query: &str, params: &[PgValue]) -> Result<Vec<ResultRow>, QueryError> {
        Self::reject_empty(query)?;
        let statement = loggable_statement(&self.config, query);
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::query_span(&statement, params.len()).entered();
        log::debug!(
            "query: {statement} params={}",
            loggable_params(&self.config, params)
        );

        let buffer = ParamBuffer::encode(params).map_err(|e| {
            let err = QueryError::invalid_params(e.to_string());
            log::warn!("query failed ({statement}): {err}");
            err
        })?;
        let reply = self
            .boundary
            .query(query.as_bytes(), &buffer)
            .map_err(|e| Self::transport_failed("query", &statement, e))?;
        // Parameters never outlive the call.
        drop(buffer);

        let rows = Self::settle("query", &statement, reply.into_rows())?;
        log::debug!("query returned {} rows", rows.len());
        Ok(rows)
    }

    fn query_batch(&self, query: &str) -> Result<(), QueryError> {
        Self::reject_empty(query)?;
        let statement = loggable_statement(&self.config, query);
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::query_batch_span(&statement).entered();
        log::debug!("query_batch: {statement}");

        let reply = self
            .boundary
            .query_batch(query.as_bytes())
            .map_err(|e| Self::transport_failed("query_batch", &statement, e))?;
        Self::settle("query_batch", &statement, reply.into_unit())
    }
}
