//! # pgquery
//!
//! Guest-side binding for the `postgres/query` capability.
//!
//! A sandboxed component hands a query and an ordered list of [`PgValue`]
//! parameters to [`QueryMarshaller`], which copies them into a flat wire buffer,
//! crosses the isolation boundary through a [`Boundary`] implementation and
//! decodes the host's tagged reply into owned [`ResultRow`]s or a
//! [`QueryError`]. The host side (database, pooling, deadlines) is not part of
//! this crate.
//!
//! ```
//! use pgquery::{params, MockHost, PgQuery, PgValue, QueryMarshaller, ResultRow, ResultRowEntry};
//!
//! let host = MockHost::new().append_query_results(vec![vec![ResultRow::from(vec![
//!     ResultRowEntry::new("?column?", PgValue::Int4(1)),
//! ])]]);
//! let db = QueryMarshaller::new(host);
//!
//! let rows = db.query("SELECT $1::int4", &params![1i32])?;
//! assert_eq!(rows[0].try_get::<i32, _>(0)?, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Lets `#[derive(FromRow)]` expansions name `::pgquery` inside this crate's own tests.
extern crate self as pgquery;

pub mod config;
pub mod error;
pub mod executor;
pub mod instrument;
mod macros;
#[cfg(feature = "mock")]
pub mod mock;
pub mod raw_sql;
pub mod row;
pub mod transport;
pub mod value;
pub mod wire;

pub use config::MarshallerConfig;
pub use error::{QueryError, QueryErrorKind, TransportError, WireError};
pub use executor::{PgQuery, QueryMarshaller};
#[cfg(feature = "mock")]
pub use mock::{MockHost, RecordedCall};
pub use raw_sql::{execute_batch, query_all, query_as, query_one, query_opt, query_value};
pub use row::{ColumnIndex, FromRow, ResultRow, ResultRowEntry};
#[cfg(target_arch = "wasm32")]
pub use transport::ImportBoundary;
pub use transport::Boundary;
pub use value::{
    Interval, IntoPgValue, PgValue, TryGetable, TryGetableMany, ValueExtractionError,
};
pub use wire::{ParamBuffer, ResponseBuffer, INTERFACE_ID, INTERFACE_VERSION};

pub use pgquery_derive::FromRow;
