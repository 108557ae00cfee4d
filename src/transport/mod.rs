//! The boundary call.
//!
//! [`Boundary`] is the seam between the marshaller and whatever runtime
//! carries a call across the isolation boundary. Implementations receive
//! borrowed byte regions that are only valid for the duration of the call and
//! return the host's reply as an owned [`ResponseBuffer`].

#[cfg(target_arch = "wasm32")]
mod import;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod reply;

use std::sync::Arc;

use crate::error::TransportError;
use crate::wire::{ParamBuffer, ResponseBuffer};

#[cfg(target_arch = "wasm32")]
pub use import::ImportBoundary;

/// Transport for the two operations of the capability.
///
/// A `TransportError` means no reply was produced at all. Everything the host
/// has to say, including database failures, travels inside the
/// `ResponseBuffer`.
pub trait Boundary {
    /// `query(query_ptr, query_len, params_ptr, params_len) -> rows | error`
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the host could not be reached.
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError>;

    /// `query-batch(query_ptr, query_len) -> unit | error`
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the host could not be reached.
    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError>;
}

impl<B: Boundary + ?Sized> Boundary for &B {
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError> {
        (**self).query_batch(query)
    }
}

impl<B: Boundary + ?Sized> Boundary for Box<B> {
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError> {
        (**self).query_batch(query)
    }
}

impl<B: Boundary + ?Sized> Boundary for Arc<B> {
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError> {
        (**self).query(query, params)
    }

    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError> {
        (**self).query_batch(query)
    }
}
