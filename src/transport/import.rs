//! Boundary backed by functions imported from the host (wasm32 guests).
//!
//! The host receives the query text and the encoded parameters as
//! pointer/length pairs into guest memory. It writes its reply into a region it
//! obtains from the exported [`pgquery_alloc`] and reports that region through
//! a return area. The guest then takes ownership of the region.

use crate::error::TransportError;
use crate::wire::{ParamBuffer, ResponseBuffer};

use super::reply::{alloc_region, take_reply, ReturnArea};
use super::Boundary;

#[link(wasm_import_module = "pgquery:postgres/query@0.1.1-draft")]
extern "C" {
    #[link_name = "query"]
    fn wasmimport_query(
        query_ptr: *const u8,
        query_len: usize,
        params_ptr: *const u8,
        params_len: usize,
        ret: *mut ReturnArea,
    );

    #[link_name = "query-batch"]
    fn wasmimport_query_batch(query_ptr: *const u8, query_len: usize, ret: *mut ReturnArea);
}

/// Allocate `len` bytes the host may fill with a reply.
///
/// Ownership passes back to the guest when the region is reported in the
/// return area of the import that triggered the allocation.
#[no_mangle]
pub extern "C" fn pgquery_alloc(len: usize) -> *mut u8 {
    alloc_region(len)
}

/// Import-backed transport. Stateless; construct one per component or per call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImportBoundary;

impl ImportBoundary {
    pub fn new() -> Self {
        Self
    }
}

impl Boundary for ImportBoundary {
    fn query(&self, query: &[u8], params: &ParamBuffer) -> Result<ResponseBuffer, TransportError> {
        let params = params.as_bytes();
        let mut ret = ReturnArea::empty();
        // SAFETY: both regions stay borrowed for the whole call and the host
        // only reads them; `ret` is a valid, writable return area. Any region
        // the host reports came from `pgquery_alloc`.
        unsafe {
            wasmimport_query(
                query.as_ptr(),
                query.len(),
                params.as_ptr(),
                params.len(),
                &mut ret,
            );
            take_reply(ret)
        }
    }

    fn query_batch(&self, query: &[u8]) -> Result<ResponseBuffer, TransportError> {
        let mut ret = ReturnArea::empty();
        // SAFETY: see `query`.
        unsafe {
            wasmimport_query_batch(query.as_ptr(), query.len(), &mut ret);
            take_reply(ret)
        }
    }
}
