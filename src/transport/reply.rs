//! Return area shared with the host, and ownership of the reply region.
//!
//! The host reports its reply through a [`ReturnArea`]. The region it names was
//! obtained from [`alloc_region`] and belongs to the guest again once the
//! import returns, whatever the status.

use std::mem::ManuallyDrop;

use crate::error::TransportError;
use crate::wire::ResponseBuffer;

pub(crate) const STATUS_OK: u32 = 0;

#[repr(C)]
pub(crate) struct ReturnArea {
    pub(crate) status: u32,
    pub(crate) ptr: *mut u8,
    pub(crate) len: usize,
}

impl ReturnArea {
    pub(crate) fn empty() -> Self {
        Self {
            status: u32::MAX,
            ptr: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Take back the region named by this return area, if any.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from `alloc_region(len)` and must not have
    /// been reclaimed before.
    unsafe fn reclaim(&mut self) -> Option<Vec<u8>> {
        if self.ptr.is_null() {
            return None;
        }
        let ptr = std::mem::replace(&mut self.ptr, std::ptr::null_mut());
        Some(Vec::from_raw_parts(ptr, self.len, self.len))
    }
}

/// Allocate `len` bytes the host may fill with a reply.
pub(crate) fn alloc_region(len: usize) -> *mut u8 {
    let mut region = ManuallyDrop::new(Vec::<u8>::with_capacity(len));
    region.as_mut_ptr()
}

/// Turn a filled return area into the reply, reclaiming the region on every path.
///
/// # Safety
///
/// See [`ReturnArea::reclaim`].
pub(crate) unsafe fn take_reply(mut ret: ReturnArea) -> Result<ResponseBuffer, TransportError> {
    let region = ret.reclaim();
    if ret.status != STATUS_OK {
        // A region filled before the failure is dropped here.
        drop(region);
        return Err(TransportError(format!(
            "host returned transport status {}",
            ret.status
        )));
    }
    region
        .map(ResponseBuffer::from_bytes)
        .ok_or_else(|| TransportError("host returned no reply".to_string()))
}
