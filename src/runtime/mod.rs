//! Runtime module
//!
//! The managed runtime owns every object that crosses the boundary. This
//! module names the primitives the host needs from it and provides two
//! implementations:
//!
//! - [`HostHeap`]: allocates objects in the Lean memory layout inside the
//!   host process. Used by tests, benches and the `probe` command, and
//!   anywhere the real runtime is not linked.
//! - [`LeanRuntime`] (feature `lean-runtime`): forwards to the `lithe_lean_*`
//!   wrappers compiled from `lean_shim.c` against the real `lean.h`.
//!
//! Every primitive is a straight pass-through. The only logic lives in
//! [`crate::extract`], which both implementations reach through the
//! provided `byte_array_size` / `byte_array_copy` methods.

mod heap;
#[cfg(feature = "lean-runtime")]
mod lean;

pub use heap::HostHeap;
#[cfg(feature = "lean-runtime")]
pub use lean::LeanRuntime;

use tracing::error;

use crate::extract;
use crate::ffi::LeanObject;

/// Primitives supplied by the managed runtime.
///
/// All methods are `unsafe`: they take raw object pointers whose validity
/// and ownership are governed by the runtime's reference counting, which the
/// caller must respect.
pub trait ManagedRuntime {
    /// `lean_alloc_sarray`: new scalar array with rc 1. Elements are left to
    /// the caller.
    unsafe fn alloc_sarray(&self, elem_size: u32, size: usize, capacity: usize)
        -> *mut LeanObject;

    /// `lean_sarray_cptr`: start of the data region
    unsafe fn sarray_cptr(&self, o: *mut LeanObject) -> *mut u8;

    /// `lean_sarray_size`: element count
    unsafe fn sarray_size(&self, o: *mut LeanObject) -> usize;

    /// `lean_io_result_is_ok`
    unsafe fn io_result_is_ok(&self, r: *mut LeanObject) -> bool;

    /// `lean_io_result_get_value`: borrowed from `r`
    unsafe fn io_result_get_value(&self, r: *mut LeanObject) -> *mut LeanObject;

    /// `lean_io_result_get_error`: borrowed from `r`
    unsafe fn io_result_get_error(&self, r: *mut LeanObject) -> *mut LeanObject;

    /// `lean_unbox_uint64`
    unsafe fn unbox_uint64(&self, o: *mut LeanObject) -> u64;

    /// `lean_dec`: release one reference
    unsafe fn dec(&self, o: *mut LeanObject);

    /// Surface a failed IO result before the host drops it
    unsafe fn report_io_error(&self, r: *mut LeanObject) {
        let _ = r;
        error!("managed runtime returned an IO error");
    }

    /// Logical length of a byte array handle, see [`extract::byte_array_size`]
    unsafe fn byte_array_size(&self, o: *mut LeanObject) -> usize {
        extract::byte_array_size(o)
    }

    /// Copy a byte array handle into `dst`, see [`extract::byte_array_copy`]
    unsafe fn byte_array_copy(&self, o: *mut LeanObject, dst: *mut u8) {
        extract::byte_array_copy(o, dst)
    }
}
