//! Host-side conversions
//!
//! Helpers the host uses around every call into Lean: build a packed
//! `ByteArray` argument, read a `ByteArray` result back into a `Vec<u8>`, and
//! project an `IO` result.

use std::ptr;

use thiserror::Error;
use tracing::debug;

use crate::ffi::LeanObject;
use crate::runtime::ManagedRuntime;

/// Errors surfaced to the host
#[derive(Debug, Error)]
pub enum ShimError {
    /// The Lean side returned `EStateM.Result.error`
    #[error("managed runtime returned an IO error")]
    Io,

    /// The runtime handed back a null object where a value was expected
    #[error("managed runtime returned a null {0}")]
    NullObject(&'static str),
}

/// Result type for host-side operations
pub type ShimResult<T> = Result<T, ShimError>;

/// Allocate a packed byte array (element size 1, size == capacity ==
/// `data.len()`) and copy `data` into it. The caller owns the returned
/// reference.
///
/// # Safety
///
/// `rt` must return a valid scalar array from `alloc_sarray`.
pub unsafe fn mk_byte_array<R: ManagedRuntime + ?Sized>(rt: &R, data: &[u8]) -> *mut LeanObject {
    let size = data.len();
    let arr = rt.alloc_sarray(1, size, size);
    if size > 0 {
        let dst = rt.sarray_cptr(arr);
        ptr::copy_nonoverlapping(data.as_ptr(), dst, size);
    }
    arr
}

/// Copy a byte array handle (packed or boxed) into a fresh `Vec<u8>`. The
/// handle is borrowed; unrecognized shapes yield an empty vector.
///
/// # Safety
///
/// `arr` must be a live object (or scalar) of `rt`.
pub unsafe fn byte_array_to_vec<R: ManagedRuntime + ?Sized>(
    rt: &R,
    arr: *mut LeanObject,
) -> Vec<u8> {
    let size = rt.byte_array_size(arr);
    if size == 0 {
        return Vec::new();
    }
    let mut out = vec![0u8; size];
    rt.byte_array_copy(arr, out.as_mut_ptr());
    out
}

/// Project an owned `IO` result.
///
/// On success `f` receives the borrowed value, then the result is released
/// and `f`'s output returned. On failure the error is reported through the
/// runtime, the result is released and [`ShimError::Io`] returned.
///
/// # Safety
///
/// `res` must be an owned `IO` result of `rt`; `f` must not retain the
/// borrowed value beyond its call without taking a reference.
pub unsafe fn unwrap_io_result<R, T, F>(rt: &R, res: *mut LeanObject, f: F) -> ShimResult<T>
where
    R: ManagedRuntime + ?Sized,
    F: FnOnce(*mut LeanObject) -> T,
{
    if res.is_null() {
        return Err(ShimError::NullObject("IO result"));
    }
    if rt.io_result_is_ok(res) {
        let val = rt.io_result_get_value(res);
        let out = f(val);
        rt.dec(res);
        Ok(out)
    } else {
        rt.report_io_error(res);
        rt.dec(res);
        Err(ShimError::Io)
    }
}

/// Pass `data` to `f` as a freshly allocated packed byte array and release
/// the argument once `f` returns.
///
/// # Safety
///
/// `f` must treat the argument as borrowed (Lean `@&`) or take its own
/// reference.
pub unsafe fn with_byte_array<R, T, F>(rt: &R, data: &[u8], f: F) -> T
where
    R: ManagedRuntime + ?Sized,
    F: FnOnce(*mut LeanObject) -> T,
{
    let arg = mk_byte_array(rt, data);
    let out = f(arg);
    rt.dec(arg);
    out
}

/// Read a boxed `UInt64` out of an `IO` result
///
/// # Safety
///
/// See [`unwrap_io_result`].
pub unsafe fn io_result_to_u64<R: ManagedRuntime + ?Sized>(
    rt: &R,
    res: *mut LeanObject,
) -> ShimResult<u64> {
    unwrap_io_result(rt, res, |val| rt.unbox_uint64(val))
}

/// Read a byte array out of an `IO` result
///
/// # Safety
///
/// See [`unwrap_io_result`].
pub unsafe fn io_result_to_vec<R: ManagedRuntime + ?Sized>(
    rt: &R,
    res: *mut LeanObject,
) -> ShimResult<Vec<u8>> {
    let bytes = unwrap_io_result(rt, res, |val| byte_array_to_vec(rt, val))?;
    debug!(len = bytes.len(), "read byte array result");
    Ok(bytes)
}
