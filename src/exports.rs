//! C entry points
//!
//! The two byte-array entry points called from compiled Lean code and from
//! the host. Both are thin `extern "C"` shells over [`crate::extract`].

use crate::extract;
use crate::ffi::LeanObject;

/// Logical byte length of a `ByteArray` handle (packed or boxed); 0 for any
/// other shape.
///
/// # Safety
///
/// `o` must be null, a tagged scalar, or a live Lean object borrowed for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn lithe_byte_array_size(o: *mut LeanObject) -> usize {
    extract::byte_array_size(o)
}

/// Copy the bytes of a `ByteArray` handle into `dst`. Null `dst` and
/// unrecognized shapes are no-ops.
///
/// # Safety
///
/// As for [`lithe_byte_array_size`]; a non-null `dst` must have room for
/// `lithe_byte_array_size(o)` bytes.
#[no_mangle]
pub unsafe extern "C" fn lithe_byte_array_copy(o: *mut LeanObject, dst: *mut u8) {
    extract::byte_array_copy(o, dst)
}
