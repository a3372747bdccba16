//! Byte Extraction
//!
//! A Lean `ByteArray` reaches the host in one of two physical shapes:
//!
//! - **packed**: a scalar array (`lean_sarray_object`) holding raw bytes;
//! - **boxed**: a one-field constructor whose field is an `Array UInt8`, each
//!   element a tagged scalar.
//!
//! [`classify`] inspects the tag once and yields a [`ByteArrayShape`]; the
//! size query and the copy both consume that value. Anything that is neither
//! shape reports size 0 and copies nothing. No error is ever raised here: the
//! caller sits on the far side of an FFI boundary and has no way to receive
//! one.

use std::ptr;
use std::slice;

use tracing::trace;

use crate::ffi::{unbox_scalar, LeanObject, ObjRef};

/// Physical shape of a byte array handle
#[derive(Debug, Clone, Copy)]
pub enum ByteArrayShape<'a> {
    /// Contiguous raw bytes
    Packed(&'a [u8]),
    /// Boxed `UInt8` elements, unboxed on access
    Boxed(BoxedBytes<'a>),
    /// Neither shape; treated as empty
    Unrecognized,
}

/// Elements of a boxed byte array
#[derive(Debug, Clone, Copy)]
pub struct BoxedBytes<'a> {
    elems: &'a [*mut LeanObject],
}

impl<'a> BoxedBytes<'a> {
    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    /// Unboxed bytes in index order, each truncated to 8 bits
    pub fn iter(&self) -> impl Iterator<Item = u8> + 'a {
        self.elems.iter().map(|&e| unbox_scalar(e) as u8)
    }
}

impl<'a> ByteArrayShape<'a> {
    /// Logical length in bytes
    pub fn len(&self) -> usize {
        match self {
            ByteArrayShape::Packed(bytes) => bytes.len(),
            ByteArrayShape::Boxed(boxed) => boxed.len(),
            ByteArrayShape::Unrecognized => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ByteArrayShape::Unrecognized)
    }

    /// Copy into a raw destination.
    ///
    /// # Safety
    ///
    /// A non-null `dst` must be valid for `self.len()` byte writes and must
    /// not overlap the source object.
    pub unsafe fn copy_to_raw(&self, dst: *mut u8) {
        if dst.is_null() {
            return;
        }
        match self {
            ByteArrayShape::Packed(bytes) => {
                if bytes.is_empty() {
                    return;
                }
                ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
            }
            ByteArrayShape::Boxed(boxed) => {
                for (i, b) in boxed.iter().enumerate() {
                    *dst.add(i) = b;
                }
            }
            ByteArrayShape::Unrecognized => {}
        }
    }

    /// Copy into a slice, stopping at whichever side is shorter. Returns the
    /// number of bytes written.
    pub fn copy_to_slice(&self, dst: &mut [u8]) -> usize {
        match self {
            ByteArrayShape::Packed(bytes) => {
                let n = bytes.len().min(dst.len());
                dst[..n].copy_from_slice(&bytes[..n]);
                n
            }
            ByteArrayShape::Boxed(boxed) => {
                let mut n = 0;
                for (slot, b) in dst.iter_mut().zip(boxed.iter()) {
                    *slot = b;
                    n += 1;
                }
                n
            }
            ByteArrayShape::Unrecognized => 0,
        }
    }

    /// Owned copy of the contents
    pub fn to_vec(&self) -> Vec<u8> {
        match self {
            ByteArrayShape::Packed(bytes) => bytes.to_vec(),
            ByteArrayShape::Boxed(boxed) => boxed.iter().collect(),
            ByteArrayShape::Unrecognized => Vec::new(),
        }
    }
}

/// Detect the physical shape of a byte array handle.
///
/// Null pointers and tagged scalars have no header and classify as
/// [`ByteArrayShape::Unrecognized`].
///
/// # Safety
///
/// `obj` must be null, a tagged scalar, or a live object that stays
/// unmodified for `'a`.
pub unsafe fn classify<'a>(obj: *const LeanObject) -> ByteArrayShape<'a> {
    let Some(obj) = ObjRef::from_raw(obj) else {
        trace!("byte array handle is null or scalar");
        return ByteArrayShape::Unrecognized;
    };

    if let (Some(size), Some(data)) = (obj.sarray_size(), obj.sarray_cptr()) {
        if size == 0 {
            return ByteArrayShape::Packed(&[]);
        }
        return ByteArrayShape::Packed(slice::from_raw_parts(data, size));
    }

    if let Some([field]) = obj.ctor_fields() {
        if let Some(elems) = ObjRef::from_raw(*field).and_then(|f| f.array_elems()) {
            return ByteArrayShape::Boxed(BoxedBytes { elems });
        }
    }

    trace!(kind = %obj.kind(), "unrecognized byte array shape");
    ByteArrayShape::Unrecognized
}

/// Logical byte length of `obj`, 0 when the shape is not recognized.
///
/// # Safety
///
/// See [`classify`].
pub unsafe fn byte_array_size(obj: *const LeanObject) -> usize {
    classify(obj).len()
}

/// Copy the bytes of `obj` into `dst`. A null `dst` or an unrecognized shape
/// is a no-op.
///
/// # Safety
///
/// See [`classify`]. A non-null `dst` must be valid for
/// `byte_array_size(obj)` byte writes.
pub unsafe fn byte_array_copy(obj: *const LeanObject, dst: *mut u8) {
    if dst.is_null() {
        return;
    }
    classify(obj).copy_to_raw(dst);
}
