//! FFI Module for Lithe
//!
//! Rust view of the Lean 4 object ABI. Objects cross the boundary as raw
//! `*mut LeanObject` pointers; everything here only reads them.
//!
//! # Architecture
//!
//! ```text
//! Lean code (compiled C)
//!       │  lean_object*
//!       ▼
//! layout   (#[repr(C)] headers, tags, scalar boxing)
//!       │
//!       ▼
//! ObjRef<'a>  (borrowed, rc untouched)
//!       │
//!       ▼
//! extract / host helpers
//! ```
//!
//! # Example
//!
//! ```rust
//! use lithe_shim::ffi::{box_scalar, is_scalar, unbox_scalar};
//!
//! let b = box_scalar(200);
//! assert!(is_scalar(b));
//! assert_eq!(unbox_scalar(b), 200);
//! ```

mod handle;
mod layout;

pub use handle::ObjRef;
pub use layout::{box_scalar, is_scalar, unbox_scalar};
pub use layout::{
    LeanArrayObject, LeanCtorObject, LeanObject, LeanSArrayObject, LeanStringObject, ObjKind,
};
pub use layout::{
    ARRAY, ARRAY_HEADER_SIZE, CLOSURE, CTOR_HEADER_SIZE, EXTERNAL, MAX_CTOR_TAG, MPZ, REF,
    RESERVED, SARRAY_HEADER_SIZE, SCALAR_ARRAY, STRING, STRING_HEADER_SIZE, STRUCT_ARRAY, TASK,
    THUNK,
};

#[cfg(test)]
mod tests;
