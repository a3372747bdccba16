//! Lean Object Layout
//!
//! `#[repr(C)]` mirrors of the object headers declared in `lean/lean.h`.
//! Every heap object starts with a [`LeanObject`] header; the payload that
//! follows depends on the tag.

use std::fmt;
use std::mem::size_of;

/// Largest tag used by constructor objects
pub const MAX_CTOR_TAG: u8 = 244;
/// Closure objects
pub const CLOSURE: u8 = 245;
/// Array of object pointers (`Array α`)
pub const ARRAY: u8 = 246;
/// Array of unboxed structures
pub const STRUCT_ARRAY: u8 = 247;
/// Array of raw scalars (`ByteArray`, `FloatArray`)
pub const SCALAR_ARRAY: u8 = 248;
/// UTF-8 string objects
pub const STRING: u8 = 249;
/// Big naturals / integers
pub const MPZ: u8 = 250;
/// Thunks
pub const THUNK: u8 = 251;
/// Tasks
pub const TASK: u8 = 252;
/// `ST.Ref` cells
pub const REF: u8 = 253;
/// External objects
pub const EXTERNAL: u8 = 254;
/// Reserved
pub const RESERVED: u8 = 255;

/// Common object header.
///
/// In C this is `int m_rc; unsigned m_cs_sz:16; unsigned m_other:8; unsigned m_tag:8;`.
/// The bitfields pack into one 32-bit word; the field order below is the
/// little-endian byte order of that word.
#[repr(C)]
#[derive(Debug)]
pub struct LeanObject {
    /// Reference count. `0` marks a persistent object, negative values are
    /// multi-threaded objects.
    pub m_rc: i32,
    /// Byte size of small objects
    pub m_cs_sz: u16,
    /// Number of object fields (constructors) or element size (scalar arrays)
    pub m_other: u8,
    /// Object kind, see the tag constants
    pub m_tag: u8,
}

/// Constructor object: header followed by `m_other` object pointers and then
/// raw scalar fields.
#[repr(C)]
pub struct LeanCtorObject {
    pub m_header: LeanObject,
    pub m_objs: [*mut LeanObject; 0],
}

/// `Array α`: boxed element pointers.
#[repr(C)]
pub struct LeanArrayObject {
    pub m_header: LeanObject,
    pub m_size: usize,
    pub m_capacity: usize,
    pub m_data: [*mut LeanObject; 0],
}

/// Scalar array: raw elements of `m_other` bytes each.
#[repr(C)]
pub struct LeanSArrayObject {
    pub m_header: LeanObject,
    pub m_size: usize,
    pub m_capacity: usize,
    pub m_data: [u8; 0],
}

/// String: `m_size` counts the NUL terminator, `m_length` is in code points.
#[repr(C)]
pub struct LeanStringObject {
    pub m_header: LeanObject,
    pub m_size: usize,
    pub m_capacity: usize,
    pub m_length: usize,
    pub m_data: [u8; 0],
}

/// Byte size of the constructor header (payload starts right after it)
pub const CTOR_HEADER_SIZE: usize = size_of::<LeanCtorObject>();
/// Byte size of the array header
pub const ARRAY_HEADER_SIZE: usize = size_of::<LeanArrayObject>();
/// Byte size of the scalar array header
pub const SARRAY_HEADER_SIZE: usize = size_of::<LeanSArrayObject>();
/// Byte size of the string header
pub const STRING_HEADER_SIZE: usize = size_of::<LeanStringObject>();

/// Whether `o` is a tagged scalar rather than a heap pointer
#[inline]
pub fn is_scalar(o: *const LeanObject) -> bool {
    (o as usize) & 1 == 1
}

/// Encode a small natural as a tagged scalar pointer
#[inline]
pub fn box_scalar(n: usize) -> *mut LeanObject {
    ((n << 1) | 1) as *mut LeanObject
}

/// Decode a tagged scalar pointer. Pure arithmetic on the pointer bits, the
/// pointer is never dereferenced.
#[inline]
pub fn unbox_scalar(o: *const LeanObject) -> usize {
    (o as usize) >> 1
}

/// Coarse classification of a header tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// Constructor with the given constructor index
    Ctor(u8),
    Closure,
    Array,
    StructArray,
    ScalarArray,
    String,
    /// Any other runtime-internal kind (mpz, thunk, task, ...)
    Other(u8),
}

impl ObjKind {
    /// Classify a raw header tag
    pub fn from_tag(tag: u8) -> Self {
        match tag {
            t if t <= MAX_CTOR_TAG => ObjKind::Ctor(t),
            CLOSURE => ObjKind::Closure,
            ARRAY => ObjKind::Array,
            STRUCT_ARRAY => ObjKind::StructArray,
            SCALAR_ARRAY => ObjKind::ScalarArray,
            STRING => ObjKind::String,
            t => ObjKind::Other(t),
        }
    }
}

impl fmt::Display for ObjKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjKind::Ctor(t) => write!(f, "ctor#{}", t),
            ObjKind::Closure => write!(f, "closure"),
            ObjKind::Array => write!(f, "array"),
            ObjKind::StructArray => write!(f, "struct-array"),
            ObjKind::ScalarArray => write!(f, "scalar-array"),
            ObjKind::String => write!(f, "string"),
            ObjKind::Other(t) => write!(f, "tag#{}", t),
        }
    }
}
