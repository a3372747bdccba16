//! Borrowed Object Handles
//!
//! [`ObjRef`] is a read-only view of a runtime-owned heap object. It never
//! touches the reference count, so it must not outlive the call that handed
//! the raw pointer over.

use std::marker::PhantomData;
use std::ptr::{addr_of, NonNull};
use std::slice;

use super::layout::{
    LeanArrayObject, LeanCtorObject, LeanObject, LeanSArrayObject, LeanStringObject, ObjKind,
};
use super::layout::{is_scalar, ARRAY, SCALAR_ARRAY, STRING};

/// Non-owning reference to a heap object (never a tagged scalar)
#[derive(Clone, Copy)]
pub struct ObjRef<'a> {
    ptr: NonNull<LeanObject>,
    _borrow: PhantomData<&'a LeanObject>,
}

impl<'a> ObjRef<'a> {
    /// Wrap a raw object pointer.
    ///
    /// Returns `None` for null pointers and tagged scalars, neither of which
    /// has a header to inspect.
    ///
    /// # Safety
    ///
    /// A non-null, non-scalar `ptr` must point to a live object laid out as
    /// in `lean.h` that stays alive and unmodified for `'a`.
    pub unsafe fn from_raw(ptr: *const LeanObject) -> Option<Self> {
        if is_scalar(ptr) {
            return None;
        }
        NonNull::new(ptr as *mut LeanObject).map(|ptr| Self {
            ptr,
            _borrow: PhantomData,
        })
    }

    /// The underlying pointer
    pub fn as_ptr(&self) -> *mut LeanObject {
        self.ptr.as_ptr()
    }

    fn header(&self) -> &'a LeanObject {
        // SAFETY: from_raw guarantees a live header for 'a
        unsafe { &*self.ptr.as_ptr() }
    }

    /// Raw header tag
    pub fn tag(&self) -> u8 {
        self.header().m_tag
    }

    /// Decoded object kind
    pub fn kind(&self) -> ObjKind {
        ObjKind::from_tag(self.tag())
    }

    /// Current reference count (read-only)
    pub fn rc(&self) -> i32 {
        self.header().m_rc
    }

    pub fn is_ctor(&self) -> bool {
        matches!(self.kind(), ObjKind::Ctor(_))
    }

    pub fn is_array(&self) -> bool {
        self.tag() == ARRAY
    }

    pub fn is_sarray(&self) -> bool {
        self.tag() == SCALAR_ARRAY
    }

    pub fn is_string(&self) -> bool {
        self.tag() == STRING
    }

    /// Number of object fields of a constructor, `None` for other kinds
    pub fn ctor_num_objs(&self) -> Option<usize> {
        self.is_ctor().then(|| self.header().m_other as usize)
    }

    /// Object fields of a constructor. Fields may be tagged scalars.
    pub fn ctor_fields(&self) -> Option<&'a [*mut LeanObject]> {
        let n = self.ctor_num_objs()?;
        let ctor = self.ptr.as_ptr() as *const LeanCtorObject;
        // SAFETY: a constructor header is followed by m_other field pointers
        let objs = unsafe { addr_of!((*ctor).m_objs) as *const *mut LeanObject };
        Some(unsafe { slice::from_raw_parts(objs, n) })
    }

    /// Object field `i` of a constructor
    pub fn ctor_get(&self, i: usize) -> Option<*mut LeanObject> {
        self.ctor_fields()?.get(i).copied()
    }

    /// Pointer to the raw scalar area that follows a constructor's object
    /// fields
    pub fn ctor_scalar_ptr(&self) -> Option<*const u8> {
        let n = self.ctor_num_objs()?;
        let ctor = self.ptr.as_ptr() as *const LeanCtorObject;
        // SAFETY: offset stays within the constructor allocation
        unsafe {
            let objs = addr_of!((*ctor).m_objs) as *const *mut LeanObject;
            Some(objs.add(n) as *const u8)
        }
    }

    /// Elements of an `Array α`
    pub fn array_elems(&self) -> Option<&'a [*mut LeanObject]> {
        if !self.is_array() {
            return None;
        }
        let arr = self.ptr.as_ptr() as *const LeanArrayObject;
        // SAFETY: m_size initialised element pointers follow the header
        unsafe {
            let data = addr_of!((*arr).m_data) as *const *mut LeanObject;
            Some(slice::from_raw_parts(data, (*arr).m_size))
        }
    }

    /// Element count of a scalar array
    pub fn sarray_size(&self) -> Option<usize> {
        if !self.is_sarray() {
            return None;
        }
        let arr = self.ptr.as_ptr() as *const LeanSArrayObject;
        // SAFETY: tag checked above
        Some(unsafe { (*arr).m_size })
    }

    /// Element width of a scalar array in bytes
    pub fn sarray_elem_size(&self) -> Option<usize> {
        self.is_sarray().then(|| self.header().m_other as usize)
    }

    /// Start of a scalar array's data region
    pub fn sarray_cptr(&self) -> Option<*const u8> {
        if !self.is_sarray() {
            return None;
        }
        let arr = self.ptr.as_ptr() as *const LeanSArrayObject;
        // SAFETY: tag checked above
        Some(unsafe { addr_of!((*arr).m_data) as *const u8 })
    }

    /// String contents without the trailing NUL
    pub fn string_bytes(&self) -> Option<&'a [u8]> {
        if !self.is_string() {
            return None;
        }
        let s = self.ptr.as_ptr() as *const LeanStringObject;
        // SAFETY: m_size counts the NUL, so m_size - 1 content bytes follow
        unsafe {
            let len = (*s).m_size.saturating_sub(1);
            Some(slice::from_raw_parts(addr_of!((*s).m_data) as *const u8, len))
        }
    }
}

impl std::fmt::Debug for ObjRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjRef")
            .field("ptr", &self.ptr)
            .field("kind", &self.kind())
            .field("rc", &self.rc())
            .finish()
    }
}
