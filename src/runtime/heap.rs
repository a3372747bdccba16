//! In-process object heap
//!
//! Builds objects with exactly the memory layout `lean.h` describes, so the
//! extractor and host helpers can run against them without linking Lean.
//! Reference counting follows the single-threaded rules of `lean_dec_ref`:
//! rc > 1 decrements, rc == 1 frees, rc == 0 is persistent.

use std::alloc::{self, Layout};
use std::cell::Cell;
use std::mem::size_of;
use std::ptr::{self, addr_of_mut};

use tracing::trace;

use super::ManagedRuntime;
use crate::ffi::{
    box_scalar, is_scalar, LeanArrayObject, LeanCtorObject, LeanObject, LeanSArrayObject,
    LeanStringObject, ObjKind, ObjRef, ARRAY, ARRAY_HEADER_SIZE, CTOR_HEADER_SIZE, MAX_CTOR_TAG,
    SARRAY_HEADER_SIZE, SCALAR_ARRAY, STRING, STRING_HEADER_SIZE,
};
use crate::host;

const OBJECT_ALIGN: usize = 8;

/// Heap of Lean-layout objects owned by the host process.
///
/// Not `Sync`: objects are single-threaded (positive rc) and the live
/// counter is a plain `Cell`.
#[derive(Debug, Default)]
pub struct HostHeap {
    live: Cell<usize>,
}

impl HostHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Objects allocated and not yet freed
    pub fn live_objects(&self) -> usize {
        self.live.get()
    }

    fn layout(size: usize) -> Layout {
        match Layout::from_size_align(size.max(OBJECT_ALIGN), OBJECT_ALIGN) {
            Ok(layout) => layout,
            Err(_) => panic!("object size {} overflows the address space", size),
        }
    }

    fn alloc_object(&self, size: usize, tag: u8, other: u8, cs_sz: u16) -> *mut LeanObject {
        let layout = Self::layout(size);
        // SAFETY: layout has non-zero size
        let raw = unsafe { alloc::alloc_zeroed(layout) };
        if raw.is_null() {
            alloc::handle_alloc_error(layout);
        }
        let obj = raw as *mut LeanObject;
        // SAFETY: fresh allocation large enough for the header
        unsafe {
            obj.write(LeanObject {
                m_rc: 1,
                m_cs_sz: cs_sz,
                m_other: other,
                m_tag: tag,
            });
        }
        self.live.set(self.live.get() + 1);
        obj
    }

    /// Constructor object with `objs` as object fields followed by `scalars`
    /// raw bytes. Takes ownership of one reference to each field.
    pub fn alloc_ctor(
        &self,
        tag: u8,
        objs: &[*mut LeanObject],
        scalars: &[u8],
    ) -> *mut LeanObject {
        assert!(tag <= MAX_CTOR_TAG, "invalid ctor tag {}", tag);
        assert!(objs.len() <= u8::MAX as usize, "too many ctor fields");
        let size = CTOR_HEADER_SIZE + objs.len() * size_of::<*mut LeanObject>() + scalars.len();
        assert!(size <= u16::MAX as usize, "ctor object too large");

        let obj = self.alloc_object(size, tag, objs.len() as u8, size as u16);
        // SAFETY: payload area sized above
        unsafe {
            let ctor = obj as *mut LeanCtorObject;
            let fields = addr_of_mut!((*ctor).m_objs) as *mut *mut LeanObject;
            ptr::copy_nonoverlapping(objs.as_ptr(), fields, objs.len());
            let scalar_area = fields.add(objs.len()) as *mut u8;
            ptr::copy_nonoverlapping(scalars.as_ptr(), scalar_area, scalars.len());
        }
        obj
    }

    /// `Array α` holding `elems`. Takes ownership of one reference to each
    /// element.
    pub fn alloc_array(&self, elems: &[*mut LeanObject]) -> *mut LeanObject {
        let size = ARRAY_HEADER_SIZE + elems.len() * size_of::<*mut LeanObject>();
        let obj = self.alloc_object(size, ARRAY, 0, 0);
        // SAFETY: payload area sized above
        unsafe {
            let arr = obj as *mut LeanArrayObject;
            (*arr).m_size = elems.len();
            (*arr).m_capacity = elems.len();
            let data = addr_of_mut!((*arr).m_data) as *mut *mut LeanObject;
            ptr::copy_nonoverlapping(elems.as_ptr(), data, elems.len());
        }
        obj
    }

    /// UTF-8 string object
    pub fn mk_string(&self, s: &str) -> *mut LeanObject {
        let capacity = s.len() + 1;
        let obj = self.alloc_object(STRING_HEADER_SIZE + capacity, STRING, 0, 0);
        // SAFETY: payload area sized above; zeroed allocation supplies the NUL
        unsafe {
            let so = obj as *mut LeanStringObject;
            (*so).m_size = capacity;
            (*so).m_capacity = capacity;
            (*so).m_length = s.chars().count();
            let data = addr_of_mut!((*so).m_data) as *mut u8;
            ptr::copy_nonoverlapping(s.as_ptr(), data, s.len());
        }
        obj
    }

    /// Boxed `UInt64`: a field-less constructor carrying 8 scalar bytes
    pub fn box_uint64(&self, v: u64) -> *mut LeanObject {
        self.alloc_ctor(0, &[], &v.to_ne_bytes())
    }

    /// `EStateM.Result.ok value world`
    pub fn io_ok(&self, value: *mut LeanObject) -> *mut LeanObject {
        self.alloc_ctor(0, &[value, box_scalar(0)], &[])
    }

    /// `EStateM.Result.error err world`
    pub fn io_error(&self, err: *mut LeanObject) -> *mut LeanObject {
        self.alloc_ctor(1, &[err, box_scalar(0)], &[])
    }

    /// Packed byte array holding `bytes`
    pub fn byte_array(&self, bytes: &[u8]) -> *mut LeanObject {
        // SAFETY: HostHeap primitives accept any object they allocated
        unsafe { host::mk_byte_array(self, bytes) }
    }

    /// Boxed byte array: a one-field constructor around `Array UInt8`
    pub fn boxed_byte_array(&self, bytes: &[u8]) -> *mut LeanObject {
        let elems: Vec<_> = bytes.iter().map(|&b| box_scalar(b as usize)).collect();
        let arr = self.alloc_array(&elems);
        self.alloc_ctor(0, &[arr], &[])
    }

    /// `lean_inc`: add one reference
    ///
    /// # Safety
    ///
    /// `o` must be a tagged scalar or a live object from this heap.
    pub unsafe fn inc(&self, o: *mut LeanObject) {
        if o.is_null() || is_scalar(o) {
            return;
        }
        match (*o).m_rc {
            0 => {}
            rc if rc > 0 => (*o).m_rc = rc + 1,
            rc => (*o).m_rc = rc - 1,
        }
    }

    /// Turn `o` into a persistent object that `dec` never frees. The object
    /// and its children are leaked from the heap's point of view.
    ///
    /// # Safety
    ///
    /// `o` must be a live object from this heap.
    pub unsafe fn mark_persistent(&self, o: *mut LeanObject) {
        if o.is_null() || is_scalar(o) {
            return;
        }
        (*o).m_rc = 0;
    }

    /// Allocation size of a live object, recomputed from its header
    unsafe fn object_size(obj: ObjRef<'_>) -> usize {
        let o = obj.as_ptr();
        match obj.kind() {
            ObjKind::ScalarArray => {
                let sa = o as *const LeanSArrayObject;
                SARRAY_HEADER_SIZE + (*sa).m_capacity * (*o).m_other as usize
            }
            ObjKind::Array => {
                let arr = o as *const LeanArrayObject;
                ARRAY_HEADER_SIZE + (*arr).m_capacity * size_of::<*mut LeanObject>()
            }
            ObjKind::String => {
                let so = o as *const LeanStringObject;
                STRING_HEADER_SIZE + (*so).m_capacity
            }
            _ => (*o).m_cs_sz as usize,
        }
    }

    unsafe fn free_object(&self, o: *mut LeanObject, pending: &mut Vec<*mut LeanObject>) {
        let Some(obj) = ObjRef::from_raw(o) else {
            return;
        };
        if let Some(fields) = obj.ctor_fields() {
            pending.extend_from_slice(fields);
        } else if let Some(elems) = obj.array_elems() {
            pending.extend_from_slice(elems);
        }
        let size = Self::object_size(obj);
        trace!(kind = %obj.kind(), size, "freeing host object");
        alloc::dealloc(o as *mut u8, Self::layout(size));
        self.live.set(self.live.get() - 1);
    }

    /// Drop one reference; returns true when the object must be freed
    unsafe fn release(o: *mut LeanObject) -> bool {
        match (*o).m_rc {
            0 => false,
            1 | -1 => true,
            rc if rc > 1 => {
                (*o).m_rc = rc - 1;
                false
            }
            rc => {
                (*o).m_rc = rc + 1;
                false
            }
        }
    }
}

impl ManagedRuntime for HostHeap {
    unsafe fn alloc_sarray(
        &self,
        elem_size: u32,
        size: usize,
        capacity: usize,
    ) -> *mut LeanObject {
        assert!(elem_size <= u8::MAX as u32, "scalar element size {} too large", elem_size);
        let bytes = SARRAY_HEADER_SIZE + capacity * elem_size as usize;
        let obj = self.alloc_object(bytes, SCALAR_ARRAY, elem_size as u8, 0);
        let sa = obj as *mut LeanSArrayObject;
        (*sa).m_size = size;
        (*sa).m_capacity = capacity;
        obj
    }

    unsafe fn sarray_cptr(&self, o: *mut LeanObject) -> *mut u8 {
        ObjRef::from_raw(o)
            .and_then(|obj| obj.sarray_cptr())
            .map_or(ptr::null_mut(), |p| p as *mut u8)
    }

    unsafe fn sarray_size(&self, o: *mut LeanObject) -> usize {
        ObjRef::from_raw(o)
            .and_then(|obj| obj.sarray_size())
            .unwrap_or(0)
    }

    unsafe fn io_result_is_ok(&self, r: *mut LeanObject) -> bool {
        ObjRef::from_raw(r).is_some_and(|obj| obj.tag() == 0)
    }

    unsafe fn io_result_get_value(&self, r: *mut LeanObject) -> *mut LeanObject {
        ObjRef::from_raw(r)
            .and_then(|obj| obj.ctor_get(0))
            .unwrap_or(ptr::null_mut())
    }

    unsafe fn io_result_get_error(&self, r: *mut LeanObject) -> *mut LeanObject {
        ObjRef::from_raw(r)
            .and_then(|obj| obj.ctor_get(0))
            .unwrap_or(ptr::null_mut())
    }

    unsafe fn unbox_uint64(&self, o: *mut LeanObject) -> u64 {
        ObjRef::from_raw(o)
            .and_then(|obj| obj.ctor_scalar_ptr())
            .map_or(0, |p| (p as *const u64).read_unaligned())
    }

    unsafe fn dec(&self, o: *mut LeanObject) {
        let mut pending = vec![o];
        while let Some(next) = pending.pop() {
            if next.is_null() || is_scalar(next) {
                continue;
            }
            if Self::release(next) {
                self.free_object(next, &mut pending);
            }
        }
    }

    unsafe fn report_io_error(&self, r: *mut LeanObject) {
        let err = self.io_result_get_error(r);
        match ObjRef::from_raw(err).and_then(|obj| obj.string_bytes()) {
            Some(msg) => tracing::error!(error = %String::from_utf8_lossy(msg), "IO error"),
            None => tracing::error!("IO error"),
        }
    }
}
