//! FFI Module Tests

use super::*;
use std::mem::{align_of, size_of};

#[test]
fn test_header_layout() {
    assert_eq!(size_of::<LeanObject>(), 8);
    assert_eq!(align_of::<LeanObject>(), 4);
    assert_eq!(CTOR_HEADER_SIZE, 8);
}

#[test]
fn test_array_header_layout() {
    let word = size_of::<usize>();
    assert_eq!(ARRAY_HEADER_SIZE, 8 + 2 * word);
    assert_eq!(SARRAY_HEADER_SIZE, 8 + 2 * word);
    assert_eq!(STRING_HEADER_SIZE, 8 + 3 * word);
}

#[test]
fn test_tag_classification() {
    assert_eq!(ObjKind::from_tag(0), ObjKind::Ctor(0));
    assert_eq!(ObjKind::from_tag(MAX_CTOR_TAG), ObjKind::Ctor(MAX_CTOR_TAG));
    assert_eq!(ObjKind::from_tag(CLOSURE), ObjKind::Closure);
    assert_eq!(ObjKind::from_tag(ARRAY), ObjKind::Array);
    assert_eq!(ObjKind::from_tag(STRUCT_ARRAY), ObjKind::StructArray);
    assert_eq!(ObjKind::from_tag(SCALAR_ARRAY), ObjKind::ScalarArray);
    assert_eq!(ObjKind::from_tag(STRING), ObjKind::String);
    assert_eq!(ObjKind::from_tag(MPZ), ObjKind::Other(MPZ));
    assert_eq!(ObjKind::from_tag(EXTERNAL), ObjKind::Other(EXTERNAL));
}

#[test]
fn test_kind_display() {
    assert_eq!(ObjKind::Ctor(3).to_string(), "ctor#3");
    assert_eq!(ObjKind::ScalarArray.to_string(), "scalar-array");
    assert_eq!(ObjKind::Other(THUNK).to_string(), "tag#251");
}

#[test]
fn test_scalar_boxing() {
    for n in [0usize, 1, 255, 256, 1 << 20] {
        let b = box_scalar(n);
        assert!(is_scalar(b));
        assert_eq!(unbox_scalar(b), n);
    }
    let aligned = 0x1000usize as *const LeanObject;
    assert!(!is_scalar(aligned));
}

#[test]
fn test_objref_rejects_null_and_scalars() {
    unsafe {
        assert!(ObjRef::from_raw(std::ptr::null()).is_none());
        assert!(ObjRef::from_raw(box_scalar(7)).is_none());
    }
}

#[test]
fn test_objref_on_raw_header() {
    // a field-less constructor is just a header
    let mut header = LeanObject {
        m_rc: 1,
        m_cs_sz: 8,
        m_other: 0,
        m_tag: 2,
    };
    let obj = unsafe { ObjRef::from_raw(&mut header as *mut LeanObject) }.unwrap();
    assert_eq!(obj.kind(), ObjKind::Ctor(2));
    assert_eq!(obj.ctor_num_objs(), Some(0));
    assert_eq!(obj.ctor_fields().map(|f| f.len()), Some(0));
    assert_eq!(obj.sarray_size(), None);
    assert!(obj.array_elems().is_none());
    assert!(obj.string_bytes().is_none());
    assert_eq!(obj.rc(), 1);
}
