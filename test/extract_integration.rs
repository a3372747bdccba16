//! Byte Extraction Integration Tests
//!
//! Drives the exported C entry points against Lean-layout objects built on
//! the host heap.

use lithe_shim::ffi::{box_scalar, LeanObject};
use lithe_shim::runtime::{HostHeap, ManagedRuntime};
use lithe_shim::{lithe_byte_array_copy, lithe_byte_array_size};
use std::ptr;

/// Size-query then copy, the way a C host calls the pair
fn extract(obj: *mut LeanObject) -> Vec<u8> {
    unsafe {
        let n = lithe_byte_array_size(obj);
        let mut out = vec![0u8; n];
        lithe_byte_array_copy(obj, out.as_mut_ptr());
        out
    }
}

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 + 7) as u8).collect()
}

// ============================================================================
// Packed form
// ============================================================================

#[test]
fn test_packed_reports_len_and_copies_exactly() {
    let heap = HostHeap::new();
    for len in [1usize, 2, 17, 4096] {
        let data = sample(len);
        let obj = heap.byte_array(&data);
        assert_eq!(unsafe { lithe_byte_array_size(obj) }, len);
        assert_eq!(extract(obj), data);
        unsafe { heap.dec(obj) };
    }
    assert_eq!(heap.live_objects(), 0);
}

#[test]
fn test_packed_copy_does_not_overrun() {
    let heap = HostHeap::new();
    let obj = heap.byte_array(b"four");
    let mut out = [0xAAu8; 8];
    unsafe {
        lithe_byte_array_copy(obj, out.as_mut_ptr());
        heap.dec(obj);
    }
    assert_eq!(&out[..4], b"four");
    assert_eq!(&out[4..], &[0xAA; 4]);
}

#[test]
fn test_packed_empty_performs_no_write() {
    let heap = HostHeap::new();
    let obj = heap.byte_array(&[]);
    let mut sentinel = [0x55u8; 1];
    unsafe {
        assert_eq!(lithe_byte_array_size(obj), 0);
        lithe_byte_array_copy(obj, sentinel.as_mut_ptr());
        heap.dec(obj);
    }
    assert_eq!(sentinel, [0x55]);
}

#[test]
fn test_packed_with_spare_capacity() {
    let heap = HostHeap::new();
    unsafe {
        let obj = heap.alloc_sarray(1, 3, 64);
        let p = heap.sarray_cptr(obj);
        ptr::copy_nonoverlapping(b"cap".as_ptr(), p, 3);
        assert_eq!(lithe_byte_array_size(obj), 3);
        assert_eq!(extract(obj), b"cap");
        heap.dec(obj);
    }
}

// ============================================================================
// Boxed form
// ============================================================================

#[test]
fn test_boxed_reports_len_and_unboxes() {
    let heap = HostHeap::new();
    for len in [1usize, 3, 255, 1000] {
        let data = sample(len);
        let obj = heap.boxed_byte_array(&data);
        assert_eq!(unsafe { lithe_byte_array_size(obj) }, len);
        assert_eq!(extract(obj), data);
        unsafe { heap.dec(obj) };
    }
    assert_eq!(heap.live_objects(), 0);
}

#[test]
fn test_boxed_values_are_taken_mod_256() {
    let heap = HostHeap::new();
    let values = [0usize, 255, 256, 300, 1023, 65_537];
    let elems: Vec<_> = values.iter().map(|&v| box_scalar(v)).collect();
    let arr = heap.alloc_array(&elems);
    let obj = heap.alloc_ctor(0, &[arr], &[]);

    let expected: Vec<u8> = values.iter().map(|&v| (v % 256) as u8).collect();
    assert_eq!(extract(obj), expected);
    unsafe { heap.dec(obj) };
}

#[test]
fn test_boxed_empty_array() {
    let heap = HostHeap::new();
    let obj = heap.boxed_byte_array(&[]);
    let mut sentinel = [1u8; 1];
    unsafe {
        assert_eq!(lithe_byte_array_size(obj), 0);
        lithe_byte_array_copy(obj, sentinel.as_mut_ptr());
        heap.dec(obj);
    }
    assert_eq!(sentinel, [1]);
}

#[test]
fn test_boxed_with_nonzero_ctor_tag() {
    let heap = HostHeap::new();
    let arr = heap.alloc_array(&[box_scalar(9), box_scalar(8)]);
    let obj = heap.alloc_ctor(3, &[arr], &[]);
    assert_eq!(extract(obj), vec![9, 8]);
    unsafe { heap.dec(obj) };
}

// ============================================================================
// Unrecognized shapes
// ============================================================================

fn assert_unrecognized(heap: &HostHeap, obj: *mut LeanObject) {
    let mut out = [0xEEu8; 4];
    unsafe {
        assert_eq!(lithe_byte_array_size(obj), 0);
        lithe_byte_array_copy(obj, out.as_mut_ptr());
        heap.dec(obj);
    }
    assert_eq!(out, [0xEE; 4]);
}

#[test]
fn test_string_is_unrecognized() {
    let heap = HostHeap::new();
    assert_unrecognized(&heap, heap.mk_string("text"));
}

#[test]
fn test_bare_array_is_unrecognized() {
    let heap = HostHeap::new();
    assert_unrecognized(&heap, heap.alloc_array(&[box_scalar(1)]));
}

#[test]
fn test_ctor_around_packed_is_unrecognized() {
    let heap = HostHeap::new();
    let inner = heap.byte_array(b"nested");
    assert_unrecognized(&heap, heap.alloc_ctor(0, &[inner], &[]));
}

#[test]
fn test_fieldless_ctor_is_unrecognized() {
    let heap = HostHeap::new();
    assert_unrecognized(&heap, heap.box_uint64(42));
}

#[test]
fn test_scalar_handle_is_unrecognized() {
    let heap = HostHeap::new();
    assert_unrecognized(&heap, box_scalar(77));
}

#[test]
fn test_null_handle_is_unrecognized() {
    unsafe {
        assert_eq!(lithe_byte_array_size(ptr::null_mut()), 0);
        let mut out = [3u8; 1];
        lithe_byte_array_copy(ptr::null_mut(), out.as_mut_ptr());
        assert_eq!(out, [3]);
    }
}

// ============================================================================
// Destination handling
// ============================================================================

#[test]
fn test_null_destination_for_every_shape() {
    let heap = HostHeap::new();
    let handles = [
        heap.byte_array(b"packed"),
        heap.boxed_byte_array(b"boxed"),
        heap.mk_string("other"),
        box_scalar(1),
    ];
    for &h in &handles {
        unsafe { lithe_byte_array_copy(h, ptr::null_mut()) };
    }
    for &h in &handles {
        unsafe { heap.dec(h) };
    }
    assert_eq!(heap.live_objects(), 0);
}

#[test]
fn test_repeated_queries_are_stable() {
    let heap = HostHeap::new();
    let obj = heap.boxed_byte_array(b"stable");
    for _ in 0..3 {
        assert_eq!(unsafe { lithe_byte_array_size(obj) }, 6);
        assert_eq!(extract(obj), b"stable");
    }
    unsafe { heap.dec(obj) };
}
