//! Benchmarks for byte-array extraction

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use lithe_shim::extract::{byte_array_copy, byte_array_size, classify};
use lithe_shim::runtime::{HostHeap, ManagedRuntime};

const SIZES: &[usize] = &[16, 256, 4096, 65536];

fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| i as u8).collect()
}

/// Packed copy is a single memcpy
fn bench_packed_copy(c: &mut Criterion) {
    let heap = HostHeap::new();
    let mut group = c.benchmark_group("packed_copy");

    for &size in SIZES {
        let obj = heap.byte_array(&payload(size));
        let mut out = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("{}_bytes", size), |b| {
            b.iter(|| unsafe {
                byte_array_copy(black_box(obj), out.as_mut_ptr());
                black_box(&out);
            })
        });
        unsafe { heap.dec(obj) };
    }

    group.finish();
}

/// Boxed copy unboxes one element at a time
fn bench_boxed_copy(c: &mut Criterion) {
    let heap = HostHeap::new();
    let mut group = c.benchmark_group("boxed_copy");

    for &size in SIZES {
        let obj = heap.boxed_byte_array(&payload(size));
        let mut out = vec![0u8; size];
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_function(format!("{}_bytes", size), |b| {
            b.iter(|| unsafe {
                byte_array_copy(black_box(obj), out.as_mut_ptr());
                black_box(&out);
            })
        });
        unsafe { heap.dec(obj) };
    }

    group.finish();
}

/// Shape detection alone, for each form plus a miss
fn bench_classify(c: &mut Criterion) {
    let heap = HostHeap::new();
    let packed = heap.byte_array(b"packed");
    let boxed = heap.boxed_byte_array(b"boxed");
    let string = heap.mk_string("neither");

    let mut group = c.benchmark_group("classify");
    group.bench_function("packed", |b| {
        b.iter(|| unsafe { black_box(classify(black_box(packed)).len()) })
    });
    group.bench_function("boxed", |b| {
        b.iter(|| unsafe { black_box(classify(black_box(boxed)).len()) })
    });
    group.bench_function("unrecognized", |b| {
        b.iter(|| unsafe { black_box(byte_array_size(black_box(string))) })
    });
    group.finish();

    unsafe {
        heap.dec(packed);
        heap.dec(boxed);
        heap.dec(string);
    }
}

criterion_group!(benches, bench_packed_copy, bench_boxed_copy, bench_classify);
criterion_main!(benches);
