//! Lithe Shim - Lean 4 byte arrays on the host side
//!
//! Compiled Lean code hands the host `lean_object*` values. A Lean
//! `ByteArray` can arrive in two physical shapes, and this crate turns either
//! one into a flat byte buffer.
//!
//! # Features
//!
//! - **Byte extraction**: size query and copy over packed (`sarray`) and
//!   boxed (`Array UInt8` in a one-field constructor) byte arrays
//! - **Silent degradation**: any other shape reads as empty, never an error
//! - **Runtime primitives**: allocation, `IO` result projection, unboxing and
//!   release as straight pass-throughs
//! - **Host heap**: Lean-layout objects allocated in-process, for tests and
//!   for running without a Lean toolchain
//!
//! # Example
//!
//! ```rust
//! use lithe_shim::host::byte_array_to_vec;
//! use lithe_shim::runtime::{HostHeap, ManagedRuntime};
//!
//! let heap = HostHeap::new();
//! let packed = heap.byte_array(b"hi");
//! let boxed = heap.boxed_byte_array(b"hi");
//!
//! unsafe {
//!     assert_eq!(byte_array_to_vec(&heap, packed), b"hi");
//!     assert_eq!(byte_array_to_vec(&heap, boxed), b"hi");
//!     heap.dec(packed);
//!     heap.dec(boxed);
//! }
//! assert_eq!(heap.live_objects(), 0);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   Lean code     │  lean_object*
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │    extract      │  classify → Packed | Boxed | Unrecognized
//! └────────┬────────┘
//!          │
//!     ┌────┴────┐
//!     ▼         ▼
//! ┌───────┐  ┌──────────┐
//! │ size  │  │   copy   │  lithe_byte_array_size / _copy
//! └───────┘  └──────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::missing_safety_doc)]

pub mod config;
pub mod exports;
pub mod extract;
pub mod ffi;
pub mod host;
pub mod logging;
pub mod runtime;

// Re-export commonly used types
pub use config::{ConfigError, ConfigResult, LeanConfig, LoggingConfig, ShimConfig};
pub use exports::{lithe_byte_array_copy, lithe_byte_array_size};
pub use extract::{byte_array_copy, byte_array_size, classify, BoxedBytes, ByteArrayShape};
pub use ffi::{LeanObject, ObjKind, ObjRef};
pub use host::{
    byte_array_to_vec, io_result_to_u64, io_result_to_vec, mk_byte_array, unwrap_io_result,
    with_byte_array, ShimError, ShimResult,
};
#[cfg(feature = "lean-runtime")]
pub use runtime::LeanRuntime;
pub use runtime::{HostHeap, ManagedRuntime};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
