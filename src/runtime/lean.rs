//! Linked Lean runtime
//!
//! Forwards every primitive to the `lithe_lean_*` wrappers in `lean_shim.c`,
//! which expose the `static inline` helpers of `lean.h` as real symbols.

use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::Once;

use tracing::debug;

use super::ManagedRuntime;
use crate::ffi::LeanObject;

extern "C" {
    fn lean_initialize_runtime_module();
    fn lean_initialize();
    fn lean_initialize_thread();
    fn lean_init_task_manager();
    fn lean_finalize_task_manager();
    fn lean_io_mark_end_initialization();
    fn lean_io_result_show_error(r: *mut LeanObject);

    fn lithe_lean_alloc_sarray(elem_size: u32, size: usize, capacity: usize) -> *mut LeanObject;
    fn lithe_lean_sarray_cptr(o: *mut LeanObject) -> *mut u8;
    fn lithe_lean_sarray_size(o: *mut LeanObject) -> usize;
    fn lithe_lean_io_result_is_ok(r: *mut LeanObject) -> bool;
    fn lithe_lean_io_result_get_value(r: *mut LeanObject) -> *mut LeanObject;
    fn lithe_lean_io_result_get_error(r: *mut LeanObject) -> *mut LeanObject;
    fn lithe_lean_unbox_uint64(o: *mut LeanObject) -> u64;
    fn lithe_lean_dec(o: *mut LeanObject);
}

static START: Once = Once::new();

thread_local! {
    static THREAD_INIT: Cell<bool> = const { Cell::new(false) };
}

fn init_thread() {
    THREAD_INIT.with(|cell| {
        if !cell.get() {
            // SAFETY: the runtime module is initialised before any thread
            // registers itself
            unsafe { lean_initialize_thread() };
            cell.set(true);
        }
    });
}

/// Handle to the process-wide Lean runtime.
///
/// Obtaining one initialises the runtime once per process and registers the
/// calling thread. The handle is `!Send` because registration is per thread.
#[derive(Debug)]
pub struct LeanRuntime {
    _thread_bound: PhantomData<*const ()>,
}

impl LeanRuntime {
    /// Initialise the runtime (idempotent) and register this thread
    pub fn init() -> Self {
        START.call_once(|| unsafe {
            lean_initialize_runtime_module();
            lean_initialize();
            lean_init_task_manager();
            lean_io_mark_end_initialization();
            debug!("lean runtime initialised");
        });
        init_thread();
        Self {
            _thread_bound: PhantomData,
        }
    }

    /// Stop the task manager. No Lean code may run afterwards.
    pub fn shutdown(self) {
        // SAFETY: consuming self ends this thread's use of the runtime
        unsafe { lean_finalize_task_manager() };
        debug!("lean task manager finalised");
    }
}

impl ManagedRuntime for LeanRuntime {
    unsafe fn alloc_sarray(
        &self,
        elem_size: u32,
        size: usize,
        capacity: usize,
    ) -> *mut LeanObject {
        lithe_lean_alloc_sarray(elem_size, size, capacity)
    }

    unsafe fn sarray_cptr(&self, o: *mut LeanObject) -> *mut u8 {
        lithe_lean_sarray_cptr(o)
    }

    unsafe fn sarray_size(&self, o: *mut LeanObject) -> usize {
        lithe_lean_sarray_size(o)
    }

    unsafe fn io_result_is_ok(&self, r: *mut LeanObject) -> bool {
        lithe_lean_io_result_is_ok(r)
    }

    unsafe fn io_result_get_value(&self, r: *mut LeanObject) -> *mut LeanObject {
        lithe_lean_io_result_get_value(r)
    }

    unsafe fn io_result_get_error(&self, r: *mut LeanObject) -> *mut LeanObject {
        lithe_lean_io_result_get_error(r)
    }

    unsafe fn unbox_uint64(&self, o: *mut LeanObject) -> u64 {
        lithe_lean_unbox_uint64(o)
    }

    unsafe fn dec(&self, o: *mut LeanObject) {
        lithe_lean_dec(o)
    }

    unsafe fn report_io_error(&self, r: *mut LeanObject) {
        lean_io_result_show_error(r)
    }
}
