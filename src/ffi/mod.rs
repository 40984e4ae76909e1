//! C ABI
//!
//! Exposes the store to non-Rust callers through opaque handles.
//!
//! ## Conventions
//! - Every fallible call returns an `int` status: `HEAP_OK` (0) on success,
//!   otherwise an error code. Codes equal [`ErrorKind::code`].
//! - Results are written to out-parameters. There is no global error slot.
//! - Strings handed out (`heap_get`, `heap_iter_next`) are owned by the
//!   caller and must be released with `heap_string_free`.
//! - Handles are released with `heap_close` / `heap_iter_destroy`. Passing
//!   NULL to a release function is a no-op.
//! - A `heap_store` must not be used after `heap_close`. Concurrent calls
//!   on one handle are serialized internally.
//!
//! The matching header lives in `include/heapkv.h`.

#![allow(non_camel_case_types)]

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::error::{ErrorKind, HeapError};
use crate::index::KeyIterator;
use crate::store::Store;

// =============================================================================
// Status Codes
// =============================================================================

/// Success
pub const HEAP_OK: i32 = 0;

/// `heap_iter_next` has no more keys
pub const HEAP_ITER_DONE: i32 = 2;

/// A required pointer argument was NULL
pub const HEAP_ERR_NULL_ARG: i32 = 20;

pub const HEAP_ERR_NOT_FOUND: i32 = ErrorKind::NotFound as i32;
pub const HEAP_ERR_IO: i32 = ErrorKind::Io as i32;
pub const HEAP_ERR_UTF8: i32 = ErrorKind::InvalidEncoding as i32;
pub const HEAP_ERR_KEY_SIZE: i32 = ErrorKind::InvalidKeySize as i32;
pub const HEAP_ERR_VALUE_SIZE: i32 = ErrorKind::InvalidValueSize as i32;
pub const HEAP_ERR_DATA: i32 = ErrorKind::DataCorruption as i32;

// =============================================================================
// Handles
// =============================================================================

/// Opaque store handle
pub struct heap_store {
    store: Store,
}

/// Opaque key iterator handle; independent of the store it came from
pub struct heap_key_iter {
    iter: KeyIterator,
}

// =============================================================================
// Store Functions
// =============================================================================

/// Open or create the heap file at `path`.
///
/// # Safety
/// `path` must be NULL or a valid NUL-terminated string. `out_store` must be
/// NULL or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn heap_open(path: *const c_char, out_store: *mut *mut heap_store) -> i32 {
    if out_store.is_null() {
        return HEAP_ERR_NULL_ARG;
    }
    let path = match unsafe { str_arg("path", path) } {
        Ok(path) => path,
        Err(code) => return code,
    };

    match Store::open(path) {
        Ok(store) => {
            unsafe {
                *out_store = Box::into_raw(Box::new(heap_store { store }));
            }
            HEAP_OK
        }
        Err(e) => fail("heap_open", e),
    }
}

/// Look up `key`. On success `*out_value` receives a newly allocated string
/// that the caller frees with `heap_string_free`. On failure it is set to
/// NULL.
///
/// # Safety
/// `store` must be NULL or a live handle from `heap_open`. `key` must be
/// NULL or a valid NUL-terminated string. `out_value` must be NULL or valid
/// for writes.
#[no_mangle]
pub unsafe extern "C" fn heap_get(
    store: *const heap_store,
    key: *const c_char,
    out_value: *mut *mut c_char,
) -> i32 {
    if store.is_null() || out_value.is_null() {
        return HEAP_ERR_NULL_ARG;
    }
    unsafe {
        *out_value = ptr::null_mut();
    }
    let store = unsafe { &(*store).store };
    let key = match unsafe { str_arg("key", key) } {
        Ok(key) => key,
        Err(code) => return code,
    };

    let value = match store.get(key) {
        Ok(value) => value,
        Err(e) => return fail("heap_get", e),
    };
    match into_c_string(value) {
        Ok(raw) => {
            unsafe {
                *out_value = raw;
            }
            HEAP_OK
        }
        Err(e) => fail("heap_get", e),
    }
}

/// Set `key` to `value`, appending a record to the heap file.
///
/// # Safety
/// `store` must be NULL or a live handle from `heap_open`. `key` and `value`
/// must be NULL or valid NUL-terminated strings.
#[no_mangle]
pub unsafe extern "C" fn heap_set(
    store: *const heap_store,
    key: *const c_char,
    value: *const c_char,
) -> i32 {
    if store.is_null() {
        return HEAP_ERR_NULL_ARG;
    }
    let store = unsafe { &(*store).store };
    let key = match unsafe { str_arg("key", key) } {
        Ok(key) => key,
        Err(code) => return code,
    };
    let value = match unsafe { str_arg("value", value) } {
        Ok(value) => value,
        Err(code) => return code,
    };

    match store.set(key, value) {
        Ok(()) => HEAP_OK,
        Err(e) => fail("heap_set", e),
    }
}

/// Close the store and release its handle. Returns the status of the final
/// sync; the handle is released either way.
///
/// # Safety
/// `store` must be NULL or a live handle from `heap_open`, not used again
/// afterwards.
#[no_mangle]
pub unsafe extern "C" fn heap_close(store: *mut heap_store) -> i32 {
    if store.is_null() {
        return HEAP_OK;
    }
    let handle = unsafe { Box::from_raw(store) };
    match handle.store.close() {
        Ok(()) => HEAP_OK,
        Err(e) => fail("heap_close", e),
    }
}

// =============================================================================
// Iterator Functions
// =============================================================================

/// Snapshot the store's keys into a new iterator.
///
/// # Safety
/// `store` must be NULL or a live handle from `heap_open`. `out_iter` must
/// be NULL or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn heap_iter(
    store: *const heap_store,
    out_iter: *mut *mut heap_key_iter,
) -> i32 {
    if store.is_null() || out_iter.is_null() {
        return HEAP_ERR_NULL_ARG;
    }
    let store = unsafe { &(*store).store };
    let iter = store.iter_keys();
    unsafe {
        *out_iter = Box::into_raw(Box::new(heap_key_iter { iter }));
    }
    HEAP_OK
}

/// Produce the next key. Returns `HEAP_OK` with a caller-owned string in
/// `*out_key`, or `HEAP_ITER_DONE` with `*out_key` set to NULL.
///
/// # Safety
/// `iter` must be NULL or a live handle from `heap_iter`. `out_key` must be
/// NULL or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn heap_iter_next(iter: *mut heap_key_iter, out_key: *mut *mut c_char) -> i32 {
    if iter.is_null() || out_key.is_null() {
        return HEAP_ERR_NULL_ARG;
    }
    unsafe {
        *out_key = ptr::null_mut();
    }
    let iter = unsafe { &mut (*iter).iter };

    let Some(key) = iter.next() else {
        return HEAP_ITER_DONE;
    };
    match into_c_string(key) {
        Ok(raw) => {
            unsafe {
                *out_key = raw;
            }
            HEAP_OK
        }
        Err(e) => fail("heap_iter_next", e),
    }
}

/// Release an iterator. Has no effect on the store.
///
/// # Safety
/// `iter` must be NULL or a live handle from `heap_iter`, not used again
/// afterwards.
#[no_mangle]
pub unsafe extern "C" fn heap_iter_destroy(iter: *mut heap_key_iter) {
    if iter.is_null() {
        return;
    }
    unsafe {
        drop(Box::from_raw(iter));
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Release a string returned by `heap_get` or `heap_iter_next`.
///
/// # Safety
/// `s` must be NULL or a pointer returned by this library and not yet freed.
#[no_mangle]
pub unsafe extern "C" fn heap_string_free(s: *mut c_char) {
    if s.is_null() {
        return;
    }
    unsafe {
        drop(CString::from_raw(s));
    }
}

/// Static description of a status code. Never NULL; do not free.
#[no_mangle]
pub extern "C" fn heap_strerror(code: i32) -> *const c_char {
    let msg: &'static [u8] = match code {
        HEAP_OK => b"ok\0",
        HEAP_ITER_DONE => b"iteration done\0",
        HEAP_ERR_NULL_ARG => b"null argument\0",
        HEAP_ERR_NOT_FOUND => b"key not found\0",
        HEAP_ERR_IO => b"I/O error\0",
        HEAP_ERR_UTF8 => b"invalid encoding\0",
        HEAP_ERR_KEY_SIZE => b"invalid key size\0",
        HEAP_ERR_VALUE_SIZE => b"invalid value size\0",
        HEAP_ERR_DATA => b"data corruption\0",
        _ => b"unknown error\0",
    };
    msg.as_ptr() as *const c_char
}

/// Borrow a C string argument as UTF-8
unsafe fn str_arg<'a>(name: &str, s: *const c_char) -> Result<&'a str, i32> {
    if s.is_null() {
        tracing::debug!("{} is null", name);
        return Err(HEAP_ERR_NULL_ARG);
    }
    let bytes = unsafe { CStr::from_ptr(s) }.to_bytes();
    crate::validate::str_from_bytes(name, bytes).map_err(|e| fail(name, e))
}

/// Hand a string to the caller as an owned C string
fn into_c_string(s: String) -> Result<*mut c_char, HeapError> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|e| {
            HeapError::InvalidEncoding(format!(
                "stored string contains a NUL byte at position {}",
                e.nul_position()
            ))
        })
}

fn fail(op: &str, err: HeapError) -> i32 {
    tracing::debug!("{} failed: {}", op, err);
    err.kind().code()
}
