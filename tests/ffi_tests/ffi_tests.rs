//! Tests for the C ABI
//!
//! These tests verify:
//! - Open/set/get/close through raw handles
//! - Status codes for each error kind
//! - Caller-owned strings and iterator protocol
//! - NULL handling

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use heapkv::ffi::*;
use heapkv::ErrorKind;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn open_temp() -> (TempDir, CString, *mut heap_store) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("ffi.heap");
    let path = CString::new(path.to_str().unwrap()).unwrap();

    let mut store = ptr::null_mut();
    let code = unsafe { heap_open(path.as_ptr(), &mut store) };
    assert_eq!(code, HEAP_OK);
    assert!(!store.is_null());
    (temp_dir, path, store)
}

fn c(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Call heap_get and take ownership of the result
fn get(store: *mut heap_store, key: &str) -> Result<String, i32> {
    let key = c(key);
    let mut value: *mut c_char = ptr::null_mut();
    let code = unsafe { heap_get(store, key.as_ptr(), &mut value) };
    if code != HEAP_OK {
        assert!(value.is_null());
        return Err(code);
    }
    let out = unsafe { CStr::from_ptr(value) }.to_str().unwrap().to_owned();
    unsafe { heap_string_free(value) };
    Ok(out)
}

fn set(store: *mut heap_store, key: &str, value: &str) -> i32 {
    let key = c(key);
    let value = c(value);
    unsafe { heap_set(store, key.as_ptr(), value.as_ptr()) }
}

// =============================================================================
// Store Function Tests
// =============================================================================

#[test]
fn test_set_get_roundtrip() {
    let (_temp, _path, store) = open_temp();

    assert_eq!(set(store, "user:1", "alice"), HEAP_OK);
    assert_eq!(get(store, "user:1"), Ok("alice".to_string()));

    assert_eq!(unsafe { heap_close(store) }, HEAP_OK);
}

#[test]
fn test_get_missing_returns_not_found() {
    let (_temp, _path, store) = open_temp();

    assert_eq!(get(store, "missing"), Err(HEAP_ERR_NOT_FOUND));

    unsafe { heap_close(store) };
}

#[test]
fn test_empty_value_is_ok() {
    let (_temp, _path, store) = open_temp();

    assert_eq!(set(store, "k", ""), HEAP_OK);
    assert_eq!(get(store, "k"), Ok(String::new()));

    unsafe { heap_close(store) };
}

#[test]
fn test_reopen_through_ffi() {
    let (_temp, path, store) = open_temp();
    assert_eq!(set(store, "user:1", "bob"), HEAP_OK);
    unsafe { heap_close(store) };

    let mut store = ptr::null_mut();
    assert_eq!(unsafe { heap_open(path.as_ptr(), &mut store) }, HEAP_OK);
    assert_eq!(get(store, "user:1"), Ok("bob".to_string()));
    unsafe { heap_close(store) };
}

#[test]
fn test_size_errors() {
    let (_temp, _path, store) = open_temp();

    assert_eq!(set(store, "", "v"), HEAP_ERR_KEY_SIZE);
    assert_eq!(set(store, &"k".repeat(256), "v"), HEAP_ERR_KEY_SIZE);
    assert_eq!(set(store, "k", &"v".repeat(65_536)), HEAP_ERR_VALUE_SIZE);

    unsafe { heap_close(store) };
}

#[test]
fn test_invalid_utf8_key() {
    let (_temp, _path, store) = open_temp();
    let bad = CString::new(vec![0xffu8, 0xfe]).unwrap();
    let value = c("v");

    let code = unsafe { heap_set(store, bad.as_ptr(), value.as_ptr()) };
    assert_eq!(code, HEAP_ERR_UTF8);

    let mut out: *mut c_char = ptr::null_mut();
    let code = unsafe { heap_get(store, bad.as_ptr(), &mut out) };
    assert_eq!(code, HEAP_ERR_UTF8);
    assert!(out.is_null());

    unsafe { heap_close(store) };
}

#[test]
fn test_codes_match_error_kinds() {
    assert_eq!(HEAP_ERR_NOT_FOUND, ErrorKind::NotFound.code());
    assert_eq!(HEAP_ERR_IO, 10);
    assert_eq!(HEAP_ERR_UTF8, 30);
    assert_eq!(HEAP_ERR_KEY_SIZE, 31);
    assert_eq!(HEAP_ERR_VALUE_SIZE, 32);
    assert_eq!(HEAP_ERR_DATA, 50);
    assert_eq!(ErrorKind::from_code(HEAP_ERR_DATA), Some(ErrorKind::DataCorruption));
    assert_eq!(ErrorKind::from_code(HEAP_OK), None);
}

#[test]
fn test_open_corrupt_file_returns_data_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.heap");
    std::fs::write(&path, [3u8, b'k']).unwrap();
    let path = CString::new(path.to_str().unwrap()).unwrap();

    let mut store = ptr::null_mut();
    let code = unsafe { heap_open(path.as_ptr(), &mut store) };

    assert_eq!(code, HEAP_ERR_DATA);
    assert!(store.is_null());
}

// =============================================================================
// Iterator Function Tests
// =============================================================================

#[test]
fn test_iterator_protocol() {
    let (_temp, _path, store) = open_temp();
    assert_eq!(set(store, "a", "1"), HEAP_OK);
    assert_eq!(set(store, "b", "2"), HEAP_OK);

    let mut iter = ptr::null_mut();
    assert_eq!(unsafe { heap_iter(store, &mut iter) }, HEAP_OK);
    assert_eq!(set(store, "c", "3"), HEAP_OK);

    let mut keys = Vec::new();
    loop {
        let mut key: *mut c_char = ptr::null_mut();
        let code = unsafe { heap_iter_next(iter, &mut key) };
        if code == HEAP_ITER_DONE {
            assert!(key.is_null());
            break;
        }
        assert_eq!(code, HEAP_OK);
        keys.push(unsafe { CStr::from_ptr(key) }.to_str().unwrap().to_owned());
        unsafe { heap_string_free(key) };
    }
    keys.sort();
    assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

    // Still done after exhaustion
    let mut key: *mut c_char = ptr::null_mut();
    assert_eq!(unsafe { heap_iter_next(iter, &mut key) }, HEAP_ITER_DONE);

    unsafe {
        heap_iter_destroy(iter);
        heap_close(store);
    }
}

#[test]
fn test_iterator_survives_close() {
    let (_temp, _path, store) = open_temp();
    assert_eq!(set(store, "a", "1"), HEAP_OK);

    let mut iter = ptr::null_mut();
    assert_eq!(unsafe { heap_iter(store, &mut iter) }, HEAP_OK);
    unsafe { heap_close(store) };

    let mut key: *mut c_char = ptr::null_mut();
    assert_eq!(unsafe { heap_iter_next(iter, &mut key) }, HEAP_OK);
    assert_eq!(unsafe { CStr::from_ptr(key) }.to_str().unwrap(), "a");
    unsafe {
        heap_string_free(key);
        heap_iter_destroy(iter);
    }
}

// =============================================================================
// NULL Handling Tests
// =============================================================================

#[test]
fn test_null_arguments() {
    let (_temp, _path, store) = open_temp();
    let key = c("k");
    let mut out: *mut c_char = ptr::null_mut();

    unsafe {
        assert_eq!(heap_open(ptr::null(), &mut ptr::null_mut()), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_get(ptr::null(), key.as_ptr(), &mut out), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_get(store, ptr::null(), &mut out), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_get(store, key.as_ptr(), ptr::null_mut()), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_set(store, key.as_ptr(), ptr::null()), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_iter(store, ptr::null_mut()), HEAP_ERR_NULL_ARG);
        assert_eq!(heap_iter_next(ptr::null_mut(), &mut out), HEAP_ERR_NULL_ARG);

        // Release functions accept NULL
        assert_eq!(heap_close(ptr::null_mut()), HEAP_OK);
        heap_iter_destroy(ptr::null_mut());
        heap_string_free(ptr::null_mut());

        heap_close(store);
    }
}

#[test]
fn test_strerror() {
    let describe = |code| unsafe { CStr::from_ptr(heap_strerror(code)) }.to_str().unwrap();

    assert_eq!(describe(HEAP_OK), "ok");
    assert_eq!(describe(HEAP_ERR_NOT_FOUND), "key not found");
    assert_eq!(describe(HEAP_ERR_DATA), "data corruption");
    assert_eq!(describe(-7), "unknown error");
}
