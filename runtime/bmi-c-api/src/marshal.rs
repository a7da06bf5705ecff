// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Conversions between C buffers and Rust values.

use std::convert::TryFrom;
use std::ffi::CStr;
use std::panic::{self, AssertUnwindSafe};
use std::{ptr, slice, str};

use libc::{c_char, c_int, c_void};
use log::{debug, error};

use bmi_base::errors::BmiError;
use bmi_base::types::{ValueRef, ValueType, Values};

use crate::c_types::{BMI_FAILURE, BMI_SUCCESS};

fn null_argument(what: &str) -> BmiError {
    BmiError::InvalidArgument(format!("null pointer passed for {}", what))
}

fn invalid_utf8() -> BmiError {
    BmiError::InvalidArgument("string is not valid UTF-8".to_string())
}

/// Maps a result onto the two-valued C status.
pub(crate) fn status(op: &str, result: Result<(), BmiError>) -> c_int {
    match result {
        Ok(()) => BMI_SUCCESS,
        Err(err) => {
            debug!("{} failed: {}", op, err);
            BMI_FAILURE
        }
    }
}

/// Runs `f`, turning errors and panics into `BMI_FAILURE`.
pub(crate) fn guard<F>(op: &str, f: F) -> c_int
where
    F: FnOnce() -> Result<(), BmiError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => status(op, result),
        Err(_) => {
            error!("{}", BmiError::Panic(op.to_string()));
            BMI_FAILURE
        }
    }
}

/// NUL-terminated string argument. A null pointer reads as the empty string.
pub(crate) unsafe fn read_str<'a>(p: *const c_char) -> Result<&'a str, BmiError> {
    if p.is_null() {
        return Ok("");
    }
    CStr::from_ptr(p).to_str().map_err(|_| invalid_utf8())
}

/// Fixed-length string argument of `n_chars` bytes: cut at the first NUL,
/// trailing blanks dropped.
pub(crate) unsafe fn read_chars(p: *const c_char, n_chars: c_int) -> Result<String, BmiError> {
    let n = to_len(n_chars)?;
    if p.is_null() || n == 0 {
        return Ok(String::new());
    }

    let bytes = slice::from_raw_parts(p as *const u8, n);
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(n);
    let s = str::from_utf8(&bytes[..end]).map_err(|_| invalid_utf8())?;

    Ok(s.trim_end_matches(' ').to_string())
}

/// Writes `s` NUL-terminated into a buffer of `cap` bytes, truncating at a
/// character boundary if it does not fit.
pub(crate) unsafe fn write_str(dest: *mut c_char, s: &str, cap: usize) -> Result<(), BmiError> {
    if dest.is_null() {
        return Err(null_argument("string buffer"));
    }
    if cap == 0 {
        return Err(BmiError::InvalidArgument("string buffer has no room".to_string()));
    }

    let mut n = s.len().min(cap - 1);
    while !s.is_char_boundary(n) {
        n -= 1;
    }

    ptr::copy_nonoverlapping(s.as_ptr(), dest as *mut u8, n);
    *dest.add(n) = 0;
    Ok(())
}

pub(crate) unsafe fn write_scalar<T>(dest: *mut T, val: T) -> Result<(), BmiError> {
    if dest.is_null() {
        return Err(null_argument("output value"));
    }
    dest.write(val);
    Ok(())
}

pub(crate) unsafe fn write_slice<T: Copy>(dest: *mut T, src: &[T]) -> Result<(), BmiError> {
    if src.is_empty() {
        return Ok(());
    }
    if dest.is_null() {
        return Err(null_argument("output buffer"));
    }
    ptr::copy_nonoverlapping(src.as_ptr(), dest, src.len());
    Ok(())
}

pub(crate) unsafe fn write_values(dest: *mut c_void, src: ValueRef<'_>) -> Result<(), BmiError> {
    match src {
        ValueRef::Int(v) => write_slice(dest as *mut i32, v),
        ValueRef::Float(v) => write_slice(dest as *mut f32, v),
        ValueRef::Double(v) => write_slice(dest as *mut f64, v),
    }
}

/// Copies `len` items of `value_type` out of a caller buffer.
pub(crate) unsafe fn read_values(src: *const c_void, value_type: ValueType, len: usize) -> Result<Values, BmiError> {
    if len == 0 {
        return Ok(Values::zeros(value_type, 0));
    }
    if src.is_null() {
        return Err(null_argument("input buffer"));
    }

    Ok(match value_type {
        ValueType::Int => Values::Int(slice::from_raw_parts(src as *const i32, len).to_vec()),
        ValueType::Float => Values::Float(slice::from_raw_parts(src as *const f32, len).to_vec()),
        ValueType::Double => Values::Double(slice::from_raw_parts(src as *const f64, len).to_vec()),
    })
}

pub(crate) fn value_ptr(view: ValueRef<'_>) -> *mut c_void {
    match view {
        ValueRef::Int(v) => v.as_ptr() as *mut c_void,
        ValueRef::Float(v) => v.as_ptr() as *mut c_void,
        ValueRef::Double(v) => v.as_ptr() as *mut c_void,
    }
}

pub(crate) fn values_mut_ptr(vals: &mut Values) -> *mut c_void {
    match vals {
        Values::Int(v) => v.as_mut_ptr() as *mut c_void,
        Values::Float(v) => v.as_mut_ptr() as *mut c_void,
        Values::Double(v) => v.as_mut_ptr() as *mut c_void,
    }
}

pub(crate) fn to_c_int(n: usize) -> Result<c_int, BmiError> {
    c_int::try_from(n).map_err(|_| BmiError::InvalidArgument(format!("{} does not fit into a C int", n)))
}

pub(crate) fn to_c_ints(v: &[usize]) -> Result<Vec<c_int>, BmiError> {
    v.iter().map(|&n| to_c_int(n)).collect()
}

pub(crate) fn to_len(n: c_int) -> Result<usize, BmiError> {
    usize::try_from(n).map_err(|_| BmiError::InvalidArgument(format!("negative size {}", n)))
}

pub(crate) fn to_usizes(v: &[c_int]) -> Result<Vec<usize>, BmiError> {
    v.iter().map(|&n| to_len(n)).collect()
}

pub(crate) unsafe fn read_indices(inds: *const c_int, count: c_int) -> Result<Vec<usize>, BmiError> {
    let n = to_len(count)?;
    if n == 0 {
        return Ok(Vec::new());
    }
    if inds.is_null() {
        return Err(null_argument("indices"));
    }
    to_usizes(slice::from_raw_parts(inds, n))
}

/// Text up to the first NUL of a string buffer filled by C code.
pub(crate) fn from_c_buffer(buf: &[u8]) -> String {
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}
