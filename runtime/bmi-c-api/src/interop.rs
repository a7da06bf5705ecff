// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Integer-handle entry points for callers that pass strings with an
//! explicit length (e.g. Fortran `character` arguments) and cannot keep a
//! `BmiModel` pointer around.
//!
//! Every output buffer comes with its capacity; a result that would not fit
//! fails the call instead of writing past the end.
#![allow(clippy::missing_safety_doc)]

use std::slice;
use std::sync::{Mutex, MutexGuard};

use libc::{c_char, c_double, c_int, c_void};
use log::{debug, info};
use once_cell::sync::Lazy;

use bmi_base::errors::BmiError;
use bmi_base::types::{ValueRef, ValueType};
use bmi_rs::{Bmi, ModelHandle, Registry};

use crate::c_types::*;
use crate::marshal::{
    guard, read_chars, read_indices, to_c_int, to_c_ints, to_len, value_ptr, write_scalar, write_slice, write_str,
    write_values,
};

/// Creates the model behind every new interop handle.
pub type Factory = fn() -> Box<dyn Bmi>;

static MODELS: Lazy<Mutex<Registry>> = Lazy::new(|| Mutex::new(Registry::new()));
static FACTORY: Lazy<Mutex<Option<Factory>>> = Lazy::new(|| Mutex::new(None));

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicking model leaves the table itself consistent.
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Sets the factory used by `bmi_interop_new` and returns the previous one.
pub fn install_factory(factory: Factory) -> Option<Factory> {
    lock(&FACTORY).replace(factory)
}

fn with_model<F>(op: &str, model: c_int, f: F) -> c_int
where
    F: FnOnce(&mut ModelHandle) -> Result<(), BmiError>,
{
    guard(op, || {
        let mut models = lock(&MODELS);
        f(models.get_mut(model)?)
    })
}

fn fits(what: &str, len: usize, cap: c_int) -> Result<(), BmiError> {
    let cap = to_len(cap)?;
    if len > cap {
        return Err(BmiError::SizeMismatch(what.to_string(), len, cap));
    }
    Ok(())
}

unsafe fn write_chars(dest: *mut c_char, s: &str, n_chars: c_int) -> Result<(), BmiError> {
    write_str(dest, s, to_len(n_chars)?)
}

unsafe fn write_names(names: *mut *mut c_char, list: &[String], n_names: c_int) -> Result<(), BmiError> {
    fits("names", list.len(), n_names)?;
    if list.is_empty() {
        return Ok(());
    }
    if names.is_null() {
        return Err(BmiError::InvalidArgument("null pointer passed for name list".to_string()));
    }
    for (i, name) in list.iter().enumerate() {
        write_str(*names.add(i), name, BMI_MAX_VAR_NAME)?;
    }
    Ok(())
}

unsafe fn write_ints(dest: *mut c_int, what: &str, vals: &[usize], size: c_int) -> Result<(), BmiError> {
    fits(what, vals.len(), size)?;
    write_slice(dest, &to_c_ints(vals)?)
}

unsafe fn write_doubles(dest: *mut c_double, what: &str, vals: &[f64], size: c_int) -> Result<(), BmiError> {
    fits(what, vals.len(), size)?;
    write_slice(dest, vals)
}

/// Creates a model with the installed factory and returns its handle, or -1
/// if the factory failed or no handles are left. With no factory installed
/// the handle stays empty and every call on it fails.
#[no_mangle]
pub extern "C" fn bmi_interop_new() -> c_int {
    let mut id = -1;
    guard("new", || {
        let factory = *lock(&FACTORY);
        let handle = match factory {
            Some(make) => ModelHandle::new(make()),
            None => ModelHandle::default(),
        };
        id = lock(&MODELS).insert(handle)?;
        info!("created interop model {}", id);
        Ok(())
    });
    id
}

/// Drops the model behind `model`. The handle is not reused.
#[no_mangle]
pub extern "C" fn bmi_interop_free(model: c_int) -> c_int {
    guard("free", || {
        lock(&MODELS).remove(model)?;
        debug!("freed interop model {}", model);
        Ok(())
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_initialize(model: c_int, config_file: *const c_char, n_chars: c_int) -> c_int {
    with_model("initialize", model, |m| m.initialize(&read_chars(config_file, n_chars)?))
}

#[no_mangle]
pub extern "C" fn bmi_interop_update(model: c_int) -> c_int {
    with_model("update", model, |m| m.update())
}

#[no_mangle]
pub extern "C" fn bmi_interop_update_until(model: c_int, until: c_double) -> c_int {
    with_model("update_until", model, |m| m.update_until(until))
}

#[no_mangle]
pub extern "C" fn bmi_interop_finalize(model: c_int) -> c_int {
    with_model("finalize", model, |m| m.finalize())
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_component_name(model: c_int, name: *mut c_char, n_chars: c_int) -> c_int {
    with_model("get_component_name", model, |m| write_chars(name, &m.get_component_name()?, n_chars))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_input_item_count(model: c_int, count: *mut c_int) -> c_int {
    with_model("get_input_item_count", model, |m| write_scalar(count, to_c_int(m.get_input_item_count()?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_output_item_count(model: c_int, count: *mut c_int) -> c_int {
    with_model("get_output_item_count", model, |m| write_scalar(count, to_c_int(m.get_output_item_count()?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_input_var_names(model: c_int, names: *mut *mut c_char, n_names: c_int) -> c_int {
    with_model("get_input_var_names", model, |m| write_names(names, &m.get_input_var_names()?, n_names))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_output_var_names(model: c_int, names: *mut *mut c_char, n_names: c_int) -> c_int {
    with_model("get_output_var_names", model, |m| write_names(names, &m.get_output_var_names()?, n_names))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_start_time(model: c_int, time: *mut c_double) -> c_int {
    with_model("get_start_time", model, |m| write_scalar(time, m.get_start_time()?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_end_time(model: c_int, time: *mut c_double) -> c_int {
    with_model("get_end_time", model, |m| write_scalar(time, m.get_end_time()?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_current_time(model: c_int, time: *mut c_double) -> c_int {
    with_model("get_current_time", model, |m| write_scalar(time, m.get_current_time()?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_time_step(model: c_int, time: *mut c_double) -> c_int {
    with_model("get_time_step", model, |m| write_scalar(time, m.get_time_step()?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_time_units(model: c_int, units: *mut c_char, n_chars: c_int) -> c_int {
    with_model("get_time_units", model, |m| write_chars(units, &m.get_time_units()?, n_chars))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_grid(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    grid_id: *mut c_int,
) -> c_int {
    with_model("get_var_grid", model, |m| {
        write_scalar(grid_id, m.get_var_grid(&read_chars(var_name, n_chars)?)?)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_type(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    var_type: *mut c_char,
    m_chars: c_int,
) -> c_int {
    with_model("get_var_type", model, |m| {
        let value_type = m.get_var_type(&read_chars(var_name, n_chars)?)?;
        write_chars(var_type, value_type.as_str(), m_chars)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_units(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    units: *mut c_char,
    m_chars: c_int,
) -> c_int {
    with_model("get_var_units", model, |m| {
        write_chars(units, &m.get_var_units(&read_chars(var_name, n_chars)?)?, m_chars)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_itemsize(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    itemsize: *mut c_int,
) -> c_int {
    with_model("get_var_itemsize", model, |m| {
        write_scalar(itemsize, to_c_int(m.get_var_itemsize(&read_chars(var_name, n_chars)?)?)?)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_nbytes(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    nbytes: *mut c_int,
) -> c_int {
    with_model("get_var_nbytes", model, |m| {
        write_scalar(nbytes, to_c_int(m.get_var_nbytes(&read_chars(var_name, n_chars)?)?)?)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_var_location(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    location: *mut c_char,
    m_chars: c_int,
) -> c_int {
    with_model("get_var_location", model, |m| {
        let loc = m.get_var_location(&read_chars(var_name, n_chars)?)?;
        write_chars(location, loc.as_str(), m_chars)
    })
}

unsafe fn get_typed(
    op: &str,
    model: c_int,
    expected: ValueType,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    with_model(op, model, |m| {
        let name = read_chars(var_name, n_chars)?;
        let vals = m.get_value(&name)?;
        if vals.value_type() != expected {
            return Err(BmiError::TypeMismatch(name, expected, vals.value_type()));
        }
        fits(&name, vals.len(), size)?;
        write_values(buffer, vals.as_ref())
    })
}

unsafe fn set_typed(
    op: &str,
    model: c_int,
    expected: ValueType,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    with_model(op, model, |m| {
        let name = read_chars(var_name, n_chars)?;
        let n = to_len(size)?;
        if n > 0 && buffer.is_null() {
            return Err(BmiError::InvalidArgument("null pointer passed for input buffer".to_string()));
        }
        let src = match expected {
            ValueType::Int => ValueRef::Int(typed_slice(buffer as *const i32, n)),
            ValueType::Float => ValueRef::Float(typed_slice(buffer as *const f32, n)),
            ValueType::Double => ValueRef::Double(typed_slice(buffer as *const f64, n)),
        };
        m.set_value(&name, src)
    })
}

unsafe fn typed_slice<'a, T>(p: *const T, n: usize) -> &'a [T] {
    if n == 0 {
        &[]
    } else {
        slice::from_raw_parts(p, n)
    }
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_value_int(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    get_typed("get_value_int", model, ValueType::Int, var_name, n_chars, buffer, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_value_float(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    get_typed("get_value_float", model, ValueType::Float, var_name, n_chars, buffer, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_value_double(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    get_typed("get_value_double", model, ValueType::Double, var_name, n_chars, buffer, size)
}

/// The returned address stays valid until the next call that changes the
/// model.
#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_value_ptr(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    ptr: *mut *mut c_void,
) -> c_int {
    with_model("get_value_ptr", model, |m| {
        let view = m.get_value_ptr(&read_chars(var_name, n_chars)?)?;
        write_scalar(ptr, value_ptr(view))
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_set_value_int(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    set_typed("set_value_int", model, ValueType::Int, var_name, n_chars, buffer, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_set_value_float(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    set_typed("set_value_float", model, ValueType::Float, var_name, n_chars, buffer, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_set_value_double(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    size: c_int,
) -> c_int {
    set_typed("set_value_double", model, ValueType::Double, var_name, n_chars, buffer, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_value_at_indices_double(
    model: c_int,
    var_name: *const c_char,
    n_chars: c_int,
    buffer: *mut c_void,
    inds: *const c_int,
    count: c_int,
) -> c_int {
    with_model("get_value_at_indices_double", model, |m| {
        let name = read_chars(var_name, n_chars)?;
        let vals = m.get_value_at_indices(&name, &read_indices(inds, count)?)?;
        if vals.value_type() != ValueType::Double {
            return Err(BmiError::TypeMismatch(name, ValueType::Double, vals.value_type()));
        }
        write_values(buffer, vals.as_ref())
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_type(model: c_int, grid_id: c_int, grid_type: *mut c_char, n_chars: c_int) -> c_int {
    with_model("get_grid_type", model, |m| write_chars(grid_type, m.get_grid_type(grid_id)?.as_str(), n_chars))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_rank(model: c_int, grid_id: c_int, rank: *mut c_int) -> c_int {
    with_model("get_grid_rank", model, |m| write_scalar(rank, to_c_int(m.get_grid_rank(grid_id)?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_size(model: c_int, grid_id: c_int, size: *mut c_int) -> c_int {
    with_model("get_grid_size", model, |m| write_scalar(size, to_c_int(m.get_grid_size(grid_id)?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_shape(model: c_int, grid_id: c_int, shape: *mut c_int, rank: c_int) -> c_int {
    with_model("get_grid_shape", model, |m| write_ints(shape, "shape", &m.get_grid_shape(grid_id)?, rank))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_spacing(model: c_int, grid_id: c_int, spacing: *mut c_double, rank: c_int) -> c_int {
    with_model("get_grid_spacing", model, |m| write_doubles(spacing, "spacing", &m.get_grid_spacing(grid_id)?, rank))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_origin(model: c_int, grid_id: c_int, origin: *mut c_double, rank: c_int) -> c_int {
    with_model("get_grid_origin", model, |m| write_doubles(origin, "origin", &m.get_grid_origin(grid_id)?, rank))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_x(model: c_int, grid_id: c_int, x: *mut c_double, size: c_int) -> c_int {
    with_model("get_grid_x", model, |m| write_doubles(x, "x", &m.get_grid_x(grid_id)?, size))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_y(model: c_int, grid_id: c_int, y: *mut c_double, size: c_int) -> c_int {
    with_model("get_grid_y", model, |m| write_doubles(y, "y", &m.get_grid_y(grid_id)?, size))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_z(model: c_int, grid_id: c_int, z: *mut c_double, size: c_int) -> c_int {
    with_model("get_grid_z", model, |m| write_doubles(z, "z", &m.get_grid_z(grid_id)?, size))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_node_count(model: c_int, grid_id: c_int, count: *mut c_int) -> c_int {
    with_model("get_grid_node_count", model, |m| write_scalar(count, to_c_int(m.get_grid_node_count(grid_id)?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_edge_count(model: c_int, grid_id: c_int, count: *mut c_int) -> c_int {
    with_model("get_grid_edge_count", model, |m| write_scalar(count, to_c_int(m.get_grid_edge_count(grid_id)?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_face_count(model: c_int, grid_id: c_int, count: *mut c_int) -> c_int {
    with_model("get_grid_face_count", model, |m| write_scalar(count, to_c_int(m.get_grid_face_count(grid_id)?)?))
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_edge_nodes(model: c_int, grid_id: c_int, edge_nodes: *mut c_int, size: c_int) -> c_int {
    with_model("get_grid_edge_nodes", model, |m| {
        write_ints(edge_nodes, "edge_nodes", &m.get_grid_edge_nodes(grid_id)?, size)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_face_edges(model: c_int, grid_id: c_int, face_edges: *mut c_int, size: c_int) -> c_int {
    with_model("get_grid_face_edges", model, |m| {
        write_ints(face_edges, "face_edges", &m.get_grid_face_edges(grid_id)?, size)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_face_nodes(model: c_int, grid_id: c_int, face_nodes: *mut c_int, size: c_int) -> c_int {
    with_model("get_grid_face_nodes", model, |m| {
        write_ints(face_nodes, "face_nodes", &m.get_grid_face_nodes(grid_id)?, size)
    })
}

#[no_mangle]
pub unsafe extern "C" fn bmi_interop_get_grid_nodes_per_face(
    model: c_int,
    grid_id: c_int,
    nodes_per_face: *mut c_int,
    size: c_int,
) -> c_int {
    with_model("get_grid_nodes_per_face", model, |m| {
        write_ints(nodes_per_face, "nodes_per_face", &m.get_grid_nodes_per_face(grid_id)?, size)
    })
}
