// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Flat dispatch layer over `BmiModel` operation tables.
//!
//! Each `bmi_<op>` passes its arguments unmodified to the matching slot of
//! the table and returns the slot's status unmodified. A null model or an
//! unset slot yields `BMI_FAILURE`. Callers must pass a pointer obtained from
//! `bmi_new` (or an equivalent, properly initialized `BmiModel`) and buffers
//! sized as the BMI contract requires.
#![allow(clippy::missing_safety_doc)]

use libc::{c_char, c_double, c_int, c_void};

use crate::c_types::{BmiModel, BMI_FAILURE};

macro_rules! forward {
    ($model:ident, $slot:ident $(, $arg:expr)*) => {
        match $model.as_ref().and_then(|m| m.$slot) {
            Some(f) => f($model as *mut c_void $(, $arg)*),
            None => BMI_FAILURE,
        }
    };
}

/// Allocates an empty model: null data, every slot unset.
#[no_mangle]
pub extern "C" fn bmi_new() -> *mut BmiModel {
    Box::into_raw(Box::new(BmiModel::default()))
}

/// Frees a model allocated by `bmi_new`. Model state behind `data` must have
/// been released by `finalize` beforehand.
#[no_mangle]
pub unsafe extern "C" fn bmi_free(model: *mut BmiModel) {
    if model.is_null() {
        return;
    }
    drop(Box::from_raw(model));
}

#[no_mangle]
pub unsafe extern "C" fn bmi_initialize(model: *mut BmiModel, config_file: *const c_char) -> c_int {
    forward!(model, initialize, config_file)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_update(model: *mut BmiModel) -> c_int {
    forward!(model, update)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_update_until(model: *mut BmiModel, then: c_double) -> c_int {
    forward!(model, update_until, then)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_update_frac(model: *mut BmiModel, frac: c_double) -> c_int {
    forward!(model, update_frac, frac)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_run_model(model: *mut BmiModel) -> c_int {
    forward!(model, run_model)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_finalize(model: *mut BmiModel) -> c_int {
    forward!(model, finalize)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_component_name(model: *mut BmiModel, name: *mut c_char) -> c_int {
    forward!(model, get_component_name, name)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_input_item_count(model: *mut BmiModel, count: *mut c_int) -> c_int {
    forward!(model, get_input_item_count, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_output_item_count(model: *mut BmiModel, count: *mut c_int) -> c_int {
    forward!(model, get_output_item_count, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_input_var_names(model: *mut BmiModel, names: *mut *mut c_char) -> c_int {
    forward!(model, get_input_var_names, names)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_output_var_names(model: *mut BmiModel, names: *mut *mut c_char) -> c_int {
    forward!(model, get_output_var_names, names)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_grid(model: *mut BmiModel, name: *const c_char, grid: *mut c_int) -> c_int {
    forward!(model, get_var_grid, name, grid)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_type(model: *mut BmiModel, name: *const c_char, var_type: *mut c_char) -> c_int {
    forward!(model, get_var_type, name, var_type)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_units(model: *mut BmiModel, name: *const c_char, units: *mut c_char) -> c_int {
    forward!(model, get_var_units, name, units)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_itemsize(model: *mut BmiModel, name: *const c_char, size: *mut c_int) -> c_int {
    forward!(model, get_var_itemsize, name, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_nbytes(model: *mut BmiModel, name: *const c_char, nbytes: *mut c_int) -> c_int {
    forward!(model, get_var_nbytes, name, nbytes)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_var_location(model: *mut BmiModel, name: *const c_char, location: *mut c_char) -> c_int {
    forward!(model, get_var_location, name, location)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_current_time(model: *mut BmiModel, time: *mut c_double) -> c_int {
    forward!(model, get_current_time, time)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_start_time(model: *mut BmiModel, time: *mut c_double) -> c_int {
    forward!(model, get_start_time, time)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_end_time(model: *mut BmiModel, time: *mut c_double) -> c_int {
    forward!(model, get_end_time, time)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_time_units(model: *mut BmiModel, units: *mut c_char) -> c_int {
    forward!(model, get_time_units, units)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_time_step(model: *mut BmiModel, time_step: *mut c_double) -> c_int {
    forward!(model, get_time_step, time_step)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_value(model: *mut BmiModel, name: *const c_char, dest: *mut c_void) -> c_int {
    forward!(model, get_value, name, dest)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_value_ptr(model: *mut BmiModel, name: *const c_char, dest_ptr: *mut *mut c_void) -> c_int {
    forward!(model, get_value_ptr, name, dest_ptr)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_value_at_indices(model: *mut BmiModel, name: *const c_char, dest: *mut c_void, inds: *mut c_int, count: c_int) -> c_int {
    forward!(model, get_value_at_indices, name, dest, inds, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_set_value(model: *mut BmiModel, name: *const c_char, src: *mut c_void) -> c_int {
    forward!(model, set_value, name, src)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_set_value_at_indices(model: *mut BmiModel, name: *const c_char, inds: *mut c_int, count: c_int, src: *mut c_void) -> c_int {
    forward!(model, set_value_at_indices, name, inds, count, src)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_rank(model: *mut BmiModel, grid: c_int, rank: *mut c_int) -> c_int {
    forward!(model, get_grid_rank, grid, rank)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_size(model: *mut BmiModel, grid: c_int, size: *mut c_int) -> c_int {
    forward!(model, get_grid_size, grid, size)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_type(model: *mut BmiModel, grid: c_int, grid_type: *mut c_char) -> c_int {
    forward!(model, get_grid_type, grid, grid_type)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_shape(model: *mut BmiModel, grid: c_int, shape: *mut c_int) -> c_int {
    forward!(model, get_grid_shape, grid, shape)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_spacing(model: *mut BmiModel, grid: c_int, spacing: *mut c_double) -> c_int {
    forward!(model, get_grid_spacing, grid, spacing)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_origin(model: *mut BmiModel, grid: c_int, origin: *mut c_double) -> c_int {
    forward!(model, get_grid_origin, grid, origin)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_x(model: *mut BmiModel, grid: c_int, x: *mut c_double) -> c_int {
    forward!(model, get_grid_x, grid, x)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_y(model: *mut BmiModel, grid: c_int, y: *mut c_double) -> c_int {
    forward!(model, get_grid_y, grid, y)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_z(model: *mut BmiModel, grid: c_int, z: *mut c_double) -> c_int {
    forward!(model, get_grid_z, grid, z)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_node_count(model: *mut BmiModel, grid: c_int, count: *mut c_int) -> c_int {
    forward!(model, get_grid_node_count, grid, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_edge_count(model: *mut BmiModel, grid: c_int, count: *mut c_int) -> c_int {
    forward!(model, get_grid_edge_count, grid, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_face_count(model: *mut BmiModel, grid: c_int, count: *mut c_int) -> c_int {
    forward!(model, get_grid_face_count, grid, count)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_edge_nodes(model: *mut BmiModel, grid: c_int, edge_nodes: *mut c_int) -> c_int {
    forward!(model, get_grid_edge_nodes, grid, edge_nodes)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_face_edges(model: *mut BmiModel, grid: c_int, face_edges: *mut c_int) -> c_int {
    forward!(model, get_grid_face_edges, grid, face_edges)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_face_nodes(model: *mut BmiModel, grid: c_int, face_nodes: *mut c_int) -> c_int {
    forward!(model, get_grid_face_nodes, grid, face_nodes)
}

#[no_mangle]
pub unsafe extern "C" fn bmi_get_grid_nodes_per_face(model: *mut BmiModel, grid: c_int, nodes_per_face: *mut c_int) -> c_int {
    forward!(model, get_grid_nodes_per_face, grid, nodes_per_face)
}
