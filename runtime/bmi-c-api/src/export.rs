// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Exposes a Rust `Bmi` model through a `BmiModel` operation table.

use std::ptr;

use libc::{c_char, c_double, c_int, c_void};

use bmi_base::errors::BmiError;
use bmi_rs::Bmi;

use crate::c_types::*;
use crate::marshal::{
    guard, read_indices, read_str, read_values, to_c_int, to_c_ints, value_ptr, write_scalar, write_slice,
    write_str, write_values,
};

type BoxedModel = Box<dyn Bmi>;

/// Installs `bmi` as the state of `model` and points every slot at it.
///
/// `model` must be zeroed (e.g. from `bmi_new`) or have been filled by this
/// function before; state installed earlier is dropped.
pub unsafe fn register_model(model: *mut BmiModel, bmi: Box<dyn Bmi>) -> c_int {
    let handle = match model.as_mut() {
        Some(handle) => handle,
        None => return BMI_FAILURE,
    };
    let released = guard("register", || {
        release(handle);
        Ok(())
    });
    if released != BMI_SUCCESS {
        return BMI_FAILURE;
    }

    handle.data = Box::into_raw(Box::new(bmi)) as *mut c_void;

    handle.initialize = Some(initialize);
    handle.update = Some(update);
    handle.update_until = Some(update_until);
    handle.finalize = Some(finalize);

    handle.get_component_name = Some(get_component_name);
    handle.get_input_item_count = Some(get_input_item_count);
    handle.get_output_item_count = Some(get_output_item_count);
    handle.get_input_var_names = Some(get_input_var_names);
    handle.get_output_var_names = Some(get_output_var_names);

    handle.get_var_grid = Some(get_var_grid);
    handle.get_var_type = Some(get_var_type);
    handle.get_var_units = Some(get_var_units);
    handle.get_var_itemsize = Some(get_var_itemsize);
    handle.get_var_nbytes = Some(get_var_nbytes);
    handle.get_var_location = Some(get_var_location);

    handle.get_current_time = Some(get_current_time);
    handle.get_start_time = Some(get_start_time);
    handle.get_end_time = Some(get_end_time);
    handle.get_time_units = Some(get_time_units);
    handle.get_time_step = Some(get_time_step);

    handle.get_value = Some(get_value);
    handle.get_value_ptr = Some(get_value_ptr);
    handle.get_value_at_indices = Some(get_value_at_indices);

    handle.set_value = Some(set_value);
    handle.set_value_at_indices = Some(set_value_at_indices);

    handle.get_grid_rank = Some(get_grid_rank);
    handle.get_grid_size = Some(get_grid_size);
    handle.get_grid_type = Some(get_grid_type);

    handle.get_grid_shape = Some(get_grid_shape);
    handle.get_grid_spacing = Some(get_grid_spacing);
    handle.get_grid_origin = Some(get_grid_origin);

    handle.get_grid_x = Some(get_grid_x);
    handle.get_grid_y = Some(get_grid_y);
    handle.get_grid_z = Some(get_grid_z);

    handle.get_grid_node_count = Some(get_grid_node_count);
    handle.get_grid_edge_count = Some(get_grid_edge_count);
    handle.get_grid_face_count = Some(get_grid_face_count);
    handle.get_grid_edge_nodes = Some(get_grid_edge_nodes);
    handle.get_grid_face_edges = Some(get_grid_face_edges);
    handle.get_grid_face_nodes = Some(get_grid_face_nodes);
    handle.get_grid_nodes_per_face = Some(get_grid_nodes_per_face);

    handle.update_frac = Some(update_frac);
    handle.run_model = Some(run_model);

    BMI_SUCCESS
}

/// Drops the model state installed by `register_model`, if any. The slots
/// stay in place and fail from now on.
pub unsafe fn release(model: &mut BmiModel) {
    let data = std::mem::replace(&mut model.data, ptr::null_mut());
    if !data.is_null() {
        drop(Box::from_raw(data as *mut BoxedModel));
    }
}

unsafe fn model_of<'a>(this: *mut c_void) -> Result<&'a mut dyn Bmi, BmiError> {
    let handle = (this as *mut BmiModel)
        .as_mut()
        .ok_or_else(|| BmiError::InvalidArgument("null model".to_string()))?;
    let boxed = (handle.data as *mut BoxedModel).as_mut().ok_or(BmiError::Finalized)?;
    Ok(boxed.as_mut())
}

unsafe fn write_names(names: *mut *mut c_char, list: &[String]) -> Result<(), BmiError> {
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

unsafe extern "C" fn initialize(this: *mut c_void, config_file: *const c_char) -> c_int {
    guard("initialize", || model_of(this)?.initialize(read_str(config_file)?))
}

unsafe extern "C" fn update(this: *mut c_void) -> c_int {
    guard("update", || model_of(this)?.update())
}

unsafe extern "C" fn update_until(this: *mut c_void, then: c_double) -> c_int {
    guard("update_until", || model_of(this)?.update_until(then))
}

unsafe extern "C" fn update_frac(this: *mut c_void, frac: c_double) -> c_int {
    guard("update_frac", || model_of(this)?.update_frac(frac))
}

unsafe extern "C" fn run_model(this: *mut c_void) -> c_int {
    guard("run_model", || model_of(this)?.run_model())
}

unsafe extern "C" fn finalize(this: *mut c_void) -> c_int {
    let status = guard("finalize", || model_of(this)?.finalize());
    let released = guard("release", || {
        if let Some(handle) = (this as *mut BmiModel).as_mut() {
            release(handle);
        }
        Ok(())
    });
    if status == BMI_SUCCESS {
        released
    } else {
        status
    }
}

unsafe extern "C" fn get_component_name(this: *mut c_void, name: *mut c_char) -> c_int {
    guard("get_component_name", || {
        write_str(name, &model_of(this)?.get_component_name()?, BMI_MAX_COMPONENT_NAME)
    })
}

unsafe extern "C" fn get_input_item_count(this: *mut c_void, count: *mut c_int) -> c_int {
    guard("get_input_item_count", || {
        write_scalar(count, to_c_int(model_of(this)?.get_input_item_count()?)?)
    })
}

unsafe extern "C" fn get_output_item_count(this: *mut c_void, count: *mut c_int) -> c_int {
    guard("get_output_item_count", || {
        write_scalar(count, to_c_int(model_of(this)?.get_output_item_count()?)?)
    })
}

unsafe extern "C" fn get_input_var_names(this: *mut c_void, names: *mut *mut c_char) -> c_int {
    guard("get_input_var_names", || write_names(names, &model_of(this)?.get_input_var_names()?))
}

unsafe extern "C" fn get_output_var_names(this: *mut c_void, names: *mut *mut c_char) -> c_int {
    guard("get_output_var_names", || write_names(names, &model_of(this)?.get_output_var_names()?))
}

unsafe extern "C" fn get_var_grid(this: *mut c_void, name: *const c_char, grid: *mut c_int) -> c_int {
    guard("get_var_grid", || write_scalar(grid, model_of(this)?.get_var_grid(read_str(name)?)?))
}

unsafe extern "C" fn get_var_type(this: *mut c_void, name: *const c_char, var_type: *mut c_char) -> c_int {
    guard("get_var_type", || {
        let value_type = model_of(this)?.get_var_type(read_str(name)?)?;
        write_str(var_type, value_type.as_str(), BMI_MAX_TYPE_NAME)
    })
}

unsafe extern "C" fn get_var_units(this: *mut c_void, name: *const c_char, units: *mut c_char) -> c_int {
    guard("get_var_units", || {
        write_str(units, &model_of(this)?.get_var_units(read_str(name)?)?, BMI_MAX_UNITS_NAME)
    })
}

unsafe extern "C" fn get_var_itemsize(this: *mut c_void, name: *const c_char, size: *mut c_int) -> c_int {
    guard("get_var_itemsize", || {
        write_scalar(size, to_c_int(model_of(this)?.get_var_itemsize(read_str(name)?)?)?)
    })
}

unsafe extern "C" fn get_var_nbytes(this: *mut c_void, name: *const c_char, nbytes: *mut c_int) -> c_int {
    guard("get_var_nbytes", || {
        write_scalar(nbytes, to_c_int(model_of(this)?.get_var_nbytes(read_str(name)?)?)?)
    })
}

unsafe extern "C" fn get_var_location(this: *mut c_void, name: *const c_char, location: *mut c_char) -> c_int {
    guard("get_var_location", || {
        let loc = model_of(this)?.get_var_location(read_str(name)?)?;
        write_str(location, loc.as_str(), BMI_MAX_TYPE_NAME)
    })
}

unsafe extern "C" fn get_current_time(this: *mut c_void, time: *mut c_double) -> c_int {
    guard("get_current_time", || write_scalar(time, model_of(this)?.get_current_time()?))
}

unsafe extern "C" fn get_start_time(this: *mut c_void, time: *mut c_double) -> c_int {
    guard("get_start_time", || write_scalar(time, model_of(this)?.get_start_time()?))
}

unsafe extern "C" fn get_end_time(this: *mut c_void, time: *mut c_double) -> c_int {
    guard("get_end_time", || write_scalar(time, model_of(this)?.get_end_time()?))
}

unsafe extern "C" fn get_time_units(this: *mut c_void, units: *mut c_char) -> c_int {
    guard("get_time_units", || write_str(units, &model_of(this)?.get_time_units()?, BMI_MAX_UNITS_NAME))
}

unsafe extern "C" fn get_time_step(this: *mut c_void, time_step: *mut c_double) -> c_int {
    guard("get_time_step", || write_scalar(time_step, model_of(this)?.get_time_step()?))
}

unsafe extern "C" fn get_value(this: *mut c_void, name: *const c_char, dest: *mut c_void) -> c_int {
    guard("get_value", || {
        let vals = model_of(this)?.get_value(read_str(name)?)?;
        write_values(dest, vals.as_ref())
    })
}

unsafe extern "C" fn get_value_ptr(this: *mut c_void, name: *const c_char, dest_ptr: *mut *mut c_void) -> c_int {
    guard("get_value_ptr", || {
        let view = model_of(this)?.get_value_ptr(read_str(name)?)?;
        write_scalar(dest_ptr, value_ptr(view))
    })
}

unsafe extern "C" fn get_value_at_indices(
    this: *mut c_void,
    name: *const c_char,
    dest: *mut c_void,
    inds: *mut c_int,
    count: c_int,
) -> c_int {
    guard("get_value_at_indices", || {
        let inds = read_indices(inds, count)?;
        let vals = model_of(this)?.get_value_at_indices(read_str(name)?, &inds)?;
        write_values(dest, vals.as_ref())
    })
}

unsafe extern "C" fn set_value(this: *mut c_void, name: *const c_char, src: *mut c_void) -> c_int {
    guard("set_value", || {
        let model = model_of(this)?;
        let name = read_str(name)?;
        let value_type = model.get_var_type(name)?;
        let len = model.get_var_nbytes(name)? / value_type.itemsize();
        let vals = read_values(src, value_type, len)?;
        model.set_value(name, vals.as_ref())
    })
}

unsafe extern "C" fn set_value_at_indices(
    this: *mut c_void,
    name: *const c_char,
    inds: *mut c_int,
    count: c_int,
    src: *mut c_void,
) -> c_int {
    guard("set_value_at_indices", || {
        let model = model_of(this)?;
        let name = read_str(name)?;
        let inds = read_indices(inds, count)?;
        let vals = read_values(src, model.get_var_type(name)?, inds.len())?;
        model.set_value_at_indices(name, &inds, vals.as_ref())
    })
}

unsafe extern "C" fn get_grid_rank(this: *mut c_void, grid: c_int, rank: *mut c_int) -> c_int {
    guard("get_grid_rank", || write_scalar(rank, to_c_int(model_of(this)?.get_grid_rank(grid)?)?))
}

unsafe extern "C" fn get_grid_size(this: *mut c_void, grid: c_int, size: *mut c_int) -> c_int {
    guard("get_grid_size", || write_scalar(size, to_c_int(model_of(this)?.get_grid_size(grid)?)?))
}

unsafe extern "C" fn get_grid_type(this: *mut c_void, grid: c_int, grid_type: *mut c_char) -> c_int {
    guard("get_grid_type", || {
        let kind = model_of(this)?.get_grid_type(grid)?;
        write_str(grid_type, kind.as_str(), BMI_MAX_TYPE_NAME)
    })
}

unsafe extern "C" fn get_grid_shape(this: *mut c_void, grid: c_int, shape: *mut c_int) -> c_int {
    guard("get_grid_shape", || write_slice(shape, &to_c_ints(&model_of(this)?.get_grid_shape(grid)?)?))
}

unsafe extern "C" fn get_grid_spacing(this: *mut c_void, grid: c_int, spacing: *mut c_double) -> c_int {
    guard("get_grid_spacing", || write_slice(spacing, &model_of(this)?.get_grid_spacing(grid)?))
}

unsafe extern "C" fn get_grid_origin(this: *mut c_void, grid: c_int, origin: *mut c_double) -> c_int {
    guard("get_grid_origin", || write_slice(origin, &model_of(this)?.get_grid_origin(grid)?))
}

unsafe extern "C" fn get_grid_x(this: *mut c_void, grid: c_int, x: *mut c_double) -> c_int {
    guard("get_grid_x", || write_slice(x, &model_of(this)?.get_grid_x(grid)?))
}

unsafe extern "C" fn get_grid_y(this: *mut c_void, grid: c_int, y: *mut c_double) -> c_int {
    guard("get_grid_y", || write_slice(y, &model_of(this)?.get_grid_y(grid)?))
}

unsafe extern "C" fn get_grid_z(this: *mut c_void, grid: c_int, z: *mut c_double) -> c_int {
    guard("get_grid_z", || write_slice(z, &model_of(this)?.get_grid_z(grid)?))
}

unsafe extern "C" fn get_grid_node_count(this: *mut c_void, grid: c_int, count: *mut c_int) -> c_int {
    guard("get_grid_node_count", || {
        write_scalar(count, to_c_int(model_of(this)?.get_grid_node_count(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_edge_count(this: *mut c_void, grid: c_int, count: *mut c_int) -> c_int {
    guard("get_grid_edge_count", || {
        write_scalar(count, to_c_int(model_of(this)?.get_grid_edge_count(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_face_count(this: *mut c_void, grid: c_int, count: *mut c_int) -> c_int {
    guard("get_grid_face_count", || {
        write_scalar(count, to_c_int(model_of(this)?.get_grid_face_count(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_edge_nodes(this: *mut c_void, grid: c_int, edge_nodes: *mut c_int) -> c_int {
    guard("get_grid_edge_nodes", || {
        write_slice(edge_nodes, &to_c_ints(&model_of(this)?.get_grid_edge_nodes(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_face_edges(this: *mut c_void, grid: c_int, face_edges: *mut c_int) -> c_int {
    guard("get_grid_face_edges", || {
        write_slice(face_edges, &to_c_ints(&model_of(this)?.get_grid_face_edges(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_face_nodes(this: *mut c_void, grid: c_int, face_nodes: *mut c_int) -> c_int {
    guard("get_grid_face_nodes", || {
        write_slice(face_nodes, &to_c_ints(&model_of(this)?.get_grid_face_nodes(grid)?)?)
    })
}

unsafe extern "C" fn get_grid_nodes_per_face(this: *mut c_void, grid: c_int, nodes_per_face: *mut c_int) -> c_int {
    guard("get_grid_nodes_per_face", || {
        write_slice(nodes_per_face, &to_c_ints(&model_of(this)?.get_grid_nodes_per_face(grid)?)?)
    })
}
