// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use libc::{c_char, c_double, c_int, c_void};
use std::mem;

use bmi_base::types as T;

pub const BMI_SUCCESS: c_int = 0;
pub const BMI_FAILURE: c_int = 1;

pub const BMI_MAX_UNITS_NAME: usize = T::MAX_UNITS_NAME;
pub const BMI_MAX_TYPE_NAME: usize = T::MAX_TYPE_NAME;
pub const BMI_MAX_COMPONENT_NAME: usize = T::MAX_COMPONENT_NAME;
pub const BMI_MAX_VAR_NAME: usize = T::MAX_VAR_NAME;

// Every slot receives the owning `BmiModel` as its first (`self`) argument.
pub type VoidFn = unsafe extern "C" fn(*mut c_void) -> c_int;
pub type TimeInFn = unsafe extern "C" fn(*mut c_void, c_double) -> c_int;
pub type StrInFn = unsafe extern "C" fn(*mut c_void, *const c_char) -> c_int;
pub type StrOutFn = unsafe extern "C" fn(*mut c_void, *mut c_char) -> c_int;
pub type IntOutFn = unsafe extern "C" fn(*mut c_void, *mut c_int) -> c_int;
pub type DoubleOutFn = unsafe extern "C" fn(*mut c_void, *mut c_double) -> c_int;
pub type NamesOutFn = unsafe extern "C" fn(*mut c_void, *mut *mut c_char) -> c_int;
pub type VarIntFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_int) -> c_int;
pub type VarStrFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_char) -> c_int;
pub type VarBufFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_void) -> c_int;
pub type VarPtrFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut *mut c_void) -> c_int;
pub type GetAtIndicesFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_void, *mut c_int, c_int) -> c_int;
pub type SetAtIndicesFn = unsafe extern "C" fn(*mut c_void, *const c_char, *mut c_int, c_int, *mut c_void) -> c_int;
pub type GridIntFn = unsafe extern "C" fn(*mut c_void, c_int, *mut c_int) -> c_int;
pub type GridStrFn = unsafe extern "C" fn(*mut c_void, c_int, *mut c_char) -> c_int;
pub type GridDoubleFn = unsafe extern "C" fn(*mut c_void, c_int, *mut c_double) -> c_int;

/// Operation table of one model, laid out like `BMI_Model` in bmi.h.
///
/// `update_frac` and `run_model` come after the bmi.h fields so that the
/// common prefix stays layout compatible.
#[repr(C)]
pub struct BmiModel {
    pub data: *mut c_void,

    pub initialize: Option<StrInFn>,
    pub update: Option<VoidFn>,
    pub update_until: Option<TimeInFn>,
    pub finalize: Option<VoidFn>,

    pub get_component_name: Option<StrOutFn>,
    pub get_input_item_count: Option<IntOutFn>,
    pub get_output_item_count: Option<IntOutFn>,
    pub get_input_var_names: Option<NamesOutFn>,
    pub get_output_var_names: Option<NamesOutFn>,

    pub get_var_grid: Option<VarIntFn>,
    pub get_var_type: Option<VarStrFn>,
    pub get_var_units: Option<VarStrFn>,
    pub get_var_itemsize: Option<VarIntFn>,
    pub get_var_nbytes: Option<VarIntFn>,
    pub get_var_location: Option<VarStrFn>,

    pub get_current_time: Option<DoubleOutFn>,
    pub get_start_time: Option<DoubleOutFn>,
    pub get_end_time: Option<DoubleOutFn>,
    pub get_time_units: Option<StrOutFn>,
    pub get_time_step: Option<DoubleOutFn>,

    pub get_value: Option<VarBufFn>,
    pub get_value_ptr: Option<VarPtrFn>,
    pub get_value_at_indices: Option<GetAtIndicesFn>,

    pub set_value: Option<VarBufFn>,
    pub set_value_at_indices: Option<SetAtIndicesFn>,

    pub get_grid_rank: Option<GridIntFn>,
    pub get_grid_size: Option<GridIntFn>,
    pub get_grid_type: Option<GridStrFn>,

    pub get_grid_shape: Option<GridIntFn>,
    pub get_grid_spacing: Option<GridDoubleFn>,
    pub get_grid_origin: Option<GridDoubleFn>,

    pub get_grid_x: Option<GridDoubleFn>,
    pub get_grid_y: Option<GridDoubleFn>,
    pub get_grid_z: Option<GridDoubleFn>,

    pub get_grid_node_count: Option<GridIntFn>,
    pub get_grid_edge_count: Option<GridIntFn>,
    pub get_grid_face_count: Option<GridIntFn>,
    pub get_grid_edge_nodes: Option<GridIntFn>,
    pub get_grid_face_edges: Option<GridIntFn>,
    pub get_grid_face_nodes: Option<GridIntFn>,
    pub get_grid_nodes_per_face: Option<GridIntFn>,

    pub update_frac: Option<TimeInFn>,
    pub run_model: Option<VoidFn>,
}

impl Default for BmiModel {
    fn default() -> Self {
        // null data and no slots, same as calloc
        unsafe { mem::zeroed() }
    }
}
