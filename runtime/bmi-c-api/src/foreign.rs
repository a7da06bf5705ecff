// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::ffi::CString;
use std::ptr::{self, NonNull};
use std::slice;

use libc::{c_char, c_double, c_int, c_void};

use bmi_base::errors::BmiError;
use bmi_base::types::{GridType, Location, ValueRef, ValueType, Values};
use bmi_rs::Bmi;

use crate::c_types::*;
use crate::dispatch::*;
use crate::export::{register_model, release};
use crate::marshal::{from_c_buffer, to_c_int, to_c_ints, to_len, to_usizes, value_ptr, values_mut_ptr};

/// C entry point that fills a zeroed operation table, e.g. `register_bmi_heat`.
pub type RegisterFn = unsafe extern "C" fn(*mut BmiModel) -> c_int;

/// A model reached through a `BmiModel` operation table.
///
/// Every variable-length result is fetched in two calls: the size is queried
/// first and a buffer of exactly that size is handed to the fetch.
pub struct ForeignModel {
    raw: NonNull<BmiModel>,
    // state behind `data` was installed by `register_model`
    owns_state: bool,
}

// The table is only ever used by one caller at a time.
unsafe impl Send for ForeignModel {}

impl ForeignModel {
    /// Allocates an empty table and lets `register` populate it.
    pub unsafe fn new(register: RegisterFn) -> Result<ForeignModel, BmiError> {
        let model = ForeignModel::empty(false);
        check("register", register(model.raw.as_ptr()))?;
        Ok(model)
    }

    /// Routes a Rust model through the C operation table.
    pub fn from_rust(bmi: Box<dyn Bmi>) -> ForeignModel {
        let model = ForeignModel::empty(true);
        unsafe {
            register_model(model.raw.as_ptr(), bmi);
        }
        model
    }

    fn empty(owns_state: bool) -> ForeignModel {
        let raw = Box::into_raw(Box::new(BmiModel::default()));
        ForeignModel {
            raw: unsafe { NonNull::new_unchecked(raw) },
            owns_state,
        }
    }

    pub fn as_ptr(&self) -> *mut BmiModel {
        self.raw.as_ptr()
    }

    fn c_name(name: &str) -> Result<CString, BmiError> {
        CString::new(name).map_err(|_| BmiError::UnknownVariable(name.to_string()))
    }

    fn fetch_string(&self, op: &str, cap: usize, f: impl FnOnce(*mut c_char) -> c_int) -> Result<String, BmiError> {
        let mut buf = vec![0u8; cap];
        check(op, f(buf.as_mut_ptr() as *mut c_char))?;
        Ok(from_c_buffer(&buf))
    }

    fn fetch_int(&self, op: &str, f: impl FnOnce(*mut c_int) -> c_int) -> Result<c_int, BmiError> {
        let mut val: c_int = 0;
        check(op, f(&mut val))?;
        Ok(val)
    }

    fn fetch_count(&self, op: &str, f: impl FnOnce(*mut c_int) -> c_int) -> Result<usize, BmiError> {
        to_len(self.fetch_int(op, f)?)
    }

    fn fetch_double(&self, op: &str, f: impl FnOnce(*mut c_double) -> c_int) -> Result<f64, BmiError> {
        let mut val: c_double = 0.0;
        check(op, f(&mut val))?;
        Ok(val)
    }

    fn fetch_doubles(&self, op: &str, len: usize, f: impl FnOnce(*mut c_double) -> c_int) -> Result<Vec<f64>, BmiError> {
        let mut buf = vec![0.0; len];
        check(op, f(buf.as_mut_ptr()))?;
        Ok(buf)
    }

    fn fetch_ints(&self, op: &str, len: usize, f: impl FnOnce(*mut c_int) -> c_int) -> Result<Vec<usize>, BmiError> {
        let mut buf: Vec<c_int> = vec![0; len];
        check(op, f(buf.as_mut_ptr()))?;
        to_usizes(&buf)
    }

    fn fetch_names(&self, op: &str, count: usize, f: impl FnOnce(*mut *mut c_char) -> c_int) -> Result<Vec<String>, BmiError> {
        let mut bufs: Vec<Vec<u8>> = (0..count).map(|_| vec![0u8; BMI_MAX_VAR_NAME]).collect();
        let mut ptrs: Vec<*mut c_char> = bufs.iter_mut().map(|b| b.as_mut_ptr() as *mut c_char).collect();
        check(op, f(ptrs.as_mut_ptr()))?;
        Ok(bufs.iter().map(|b| from_c_buffer(b)).collect())
    }

    fn value_len(&self, name: &str) -> Result<(ValueType, usize), BmiError> {
        let value_type = self.get_var_type(name)?;
        Ok((value_type, self.get_var_nbytes(name)? / value_type.itemsize()))
    }

    /// Number of coordinates `get_grid_x/y/z` returns for `axis` (0 = x).
    fn coordinate_len(&self, grid: i32, axis: usize) -> Result<usize, BmiError> {
        if self.get_grid_type(grid)?.is_rectilinear() {
            let shape = self.get_grid_shape(grid)?;
            // shape is ordered (..., z, y, x)
            shape
                .len()
                .checked_sub(axis + 1)
                .map(|i| shape[i])
                .ok_or_else(|| BmiError::InvalidArgument(format!("grid {} has no axis {}", grid, axis)))
        } else {
            self.get_grid_size(grid)
        }
    }

    fn check_values(&self, name: &str, src: ValueRef<'_>, len: usize) -> Result<(), BmiError> {
        let value_type = self.get_var_type(name)?;
        if src.value_type() != value_type {
            return Err(BmiError::TypeMismatch(name.to_string(), value_type, src.value_type()));
        }
        if src.len() != len {
            return Err(BmiError::SizeMismatch(name.to_string(), len, src.len()));
        }
        Ok(())
    }
}

impl Drop for ForeignModel {
    fn drop(&mut self) {
        unsafe {
            if self.owns_state {
                release(self.raw.as_mut());
            }
            bmi_free(self.raw.as_ptr())
        }
    }
}

fn check(op: &str, status: c_int) -> Result<(), BmiError> {
    if status == BMI_SUCCESS {
        Ok(())
    } else {
        Err(BmiError::Failure(op.to_string()))
    }
}

impl Bmi for ForeignModel {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        let config = CString::new(config_file)
            .map_err(|_| BmiError::InvalidArgument("config path contains NUL".to_string()))?;
        check("initialize", unsafe { bmi_initialize(self.as_ptr(), config.as_ptr()) })
    }

    fn update(&mut self) -> Result<(), BmiError> {
        check("update", unsafe { bmi_update(self.as_ptr()) })
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        check("update_until", unsafe { bmi_update_until(self.as_ptr(), then) })
    }

    fn update_frac(&mut self, frac: f64) -> Result<(), BmiError> {
        check("update_frac", unsafe { bmi_update_frac(self.as_ptr(), frac) })
    }

    fn run_model(&mut self) -> Result<(), BmiError> {
        check("run_model", unsafe { bmi_run_model(self.as_ptr()) })
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        check("finalize", unsafe { bmi_finalize(self.as_ptr()) })
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        self.fetch_string("get_component_name", BMI_MAX_COMPONENT_NAME, |buf| unsafe {
            bmi_get_component_name(self.as_ptr(), buf)
        })
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        self.fetch_count("get_input_item_count", |n| unsafe { bmi_get_input_item_count(self.as_ptr(), n) })
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        self.fetch_count("get_output_item_count", |n| unsafe { bmi_get_output_item_count(self.as_ptr(), n) })
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        let count = self.get_input_item_count()?;
        self.fetch_names("get_input_var_names", count, |names| unsafe {
            bmi_get_input_var_names(self.as_ptr(), names)
        })
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        let count = self.get_output_item_count()?;
        self.fetch_names("get_output_var_names", count, |names| unsafe {
            bmi_get_output_var_names(self.as_ptr(), names)
        })
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_int("get_var_grid", |grid| unsafe { bmi_get_var_grid(self.as_ptr(), c_name.as_ptr(), grid) })
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_string("get_var_type", BMI_MAX_TYPE_NAME, |buf| unsafe {
            bmi_get_var_type(self.as_ptr(), c_name.as_ptr(), buf)
        })?
        .parse()
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_string("get_var_units", BMI_MAX_UNITS_NAME, |buf| unsafe {
            bmi_get_var_units(self.as_ptr(), c_name.as_ptr(), buf)
        })
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_count("get_var_itemsize", |n| unsafe { bmi_get_var_itemsize(self.as_ptr(), c_name.as_ptr(), n) })
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_count("get_var_nbytes", |n| unsafe { bmi_get_var_nbytes(self.as_ptr(), c_name.as_ptr(), n) })
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        let c_name = ForeignModel::c_name(name)?;
        self.fetch_string("get_var_location", BMI_MAX_TYPE_NAME, |buf| unsafe {
            bmi_get_var_location(self.as_ptr(), c_name.as_ptr(), buf)
        })?
        .parse()
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        self.fetch_double("get_current_time", |t| unsafe { bmi_get_current_time(self.as_ptr(), t) })
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        self.fetch_double("get_start_time", |t| unsafe { bmi_get_start_time(self.as_ptr(), t) })
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        self.fetch_double("get_end_time", |t| unsafe { bmi_get_end_time(self.as_ptr(), t) })
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        self.fetch_string("get_time_units", BMI_MAX_UNITS_NAME, |buf| unsafe {
            bmi_get_time_units(self.as_ptr(), buf)
        })
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        self.fetch_double("get_time_step", |t| unsafe { bmi_get_time_step(self.as_ptr(), t) })
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        let (value_type, len) = self.value_len(name)?;
        let c_name = ForeignModel::c_name(name)?;
        let mut vals = Values::zeros(value_type, len);
        check("get_value", unsafe {
            bmi_get_value(self.as_ptr(), c_name.as_ptr(), values_mut_ptr(&mut vals))
        })?;
        Ok(vals)
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        let (value_type, len) = self.value_len(name)?;
        let c_name = ForeignModel::c_name(name)?;
        let mut p: *mut c_void = ptr::null_mut();
        check("get_value_ptr", unsafe { bmi_get_value_ptr(self.as_ptr(), c_name.as_ptr(), &mut p) })?;
        if p.is_null() {
            return Err(BmiError::Failure("get_value_ptr".to_string()));
        }

        // The model keeps the memory alive at least as long as it lives.
        unsafe {
            Ok(match value_type {
                ValueType::Int => ValueRef::Int(slice::from_raw_parts(p as *const i32, len)),
                ValueType::Float => ValueRef::Float(slice::from_raw_parts(p as *const f32, len)),
                ValueType::Double => ValueRef::Double(slice::from_raw_parts(p as *const f64, len)),
            })
        }
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        let value_type = self.get_var_type(name)?;
        let c_name = ForeignModel::c_name(name)?;
        let mut c_inds = to_c_ints(inds)?;
        let mut vals = Values::zeros(value_type, inds.len());
        check("get_value_at_indices", unsafe {
            bmi_get_value_at_indices(
                self.as_ptr(),
                c_name.as_ptr(),
                values_mut_ptr(&mut vals),
                c_inds.as_mut_ptr(),
                to_c_int(inds.len())?,
            )
        })?;
        Ok(vals)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        let (_, len) = self.value_len(name)?;
        self.check_values(name, src, len)?;
        let c_name = ForeignModel::c_name(name)?;
        check("set_value", unsafe { bmi_set_value(self.as_ptr(), c_name.as_ptr(), value_ptr(src)) })
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        self.check_values(name, src, inds.len())?;
        let c_name = ForeignModel::c_name(name)?;
        let mut c_inds = to_c_ints(inds)?;
        check("set_value_at_indices", unsafe {
            bmi_set_value_at_indices(
                self.as_ptr(),
                c_name.as_ptr(),
                c_inds.as_mut_ptr(),
                to_c_int(inds.len())?,
                value_ptr(src),
            )
        })
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.fetch_count("get_grid_rank", |n| unsafe { bmi_get_grid_rank(self.as_ptr(), grid, n) })
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        self.fetch_count("get_grid_size", |n| unsafe { bmi_get_grid_size(self.as_ptr(), grid, n) })
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        self.fetch_string("get_grid_type", BMI_MAX_TYPE_NAME, |buf| unsafe {
            bmi_get_grid_type(self.as_ptr(), grid, buf)
        })?
        .parse()
    }

    fn get_grid_shape(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        let rank = self.get_grid_rank(grid)?;
        self.fetch_ints("get_grid_shape", rank, |buf| unsafe { bmi_get_grid_shape(self.as_ptr(), grid, buf) })
    }

    fn get_grid_spacing(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let rank = self.get_grid_rank(grid)?;
        self.fetch_doubles("get_grid_spacing", rank, |buf| unsafe { bmi_get_grid_spacing(self.as_ptr(), grid, buf) })
    }

    fn get_grid_origin(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let rank = self.get_grid_rank(grid)?;
        self.fetch_doubles("get_grid_origin", rank, |buf| unsafe { bmi_get_grid_origin(self.as_ptr(), grid, buf) })
    }

    fn get_grid_x(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let len = self.coordinate_len(grid, 0)?;
        self.fetch_doubles("get_grid_x", len, |buf| unsafe { bmi_get_grid_x(self.as_ptr(), grid, buf) })
    }

    fn get_grid_y(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let len = self.coordinate_len(grid, 1)?;
        self.fetch_doubles("get_grid_y", len, |buf| unsafe { bmi_get_grid_y(self.as_ptr(), grid, buf) })
    }

    fn get_grid_z(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let len = self.coordinate_len(grid, 2)?;
        self.fetch_doubles("get_grid_z", len, |buf| unsafe { bmi_get_grid_z(self.as_ptr(), grid, buf) })
    }

    fn get_grid_node_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.fetch_count("get_grid_node_count", |n| unsafe { bmi_get_grid_node_count(self.as_ptr(), grid, n) })
    }

    fn get_grid_edge_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.fetch_count("get_grid_edge_count", |n| unsafe { bmi_get_grid_edge_count(self.as_ptr(), grid, n) })
    }

    fn get_grid_face_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.fetch_count("get_grid_face_count", |n| unsafe { bmi_get_grid_face_count(self.as_ptr(), grid, n) })
    }

    fn get_grid_edge_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        let len = 2 * self.get_grid_edge_count(grid)?;
        self.fetch_ints("get_grid_edge_nodes", len, |buf| unsafe { bmi_get_grid_edge_nodes(self.as_ptr(), grid, buf) })
    }

    fn get_grid_face_edges(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        let len = self.get_grid_nodes_per_face(grid)?.iter().sum();
        self.fetch_ints("get_grid_face_edges", len, |buf| unsafe { bmi_get_grid_face_edges(self.as_ptr(), grid, buf) })
    }

    fn get_grid_face_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        let len = self.get_grid_nodes_per_face(grid)?.iter().sum();
        self.fetch_ints("get_grid_face_nodes", len, |buf| unsafe { bmi_get_grid_face_nodes(self.as_ptr(), grid, buf) })
    }

    fn get_grid_nodes_per_face(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        let len = self.get_grid_face_count(grid)?;
        self.fetch_ints("get_grid_nodes_per_face", len, |buf| unsafe {
            bmi_get_grid_nodes_per_face(self.as_ptr(), grid, buf)
        })
    }
}
