// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use bmi_base::types::{GridType,Location,ValueRef,ValueType,Values};
use bmi_base::errors::BmiError;

/// The Basic Model Interface contract.
///
/// Every simulation model exposes the same flat set of operations. Operations
/// with a default body are optional: a model that does not override them
/// reports `BmiError::NotImplemented`, the equivalent of an unset slot in the
/// C operation table.
///
/// Lifecycle sequencing (`initialize` before anything else, nothing after
/// `finalize`) is enforced by each model, not by the callers forwarding to it.
pub trait Bmi: Send {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError>;

    fn update(&mut self) -> Result<(), BmiError>;

    fn update_until(&mut self, then: f64) -> Result<(), BmiError>;

    /// Advance by a fraction of one time step.
    fn update_frac(&mut self, _frac: f64) -> Result<(), BmiError> {
        Err(BmiError::not_implemented("update_frac"))
    }

    /// Run from the current time to the end time.
    fn run_model(&mut self) -> Result<(), BmiError> {
        Err(BmiError::not_implemented("run_model"))
    }

    fn finalize(&mut self) -> Result<(), BmiError>;

    fn get_component_name(&self) -> Result<String, BmiError>;

    fn get_input_item_count(&self) -> Result<usize, BmiError>;

    fn get_output_item_count(&self) -> Result<usize, BmiError>;

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError>;

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError>;

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError>;

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError>;

    fn get_var_units(&self, name: &str) -> Result<String, BmiError>;

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError>;

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError>;

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError>;

    fn get_current_time(&self) -> Result<f64, BmiError>;

    fn get_start_time(&self) -> Result<f64, BmiError>;

    fn get_end_time(&self) -> Result<f64, BmiError>;

    fn get_time_units(&self) -> Result<String, BmiError>;

    fn get_time_step(&self) -> Result<f64, BmiError>;

    /// Copy of the current values of `name`.
    fn get_value(&self, name: &str) -> Result<Values, BmiError>;

    /// View into model memory. The borrow ends before the model can be
    /// updated again, so the view never outlives the state it shows.
    fn get_value_ptr(&self, _name: &str) -> Result<ValueRef<'_>, BmiError> {
        Err(BmiError::not_implemented("get_value_ptr"))
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError>;

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError>;

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError>;

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError>;

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError>;

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError>;

    // Uniform rectilinear

    fn get_grid_shape(&self, _grid: i32) -> Result<Vec<usize>, BmiError> {
        Err(BmiError::not_implemented("get_grid_shape"))
    }

    fn get_grid_spacing(&self, _grid: i32) -> Result<Vec<f64>, BmiError> {
        Err(BmiError::not_implemented("get_grid_spacing"))
    }

    fn get_grid_origin(&self, _grid: i32) -> Result<Vec<f64>, BmiError> {
        Err(BmiError::not_implemented("get_grid_origin"))
    }

    // Non-uniform rectilinear, curvilinear

    fn get_grid_x(&self, _grid: i32) -> Result<Vec<f64>, BmiError> {
        Err(BmiError::not_implemented("get_grid_x"))
    }

    fn get_grid_y(&self, _grid: i32) -> Result<Vec<f64>, BmiError> {
        Err(BmiError::not_implemented("get_grid_y"))
    }

    fn get_grid_z(&self, _grid: i32) -> Result<Vec<f64>, BmiError> {
        Err(BmiError::not_implemented("get_grid_z"))
    }

    // Unstructured

    fn get_grid_node_count(&self, _grid: i32) -> Result<usize, BmiError> {
        Err(BmiError::not_implemented("get_grid_node_count"))
    }

    fn get_grid_edge_count(&self, _grid: i32) -> Result<usize, BmiError> {
        Err(BmiError::not_implemented("get_grid_edge_count"))
    }

    fn get_grid_face_count(&self, _grid: i32) -> Result<usize, BmiError> {
        Err(BmiError::not_implemented("get_grid_face_count"))
    }

    fn get_grid_edge_nodes(&self, _grid: i32) -> Result<Vec<usize>, BmiError> {
        Err(BmiError::not_implemented("get_grid_edge_nodes"))
    }

    fn get_grid_face_edges(&self, _grid: i32) -> Result<Vec<usize>, BmiError> {
        Err(BmiError::not_implemented("get_grid_face_edges"))
    }

    fn get_grid_face_nodes(&self, _grid: i32) -> Result<Vec<usize>, BmiError> {
        Err(BmiError::not_implemented("get_grid_face_nodes"))
    }

    fn get_grid_nodes_per_face(&self, _grid: i32) -> Result<Vec<usize>, BmiError> {
        Err(BmiError::not_implemented("get_grid_nodes_per_face"))
    }
}
