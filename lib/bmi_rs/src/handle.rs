// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use bmi_base::types::{GridType,Location,ValueRef,ValueType,Values};
use bmi_base::errors::BmiError;

use crate::interface::Bmi;

/// Handle to one instantiated model.
///
/// The handle owns the model state but never looks into it: every operation
/// is relayed as-is and the model's result is returned unchanged. A default
/// handle has no model attached and fails every operation with
/// `BmiError::NoModel`.
#[derive(Default)]
pub struct ModelHandle {
    model: Option<Box<dyn Bmi>>
}

impl ModelHandle {
    pub fn new(model: Box<dyn Bmi>) -> ModelHandle {
        ModelHandle { model: Some(model) }
    }

    /// Attach `model`, returning the previously attached one.
    pub fn attach(&mut self, model: Box<dyn Bmi>) -> Option<Box<dyn Bmi>> {
        self.model.replace(model)
    }

    pub fn detach(&mut self) -> Option<Box<dyn Bmi>> {
        self.model.take()
    }

    pub fn is_attached(&self) -> bool {
        self.model.is_some()
    }

    fn model(&self) -> Result<&dyn Bmi, BmiError> {
        self.model.as_deref().ok_or(BmiError::NoModel)
    }

    fn model_mut(&mut self) -> Result<&mut (dyn Bmi + 'static), BmiError> {
        self.model.as_deref_mut().ok_or(BmiError::NoModel)
    }
}

impl Bmi for ModelHandle {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        self.model_mut()?.initialize(config_file)
    }

    fn update(&mut self) -> Result<(), BmiError> {
        self.model_mut()?.update()
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        self.model_mut()?.update_until(then)
    }

    fn update_frac(&mut self, frac: f64) -> Result<(), BmiError> {
        self.model_mut()?.update_frac(frac)
    }

    fn run_model(&mut self) -> Result<(), BmiError> {
        self.model_mut()?.run_model()
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        self.model_mut()?.finalize()
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        self.model()?.get_component_name()
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        self.model()?.get_input_item_count()
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        self.model()?.get_output_item_count()
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        self.model()?.get_input_var_names()
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        self.model()?.get_output_var_names()
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        self.model()?.get_var_grid(name)
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        self.model()?.get_var_type(name)
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        self.model()?.get_var_units(name)
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        self.model()?.get_var_itemsize(name)
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        self.model()?.get_var_nbytes(name)
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        self.model()?.get_var_location(name)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        self.model()?.get_current_time()
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        self.model()?.get_start_time()
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        self.model()?.get_end_time()
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        self.model()?.get_time_units()
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        self.model()?.get_time_step()
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        self.model()?.get_value(name)
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        self.model()?.get_value_ptr(name)
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.model()?.get_value_at_indices(name, inds)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        self.model_mut()?.set_value(name, src)
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        self.model_mut()?.set_value_at_indices(name, inds, src)
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.model()?.get_grid_rank(grid)
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        self.model()?.get_grid_size(grid)
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        self.model()?.get_grid_type(grid)
    }

    fn get_grid_shape(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.model()?.get_grid_shape(grid)
    }

    fn get_grid_spacing(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.model()?.get_grid_spacing(grid)
    }

    fn get_grid_origin(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.model()?.get_grid_origin(grid)
    }

    fn get_grid_x(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.model()?.get_grid_x(grid)
    }

    fn get_grid_y(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.model()?.get_grid_y(grid)
    }

    fn get_grid_z(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.model()?.get_grid_z(grid)
    }

    fn get_grid_node_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.model()?.get_grid_node_count(grid)
    }

    fn get_grid_edge_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.model()?.get_grid_edge_count(grid)
    }

    fn get_grid_face_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.model()?.get_grid_face_count(grid)
    }

    fn get_grid_edge_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.model()?.get_grid_edge_nodes(grid)
    }

    fn get_grid_face_edges(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.model()?.get_grid_face_edges(grid)
    }

    fn get_grid_face_nodes(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.model()?.get_grid_face_nodes(grid)
    }

    fn get_grid_nodes_per_face(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.model()?.get_grid_nodes_per_face(grid)
    }
}
