// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

//! Heat diffusion on a rectangular plate, exposed as a BMI model.

pub mod config;
pub mod heat;

use std::slice;

use libc::c_int;
use log::info;

use bmi_c_api::{register_model, BmiModel};
use bmi_rs::errors::BmiError;
use bmi_rs::types::{GridType, Location, ValueRef, ValueType, Values};
use bmi_rs::{Bmi, Lifecycle};

pub use config::HeatConfig;
use heat::HeatSolver;

pub const TEMPERATURE: &str = "plate_surface__temperature";
pub const DIFFUSIVITY: &str = "plate_surface__thermal_diffusivity";
pub const MODEL_ID: &str = "model__identification_number";

const INPUTS: [&str; 2] = [TEMPERATURE, DIFFUSIVITY];
const OUTPUTS: [&str; 3] = [TEMPERATURE, DIFFUSIVITY, MODEL_ID];

const PLATE_GRID: i32 = 0;
const SCALAR_GRID: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
enum HeatVar {
    Temperature,
    Diffusivity,
    ModelId,
}

impl HeatVar {
    fn from_name(name: &str) -> Result<HeatVar, BmiError> {
        match name {
            TEMPERATURE => Ok(HeatVar::Temperature),
            DIFFUSIVITY => Ok(HeatVar::Diffusivity),
            MODEL_ID => Ok(HeatVar::ModelId),
            _ => Err(BmiError::UnknownVariable(name.to_string())),
        }
    }

    fn grid(self) -> i32 {
        match self {
            HeatVar::Temperature => PLATE_GRID,
            _ => SCALAR_GRID,
        }
    }

    fn value_type(self) -> ValueType {
        match self {
            HeatVar::ModelId => ValueType::Int,
            _ => ValueType::Double,
        }
    }

    fn units(self) -> &'static str {
        match self {
            HeatVar::Temperature => "K",
            HeatVar::Diffusivity => "m2 s-1",
            HeatVar::ModelId => "1",
        }
    }
}

/// BMI model of the heat equation. Configuration is read in `initialize`.
#[derive(Debug, Default)]
pub struct Heat {
    lifecycle: Lifecycle,
    config: HeatConfig,
    solver: Option<HeatSolver>,
}

impl Heat {
    pub fn new() -> Heat {
        Heat::default()
    }

    fn solver(&self) -> Result<&HeatSolver, BmiError> {
        self.lifecycle.require_initialized()?;
        self.solver.as_ref().ok_or(BmiError::NotInitialized)
    }

    fn solver_mut(&mut self) -> Result<&mut HeatSolver, BmiError> {
        self.lifecycle.require_initialized()?;
        self.solver.as_mut().ok_or(BmiError::NotInitialized)
    }

    fn check_grid(&self, grid: i32) -> Result<(), BmiError> {
        match grid {
            PLATE_GRID | SCALAR_GRID => Ok(()),
            _ => Err(BmiError::UnknownGrid(grid)),
        }
    }

    fn plate_only(&self, grid: i32, op: &str) -> Result<&HeatSolver, BmiError> {
        self.check_grid(grid)?;
        if grid != PLATE_GRID {
            return Err(BmiError::not_implemented(op));
        }
        self.solver()
    }
}

impl Bmi for Heat {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        let config = HeatConfig::load(config_file)?;
        self.lifecycle.begin()?;

        let solver = HeatSolver::new(&config);
        info!(
            "heat model initialized on a {}x{} grid, time step {}",
            solver.rows,
            solver.cols,
            solver.time_step()
        );
        self.solver = Some(solver);
        self.config = config;
        Ok(())
    }

    fn update(&mut self) -> Result<(), BmiError> {
        let solver = self.solver_mut()?;
        let dt = solver.time_step();
        solver.advance(dt);
        Ok(())
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        let solver = self.solver_mut()?;
        let dt = solver.time_step();
        while solver.time + dt <= then {
            solver.advance(dt);
        }
        let rest = then - solver.time;
        if rest > 0.0 {
            solver.advance(rest);
        }
        Ok(())
    }

    fn update_frac(&mut self, frac: f64) -> Result<(), BmiError> {
        if !(frac > 0.0 && frac <= 1.0) {
            return Err(BmiError::InvalidArgument(format!("time step fraction {} not in (0, 1]", frac)));
        }
        let solver = self.solver_mut()?;
        let dt = solver.time_step();
        solver.advance(frac * dt);
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        self.lifecycle.end()?;
        self.solver = None;
        Ok(())
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        Ok("The 2D Heat Equation".to_string())
    }

    fn get_input_item_count(&self) -> Result<usize, BmiError> {
        Ok(INPUTS.len())
    }

    fn get_output_item_count(&self) -> Result<usize, BmiError> {
        Ok(OUTPUTS.len())
    }

    fn get_input_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(INPUTS.iter().map(|s| s.to_string()).collect())
    }

    fn get_output_var_names(&self) -> Result<Vec<String>, BmiError> {
        Ok(OUTPUTS.iter().map(|s| s.to_string()).collect())
    }

    fn get_var_grid(&self, name: &str) -> Result<i32, BmiError> {
        Ok(HeatVar::from_name(name)?.grid())
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        Ok(HeatVar::from_name(name)?.value_type())
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        Ok(HeatVar::from_name(name)?.units().to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        Ok(HeatVar::from_name(name)?.value_type().itemsize())
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        let var = HeatVar::from_name(name)?;
        Ok(var.value_type().itemsize() * self.get_grid_size(var.grid())?)
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        HeatVar::from_name(name)?;
        Ok(Location::Node)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        Ok(self.solver()?.time)
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        self.solver()?;
        Ok(self.config.end_time)
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        Ok("s".to_string())
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        Ok(self.solver()?.time_step())
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        Ok(self.get_value_ptr(name)?.to_values())
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        let var = HeatVar::from_name(name)?;
        let solver = self.solver()?;
        Ok(match var {
            HeatVar::Temperature => ValueRef::Double(&solver.temperature),
            HeatVar::Diffusivity => ValueRef::Double(slice::from_ref(&solver.alpha)),
            HeatVar::ModelId => ValueRef::Int(slice::from_ref(&self.config.id)),
        })
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.get_value_ptr(name)?.gather(name, inds)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        let var = HeatVar::from_name(name)?;
        let solver = self.solver_mut()?;
        let src = match var {
            HeatVar::ModelId => return Err(BmiError::NotSettable(name.to_string())),
            _ => src.as_double(name)?,
        };

        match var {
            HeatVar::Temperature => {
                if src.len() != solver.temperature.len() {
                    return Err(BmiError::SizeMismatch(name.to_string(), solver.temperature.len(), src.len()));
                }
                solver.temperature.copy_from_slice(src);
            }
            _ => match src {
                [alpha] if *alpha > 0.0 => solver.alpha = *alpha,
                [alpha] => {
                    return Err(BmiError::InvalidArgument(format!("diffusivity must be positive, got {}", alpha)))
                }
                _ => return Err(BmiError::SizeMismatch(name.to_string(), 1, src.len())),
            },
        }
        Ok(())
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        if HeatVar::from_name(name)? != HeatVar::Temperature {
            return Err(BmiError::NotSettable(name.to_string()));
        }
        let solver = self.solver_mut()?;
        let src = src.as_double(name)?;
        if src.len() != inds.len() {
            return Err(BmiError::SizeMismatch(name.to_string(), inds.len(), src.len()));
        }

        let len = solver.temperature.len();
        if let Some(&bad) = inds.iter().find(|&&i| i >= len) {
            return Err(BmiError::IndexOutOfBounds(name.to_string(), bad, len));
        }
        for (&i, &v) in inds.iter().zip(src) {
            solver.temperature[i] = v;
        }
        Ok(())
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == PLATE_GRID { 2 } else { 0 })
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        if grid == SCALAR_GRID {
            return Ok(1);
        }
        Ok(self.solver()?.size())
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        self.check_grid(grid)?;
        Ok(if grid == PLATE_GRID { GridType::UniformRectilinear } else { GridType::Scalar })
    }

    fn get_grid_shape(&self, grid: i32) -> Result<Vec<usize>, BmiError> {
        self.check_grid(grid)?;
        if grid == SCALAR_GRID {
            return Ok(Vec::new());
        }
        let solver = self.solver()?;
        Ok(vec![solver.rows, solver.cols])
    }

    fn get_grid_spacing(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.check_grid(grid)?;
        if grid == SCALAR_GRID {
            return Ok(Vec::new());
        }
        let solver = self.solver()?;
        Ok(vec![solver.dy, solver.dx])
    }

    fn get_grid_origin(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        self.check_grid(grid)?;
        if grid == SCALAR_GRID {
            return Ok(Vec::new());
        }
        self.solver()?;
        Ok(self.config.origin.to_vec())
    }

    fn get_grid_x(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let solver = self.plate_only(grid, "get_grid_x")?;
        let x0 = self.config.origin[1];
        Ok((0..solver.cols).map(|j| x0 + j as f64 * solver.dx).collect())
    }

    fn get_grid_y(&self, grid: i32) -> Result<Vec<f64>, BmiError> {
        let solver = self.plate_only(grid, "get_grid_y")?;
        let y0 = self.config.origin[0];
        Ok((0..solver.rows).map(|i| y0 + i as f64 * solver.dy).collect())
    }

    fn get_grid_node_count(&self, grid: i32) -> Result<usize, BmiError> {
        self.get_grid_size(grid)
    }
}

/// Fills `model` with the operation table of a fresh heat model.
///
/// # Safety
///
/// `model` must be null or point to a `BmiModel` from `bmi_new`.
#[no_mangle]
pub unsafe extern "C" fn register_bmi_heat(model: *mut BmiModel) -> c_int {
    register_model(model, Box::new(Heat::new()))
}
