// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

pub mod config;
pub mod dpend;

use std::slice;

use libc::c_int;
use log::info;

use bmi_c_api::{register_model, BmiModel};
use bmi_rs::errors::BmiError;
use bmi_rs::types::{GridType, Location, ValueRef, ValueType, Values};
use bmi_rs::{Bmi, Lifecycle};

pub use config::DpendConfig;
use dpend::{rk4_step, PendulumParams, PendulumState};

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
enum DpVar {
    Th1,
    Th2,
    W1,
    W2,
    A1,
    A2,
}

impl DpVar {
    fn from_name(name: &str) -> Result<DpVar, BmiError> {
        match name {
            "theta1" => Ok(DpVar::Th1),
            "theta2" => Ok(DpVar::Th2),
            "joint1.velocity" => Ok(DpVar::W1),
            "joint2.velocity" => Ok(DpVar::W2),
            "joint1.acceleration" => Ok(DpVar::A1),
            "joint2.acceleration" => Ok(DpVar::A2),
            _ => Err(BmiError::UnknownVariable(name.to_string())),
        }
    }

    fn units(self) -> &'static str {
        match self {
            DpVar::Th1 | DpVar::Th2 => "rad",
            DpVar::W1 | DpVar::W2 => "rad s-1",
            DpVar::A1 | DpVar::A2 => "rad s-2",
        }
    }
}

const INPUTS: [&str; 2] = ["joint1.acceleration", "joint2.acceleration"];
const OUTPUTS: [&str; 4] = ["theta1", "theta2", "joint1.velocity", "joint2.velocity"];

const SCALAR_GRID: i32 = 0;

/// Double pendulum driven by external joint accelerations.
#[derive(Debug, Default)]
pub struct Dpend {
    lifecycle: Lifecycle,
    config: DpendConfig,
    params: Option<PendulumParams>,
    state: PendulumState,
    accel: [f64; 2],
    time: f64,
}

impl Dpend {
    pub fn new() -> Dpend {
        Dpend::default()
    }

    fn params(&self) -> Result<&PendulumParams, BmiError> {
        self.lifecycle.require_initialized()?;
        self.params.as_ref().ok_or(BmiError::NotInitialized)
    }

    fn advance(&mut self, h: f64) -> Result<(), BmiError> {
        let params = *self.params()?;
        rk4_step(&params, &mut self.state, self.accel, h);
        self.time += h;
        Ok(())
    }

    fn value_of(&self, var: DpVar) -> &f64 {
        match var {
            DpVar::Th1 => &self.state.th1,
            DpVar::Th2 => &self.state.th2,
            DpVar::W1 => &self.state.w1,
            DpVar::W2 => &self.state.w2,
            DpVar::A1 => &self.accel[0],
            DpVar::A2 => &self.accel[1],
        }
    }

    fn check_grid(&self, grid: i32) -> Result<(), BmiError> {
        if grid != SCALAR_GRID {
            return Err(BmiError::UnknownGrid(grid));
        }
        Ok(())
    }
}

impl Bmi for Dpend {
    fn initialize(&mut self, config_file: &str) -> Result<(), BmiError> {
        let config = DpendConfig::load(config_file)?;
        self.lifecycle.begin()?;

        self.state = PendulumState {
            th1: config.theta1.to_radians(),
            w1: config.omega1.to_radians(),
            th2: config.theta2.to_radians(),
            w2: config.omega2.to_radians(),
        };
        self.params = Some(config.params());
        self.accel = [0.0, 0.0];
        self.time = 0.0;
        info!("double pendulum initialized at theta1={}, theta2={} deg", config.theta1, config.theta2);
        self.config = config;
        Ok(())
    }

    fn update(&mut self) -> Result<(), BmiError> {
        self.advance(self.config.time_step)
    }

    fn update_until(&mut self, then: f64) -> Result<(), BmiError> {
        self.params()?;
        let h = self.config.time_step;
        while self.time + h <= then {
            self.advance(h)?;
        }
        let rest = then - self.time;
        if rest > 0.0 {
            self.advance(rest)?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), BmiError> {
        self.lifecycle.end()?;
        self.params = None;
        Ok(())
    }

    fn get_component_name(&self) -> Result<String, BmiError> {
        Ok("Double Pendulum".to_string())
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
        DpVar::from_name(name)?;
        Ok(SCALAR_GRID)
    }

    fn get_var_type(&self, name: &str) -> Result<ValueType, BmiError> {
        DpVar::from_name(name)?;
        Ok(ValueType::Double)
    }

    fn get_var_units(&self, name: &str) -> Result<String, BmiError> {
        Ok(DpVar::from_name(name)?.units().to_string())
    }

    fn get_var_itemsize(&self, name: &str) -> Result<usize, BmiError> {
        DpVar::from_name(name)?;
        Ok(ValueType::Double.itemsize())
    }

    fn get_var_nbytes(&self, name: &str) -> Result<usize, BmiError> {
        self.get_var_itemsize(name)
    }

    fn get_var_location(&self, name: &str) -> Result<Location, BmiError> {
        DpVar::from_name(name)?;
        Ok(Location::Node)
    }

    fn get_current_time(&self) -> Result<f64, BmiError> {
        self.params()?;
        Ok(self.time)
    }

    fn get_start_time(&self) -> Result<f64, BmiError> {
        Ok(0.0)
    }

    fn get_end_time(&self) -> Result<f64, BmiError> {
        self.params()?;
        Ok(self.config.end_time)
    }

    fn get_time_units(&self) -> Result<String, BmiError> {
        Ok("s".to_string())
    }

    fn get_time_step(&self) -> Result<f64, BmiError> {
        self.params()?;
        Ok(self.config.time_step)
    }

    fn get_value(&self, name: &str) -> Result<Values, BmiError> {
        Ok(self.get_value_ptr(name)?.to_values())
    }

    fn get_value_ptr(&self, name: &str) -> Result<ValueRef<'_>, BmiError> {
        let var = DpVar::from_name(name)?;
        self.params()?;
        Ok(ValueRef::Double(slice::from_ref(self.value_of(var))))
    }

    fn get_value_at_indices(&self, name: &str, inds: &[usize]) -> Result<Values, BmiError> {
        self.get_value_ptr(name)?.gather(name, inds)
    }

    fn set_value(&mut self, name: &str, src: ValueRef<'_>) -> Result<(), BmiError> {
        let slot = match DpVar::from_name(name)? {
            DpVar::A1 => 0,
            DpVar::A2 => 1,
            _ => return Err(BmiError::NotSettable(name.to_string())),
        };
        self.params()?;

        match src.as_double(name)? {
            [a] => self.accel[slot] = *a,
            other => return Err(BmiError::SizeMismatch(name.to_string(), 1, other.len())),
        }
        Ok(())
    }

    fn set_value_at_indices(&mut self, name: &str, inds: &[usize], src: ValueRef<'_>) -> Result<(), BmiError> {
        match inds {
            [0] => self.set_value(name, src),
            [i] => Err(BmiError::IndexOutOfBounds(name.to_string(), *i, 1)),
            _ => Err(BmiError::SizeMismatch(name.to_string(), 1, inds.len())),
        }
    }

    fn get_grid_rank(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        Ok(0)
    }

    fn get_grid_size(&self, grid: i32) -> Result<usize, BmiError> {
        self.check_grid(grid)?;
        Ok(1)
    }

    fn get_grid_type(&self, grid: i32) -> Result<GridType, BmiError> {
        self.check_grid(grid)?;
        Ok(GridType::Scalar)
    }
}

/// Fills `model` with the operation table of a fresh pendulum.
///
/// # Safety
///
/// `model` must be null or point to a `BmiModel` from `bmi_new`.
#[no_mangle]
pub unsafe extern "C" fn register_bmi_dpend(model: *mut BmiModel) -> c_int {
    register_model(model, Box::new(Dpend::new()))
}
