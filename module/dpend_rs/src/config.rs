// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::fs;

use log::debug;
use serde::Deserialize;

use bmi_rs::errors::BmiError;

use crate::dpend::PendulumParams;

/// Pendulum setup. Initial angles and velocities are given in degrees.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DpendConfig {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
    pub theta1: f64,
    pub theta2: f64,
    pub omega1: f64,
    pub omega2: f64,
    pub time_step: f64,
    pub end_time: f64,
}

impl Default for DpendConfig {
    fn default() -> Self {
        DpendConfig {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 1.0,
            theta1: 120.0,
            theta2: -10.0,
            omega1: 0.0,
            omega2: 0.0,
            time_step: 0.01,
            end_time: 10.0,
        }
    }
}

impl DpendConfig {
    pub fn load(path: &str) -> Result<DpendConfig, BmiError> {
        if path.trim().is_empty() {
            debug!("no configuration file given, using pendulum defaults");
            return Ok(DpendConfig::default());
        }

        let text = fs::read_to_string(path)?;
        let config: DpendConfig = toml::from_str(&text).map_err(|e| BmiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BmiError> {
        let positive = [
            ("m1", self.m1),
            ("m2", self.m2),
            ("l1", self.l1),
            ("l2", self.l2),
            ("time_step", self.time_step),
        ];
        if let Some((key, val)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(BmiError::Config(format!("{} must be positive, got {}", key, val)));
        }
        if !(self.end_time >= 0.0) {
            return Err(BmiError::Config(format!("end_time must not be negative, got {}", self.end_time)));
        }
        Ok(())
    }

    pub fn params(&self) -> PendulumParams {
        PendulumParams {
            m1: self.m1,
            m2: self.m2,
            l1: self.l1,
            l2: self.l2,
        }
    }
}
