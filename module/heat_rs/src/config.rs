// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use bmi_rs::errors::BmiError;

/// Settings read from the TOML file passed to `initialize`.
///
/// Array settings are ordered `[rows, columns]`, i.e. `[y, x]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatConfig {
    pub shape: [usize; 2],
    pub spacing: [f64; 2],
    pub origin: [f64; 2],
    pub alpha: f64,
    pub end_time: f64,
    pub id: i32,
}

impl Default for HeatConfig {
    fn default() -> Self {
        HeatConfig {
            shape: [10, 20],
            spacing: [1.0, 1.0],
            origin: [0.0, 0.0],
            alpha: 1.0,
            end_time: 1000.0,
            id: 0,
        }
    }
}

impl HeatConfig {
    /// Reads and validates `path`. A blank path selects the defaults.
    pub fn load(path: &str) -> Result<HeatConfig, BmiError> {
        if path.trim().is_empty() {
            debug!("no configuration file given, using heat defaults");
            return Ok(HeatConfig::default());
        }

        let text = fs::read_to_string(Path::new(path))?;
        HeatConfig::parse(&text)
    }

    pub fn parse(text: &str) -> Result<HeatConfig, BmiError> {
        let config: HeatConfig = toml::from_str(text).map_err(|e| BmiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), BmiError> {
        if self.shape.iter().any(|&n| n < 3) {
            return Err(BmiError::Config(format!(
                "grid needs at least 3 nodes per axis, got {:?}",
                self.shape
            )));
        }
        if self.spacing.iter().any(|&d| !(d > 0.0)) {
            return Err(BmiError::Config(format!("spacing must be positive, got {:?}", self.spacing)));
        }
        if !(self.alpha > 0.0) {
            return Err(BmiError::Config(format!("alpha must be positive, got {}", self.alpha)));
        }
        if !(self.end_time >= 0.0) {
            return Err(BmiError::Config(format!("end_time must not be negative, got {}", self.end_time)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = HeatConfig::parse("alpha = 0.5\nshape = [4, 5]\n").unwrap();
        assert_eq!(config.shape, [4, 5]);
        assert_eq!(config.spacing, [1.0, 1.0]);
        assert_eq!(config.alpha, 0.5);
    }

    #[test]
    fn blank_path_selects_defaults() {
        assert_eq!(HeatConfig::load("  ").unwrap(), HeatConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(HeatConfig::parse("alpha = -1.0"), Err(BmiError::Config(_))));
        assert!(matches!(HeatConfig::parse("shape = [2, 8]"), Err(BmiError::Config(_))));
        assert!(matches!(HeatConfig::parse("spacing = [1.0, 0.0]"), Err(BmiError::Config(_))));
        assert!(matches!(HeatConfig::parse("colour = \"red\""), Err(BmiError::Config(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(HeatConfig::load("/nonexistent/heat.toml"), Err(BmiError::Io(_))));
    }
}
