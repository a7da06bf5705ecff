// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

use std::f64::consts::PI;

use crate::config::HeatConfig;

/// Explicit finite-difference solver for 2D diffusion on a uniform grid.
/// Boundary nodes keep their initial values.
#[derive(Debug)]
pub struct HeatSolver {
    pub rows: usize,
    pub cols: usize,
    pub dy: f64,
    pub dx: f64,
    pub alpha: f64,
    pub time: f64,
    pub temperature: Vec<f64>,
    scratch: Vec<f64>,
}

impl HeatSolver {
    pub fn new(config: &HeatConfig) -> HeatSolver {
        let [rows, cols] = config.shape;
        let [dy, dx] = config.spacing;
        let ly = (rows - 1) as f64 * dy;
        let lx = (cols - 1) as f64 * dx;

        let mut temperature = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            let y = i as f64 * dy;
            for j in 0..cols {
                let x = j as f64 * dx;
                temperature.push((PI * x / lx).sin() * (PI * y / ly).sin());
            }
        }

        HeatSolver {
            rows,
            cols,
            dy,
            dx,
            alpha: config.alpha,
            time: 0.0,
            scratch: temperature.clone(),
            temperature,
        }
    }

    /// Largest stable step of the explicit scheme.
    pub fn time_step(&self) -> f64 {
        let h = self.dx.min(self.dy);
        h * h / (4.0 * self.alpha)
    }

    pub fn size(&self) -> usize {
        self.rows * self.cols
    }

    /// Advances the field by `dt`, which must not exceed `time_step()`.
    pub fn advance(&mut self, dt: f64) {
        let cx = self.alpha * dt / (self.dx * self.dx);
        let cy = self.alpha * dt / (self.dy * self.dy);
        let t = &self.temperature;
        let n = self.cols;

        self.scratch.copy_from_slice(t);
        for i in 1..self.rows - 1 {
            for j in 1..n - 1 {
                let k = i * n + j;
                self.scratch[k] = t[k] + cx * (t[k - 1] - 2.0 * t[k] + t[k + 1]) + cy * (t[k - n] - 2.0 * t[k] + t[k + n]);
            }
        }

        // The field keeps its allocation so pointers handed out at the C ABI stay live.
        self.temperature.copy_from_slice(&self.scratch);
        self.time += dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn solver(shape: [usize; 2]) -> HeatSolver {
        HeatSolver::new(&HeatConfig {
            shape,
            ..HeatConfig::default()
        })
    }

    #[test]
    fn initial_field_peaks_in_the_middle() {
        let s = solver([5, 5]);
        assert!(approx_eq!(f64, s.temperature[2 * 5 + 2], 1.0, epsilon = 1e-12));
        assert!(s.temperature[0].abs() < 1e-12);
    }

    #[test]
    fn time_step_uses_finest_spacing() {
        let s = HeatSolver::new(&HeatConfig {
            spacing: [2.0, 0.5],
            alpha: 0.25,
            ..HeatConfig::default()
        });
        assert!(approx_eq!(f64, s.time_step(), 0.25, ulps = 2));
    }

    #[test]
    fn diffusion_cools_the_interior_and_keeps_boundaries() {
        let mut s = solver([6, 7]);
        let before = s.temperature.clone();
        let dt = s.time_step();
        s.advance(dt);

        assert!(approx_eq!(f64, s.time, dt, ulps = 2));
        let k = 3 * 7 + 3;
        assert!(s.temperature[k] < before[k]);
        for j in 0..7 {
            assert_eq!(s.temperature[j], before[j]);
            assert_eq!(s.temperature[5 * 7 + j], before[5 * 7 + j]);
        }
    }
}
