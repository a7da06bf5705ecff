// Copyright 2021 Siemens AG
// SPDX-License-Identifier: MIT

const G: f64 = 9.81;

/// Masses and arm lengths of the two pendulum links.
#[derive(Debug, Clone, Copy)]
pub struct PendulumParams {
    pub m1: f64,
    pub m2: f64,
    pub l1: f64,
    pub l2: f64,
}

/// Angles (rad) and angular velocities (rad/s) of both joints.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PendulumState {
    pub th1: f64,
    pub w1: f64,
    pub th2: f64,
    pub w2: f64,
}

impl PendulumState {
    fn to_array(self) -> [f64; 4] {
        [self.th1, self.w1, self.th2, self.w2]
    }

    fn from_array(y: [f64; 4]) -> PendulumState {
        PendulumState {
            th1: y[0],
            w1: y[1],
            th2: y[2],
            w2: y[3],
        }
    }

    /// Kinetic plus potential energy, zero potential at the pivot height.
    #[cfg(test)]
    fn energy(&self, p: &PendulumParams) -> f64 {
        let v1_sq = p.l1 * p.l1 * self.w1 * self.w1;
        let v2_sq = v1_sq
            + p.l2 * p.l2 * self.w2 * self.w2
            + 2.0 * p.l1 * p.l2 * self.w1 * self.w2 * (self.th1 - self.th2).cos();
        let kinetic = 0.5 * p.m1 * v1_sq + 0.5 * p.m2 * v2_sq;
        let potential = -(p.m1 + p.m2) * G * p.l1 * self.th1.cos() - p.m2 * G * p.l2 * self.th2.cos();
        kinetic + potential
    }
}

/// Time derivative of `(th1, w1, th2, w2)` with the external angular
/// accelerations `accel` added to both joints.
fn derivs(p: &PendulumParams, y: [f64; 4], accel: [f64; 2]) -> [f64; 4] {
    let del = y[2] - y[0];
    let (sin_d, cos_d) = del.sin_cos();
    let den1 = (p.m1 + p.m2) * p.l1 - p.m2 * p.l1 * cos_d * cos_d;
    let den2 = (p.l2 / p.l1) * den1;

    let dw1 = (p.m2 * p.l1 * y[1] * y[1] * sin_d * cos_d
        + p.m2 * G * y[2].sin() * cos_d
        + p.m2 * p.l2 * y[3] * y[3] * sin_d
        - (p.m1 + p.m2) * G * y[0].sin())
        / den1;

    let dw2 = (-p.m2 * p.l2 * y[3] * y[3] * sin_d * cos_d
        + (p.m1 + p.m2) * G * y[0].sin() * cos_d
        - (p.m1 + p.m2) * p.l1 * y[1] * y[1] * sin_d
        - (p.m1 + p.m2) * G * y[2].sin())
        / den2;

    [y[1], dw1 + accel[0], y[3], dw2 + accel[1]]
}

fn axpy(y: [f64; 4], a: f64, k: [f64; 4]) -> [f64; 4] {
    [y[0] + a * k[0], y[1] + a * k[1], y[2] + a * k[2], y[3] + a * k[3]]
}

/// One classical fourth order Runge-Kutta step of length `h`.
pub fn rk4_step(p: &PendulumParams, state: &mut PendulumState, accel: [f64; 2], h: f64) {
    let y = state.to_array();

    let k1 = derivs(p, y, accel);
    let k2 = derivs(p, axpy(y, 0.5 * h, k1), accel);
    let k3 = derivs(p, axpy(y, 0.5 * h, k2), accel);
    let k4 = derivs(p, axpy(y, h, k3), accel);

    let mut out = y;
    for i in 0..4 {
        out[i] += h * (k1[i] + 2.0 * k2[i] + 2.0 * k3[i] + k4[i]) / 6.0;
    }
    *state = PendulumState::from_array(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    const UNIT: PendulumParams = PendulumParams {
        m1: 1.0,
        m2: 1.0,
        l1: 1.0,
        l2: 1.0,
    };

    #[test]
    fn hanging_pendulum_stays_at_rest() {
        let mut state = PendulumState::default();
        for _ in 0..100 {
            rk4_step(&UNIT, &mut state, [0.0, 0.0], 0.01);
        }
        assert_eq!(state, PendulumState::default());
    }

    #[test]
    fn free_motion_conserves_energy() {
        let mut state = PendulumState {
            th1: 1.2,
            th2: -0.4,
            ..PendulumState::default()
        };
        let e0 = state.energy(&UNIT);
        for _ in 0..1000 {
            rk4_step(&UNIT, &mut state, [0.0, 0.0], 0.001);
        }
        assert!(approx_eq!(f64, state.energy(&UNIT), e0, epsilon = 1e-6));
    }

    #[test]
    fn external_acceleration_spins_up_the_joint() {
        let mut state = PendulumState::default();
        rk4_step(&UNIT, &mut state, [2.0, 0.0], 0.001);
        assert!(state.w1 > 0.0);
    }
}
