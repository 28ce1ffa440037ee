// Brushed DC motor plant and simulated driver for closed-loop tests, benchmarks and demos
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::scalar::Real;
use crate::throttle::{saturate_throttle, ThrottleSource, FULL_SCALE_THROTTLE};
use nalgebra as na;

/// Classic fourth-order Runge-Kutta step of `x' = f(x)`.
pub fn rk4_step<F>(f: F, x: na::Vector2<f64>, h: f64) -> na::Vector2<f64>
where
    F: Fn(na::Vector2<f64>) -> na::Vector2<f64>,
{
    let k1 = f(x);
    let k2 = f(x + k1 * (0.5 * h));
    let k3 = f(x + k2 * (0.5 * h));
    let k4 = f(x + k3 * h);
    x + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
}

pub struct DcMotor {
    /// Free-running speed at full-scale throttle, in sensor units per second.
    pub free_speed: f64,
    /// Mechanical time constant in seconds.
    pub time_constant: f64,
}

impl DcMotor {
    /// Implements the state-space realization of a first-order brushed DC motor:
    /// ┌    ┐   ┌          ┐┌   ┐   ┌      ┐
    /// │ θ' │ = │ 0  1     ││ θ │ + │ 0    │ u
    /// │ ω' │   │ 0  -1/τ  ││ ω │   │ ωₘ/τ │
    /// └    ┘   └          ┘└   ┘   └      ┘
    /// where u is the throttle as a fraction of full scale.
    pub fn f(&self, x: na::Vector2<f64>, throttle: i32) -> na::Vector2<f64> {
        let u = f64::from(throttle) / f64::from(FULL_SCALE_THROTTLE);
        let inv_tau = 1.0 / self.time_constant;

        let mat_a = na::Matrix2::new(0.0, 1.0, 0.0, -inv_tau);
        let mat_b = na::Vector2::new(0.0, self.free_speed * inv_tau);

        mat_a * x + mat_b * u
    }

    /// Position sample, rounded to whole sensor units.
    pub fn position(&self, x: na::Vector2<f64>) -> i32 {
        x[0].round() as i32
    }

    /// Velocity sample, rounded to whole sensor units per second.
    pub fn velocity(&self, x: na::Vector2<f64>) -> i32 {
        x[1].round() as i32
    }
}

/// A motor driver that applies saturated throttle commands and reports the last one applied.
#[derive(Debug, Default, Clone, Copy)]
pub struct MotorDriver {
    applied: i32,
}

impl MotorDriver {
    pub fn new(applied: i32) -> Self {
        Self {
            applied: applied.clamp(-FULL_SCALE_THROTTLE, FULL_SCALE_THROTTLE),
        }
    }

    pub fn apply<T: Real>(&mut self, command: T) -> i32 {
        self.applied = saturate_throttle(command);
        self.applied
    }

    pub fn applied(&self) -> i32 {
        self.applied
    }
}

impl ThrottleSource for MotorDriver {
    fn current_throttle(&self) -> i32 {
        self.applied
    }
}
