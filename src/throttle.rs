// Defines the motor-driver throttle source and throttle unit conversions
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

/// Magnitude of a full-scale throttle command, in driver throttle units.
pub const FULL_SCALE_THROTTLE: i32 = 1023;

/// A source for the throttle currently applied by the motor driver.
///
/// The controller reads it exactly once per (re)enable, on the cold-start tick, so the ramp
/// limiter starts from what the motor is actually doing instead of from zero. Implementations
/// must be instantaneous and free of side effects.
///
/// Any `Fn() -> i32` is a throttle source, which covers both closures over a driver handle and
/// test doubles returning a constant.
pub trait ThrottleSource {
    /// Returns the throttle currently applied by the driver.
    #[must_use]
    fn current_throttle(&self) -> i32;
}

impl<F> ThrottleSource for F
where
    F: Fn() -> i32,
{
    fn current_throttle(&self) -> i32 {
        self()
    }
}

/// Converts a controller output into a driver command: rounded to the nearest throttle unit and
/// saturated to `±FULL_SCALE_THROTTLE`. NaN becomes 0.
pub fn saturate_throttle<T: Real>(output: T) -> i32 {
    if output.is_nan() {
        return 0;
    }
    let full_scale = T::from_int(FULL_SCALE_THROTTLE);
    output
        .round()
        .max(-full_scale)
        .min(full_scale)
        .to_int_saturating()
}

/// Converts a percentage of full scale into throttle units.
pub fn throttle_from_percent<T: Real>(percent: T) -> T {
    percent * T::from_int(FULL_SCALE_THROTTLE) / T::from_int(100)
}

/// Converts throttle units into a percentage of full scale.
pub fn throttle_to_percent<T: Real>(throttle: i32) -> T {
    T::from_int(throttle) * T::from_int(100) / T::from_int(FULL_SCALE_THROTTLE)
}
