// Scalar abstraction and the arithmetic helpers used by the controller tick
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

use core::fmt::Debug;

use num_traits::float::FloatCore;

/// A real-valued scalar the controller can run on.
///
/// Besides the usual floating-point operations, the tick needs to move between the real domain
/// (target, accumulator, output) and the integer domain of the process variable, the error and
/// the driver throttle. These conversions never fail: they follow the semantics of `as` casts.
pub trait Real: FloatCore + Debug + Send + Sync + 'static {
    /// Converts a signed integer sample into the real domain.
    fn from_int(value: i32) -> Self;

    /// Converts an unsigned integer quantity into the real domain.
    fn from_uint(value: u32) -> Self;

    /// Truncates toward zero into an `i32`, saturating at the integer bounds. NaN maps to 0.
    fn to_int_saturating(self) -> i32;

    /// Widens into an `f64` without loss.
    fn into_f64(self) -> f64;
}

macro_rules! impl_real {
    ($($t:ty),*) => {
        $(
            impl Real for $t {
                #[inline]
                fn from_int(value: i32) -> Self {
                    value as $t
                }

                #[inline]
                fn from_uint(value: u32) -> Self {
                    value as $t
                }

                #[inline]
                fn to_int_saturating(self) -> i32 {
                    self as i32
                }

                #[inline]
                fn into_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

impl_real!(f32, f64);

/// Multiplies a signed operand by a gain treated as a magnitude. The sign of the product follows
/// the operand.
#[inline]
pub fn mul_unsigned<T: Real>(value: T, gain: T) -> T {
    value * gain.abs()
}

/// Ordinary signed multiplication, used for the feed-forward term whose gain may be negative.
#[inline]
pub fn mul_signed<T: Real>(value: T, gain: T) -> T {
    value * gain
}

/// Moves `current` toward `target` by at most `max_step`.
///
/// The step is taken upward when `target >= current`, downward otherwise. The result is never
/// clamped to any sign or range.
#[inline]
pub fn step_toward<T: Real>(current: T, target: T, max_step: T) -> T {
    if target >= current {
        current + (target - current).min(max_step)
    } else {
        current - (current - target).min(max_step)
    }
}
