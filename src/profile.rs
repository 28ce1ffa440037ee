// Gain profiles: the validated P/I/D/F, integral-zone and ramp-rate set read by each tick
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

/// Errors raised when a gain profile is configured with an invalid value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GainProfileError {
    /// The proportional gain is negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("proportional gain must be finite and nonnegative")
    )]
    InvalidProportionalGain,

    /// The integral gain is negative or not finite.
    #[cfg_attr(feature = "std", error("integral gain must be finite and nonnegative"))]
    InvalidIntegralGain,

    /// The derivative gain is negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("derivative gain must be finite and nonnegative")
    )]
    InvalidDerivativeGain,

    /// The feed-forward gain is not finite.
    #[cfg_attr(feature = "std", error("feed-forward gain must be finite"))]
    InvalidFeedForwardGain,
}

/// One closed-loop gain slot.
///
/// P, I and D are magnitudes: the sign of each term follows the error it multiplies. F is signed
/// and multiplies the target directly, so a negative F reverses the feed-forward contribution.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GainProfile<T: Real> {
    /// Proportional gain. Defaults to 0.
    p: T,

    /// Integral gain. Defaults to 0.
    i: T,

    /// Derivative gain. Defaults to 0.
    d: T,

    /// Feed-forward gain. Defaults to 0.
    f: T,

    /// Error magnitude at or above which the integral accumulator is cleared instead of
    /// accumulated. Zero disables the guard. Defaults to 0.
    integral_zone: u32,

    /// Largest change of the output per tick, in throttle units. Zero disables the limiter.
    /// Defaults to 0.
    closed_loop_ramp_rate: u32,
}

impl<T: Real> Default for GainProfile<T> {
    fn default() -> Self {
        GainProfile {
            p: T::zero(),
            i: T::zero(),
            d: T::zero(),
            f: T::zero(),
            integral_zone: 0,
            closed_loop_ramp_rate: 0,
        }
    }
}

fn is_valid_magnitude<T: Real>(gain: T) -> bool {
    gain.is_finite() && gain >= T::zero()
}

impl<T: Real> GainProfile<T> {
    /// Returns the proportional gain.
    pub fn p(&self) -> T {
        self.p
    }

    /// Returns the integral gain.
    pub fn i(&self) -> T {
        self.i
    }

    /// Returns the derivative gain.
    pub fn d(&self) -> T {
        self.d
    }

    /// Returns the feed-forward gain.
    pub fn f(&self) -> T {
        self.f
    }

    /// Returns the integral zone threshold.
    pub fn integral_zone(&self) -> u32 {
        self.integral_zone
    }

    /// Returns the closed-loop ramp rate in throttle units per tick.
    pub fn closed_loop_ramp_rate(&self) -> u32 {
        self.closed_loop_ramp_rate
    }

    /// Whether an error of magnitude `abs_error` may be accumulated into the integral term.
    ///
    /// Always true when the integral zone is disabled.
    pub fn within_integral_zone(&self, abs_error: u32) -> bool {
        self.integral_zone == 0 || abs_error < self.integral_zone
    }

    /// Sets the proportional gain.
    ///
    /// # Errors
    /// - `InvalidProportionalGain` if `p` is negative or not finite. The gain is left unchanged.
    pub fn set_p(&mut self, p: T) -> Result<(), GainProfileError> {
        if !is_valid_magnitude(p) {
            return Err(GainProfileError::InvalidProportionalGain);
        }
        self.p = p;
        Ok(())
    }

    /// Sets the integral gain.
    ///
    /// # Errors
    /// - `InvalidIntegralGain` if `i` is negative or not finite. The gain is left unchanged.
    pub fn set_i(&mut self, i: T) -> Result<(), GainProfileError> {
        if !is_valid_magnitude(i) {
            return Err(GainProfileError::InvalidIntegralGain);
        }
        self.i = i;
        Ok(())
    }

    /// Sets the derivative gain.
    ///
    /// # Errors
    /// - `InvalidDerivativeGain` if `d` is negative or not finite. The gain is left unchanged.
    pub fn set_d(&mut self, d: T) -> Result<(), GainProfileError> {
        if !is_valid_magnitude(d) {
            return Err(GainProfileError::InvalidDerivativeGain);
        }
        self.d = d;
        Ok(())
    }

    /// Sets the feed-forward gain. Negative values are allowed.
    ///
    /// # Errors
    /// - `InvalidFeedForwardGain` if `f` is not finite. The gain is left unchanged.
    pub fn set_f(&mut self, f: T) -> Result<(), GainProfileError> {
        if !f.is_finite() {
            return Err(GainProfileError::InvalidFeedForwardGain);
        }
        self.f = f;
        Ok(())
    }

    /// Convenience method to set the proportional, integral, derivative and feed-forward gains
    /// together. Stops at the first invalid gain; gains set before it keep their new values.
    pub fn set_gains(&mut self, p: T, i: T, d: T, f: T) -> Result<(), GainProfileError> {
        self.set_p(p)?;
        self.set_i(i)?;
        self.set_d(d)?;
        self.set_f(f)
    }

    /// Sets the integral zone threshold. Zero disables the windup guard.
    pub fn set_integral_zone(&mut self, integral_zone: u32) {
        self.integral_zone = integral_zone;
    }

    /// Sets the closed-loop ramp rate. Zero disables rate limiting.
    pub fn set_closed_loop_ramp_rate(&mut self, closed_loop_ramp_rate: u32) {
        self.closed_loop_ramp_rate = closed_loop_ramp_rate;
    }
}

/// Builder for [`GainProfile`]. Values are validated once, in [`GainProfileBuilder::build`].
#[derive(Copy, Clone, Debug)]
pub struct GainProfileBuilder<T: Real> {
    p: T,
    i: T,
    d: T,
    f: T,
    integral_zone: u32,
    closed_loop_ramp_rate: u32,
}

impl<T: Real> Default for GainProfileBuilder<T> {
    fn default() -> Self {
        let defaults = GainProfile::<T>::default();
        GainProfileBuilder {
            p: defaults.p,
            i: defaults.i,
            d: defaults.d,
            f: defaults.f,
            integral_zone: defaults.integral_zone,
            closed_loop_ramp_rate: defaults.closed_loop_ramp_rate,
        }
    }
}

impl<T: Real> GainProfileBuilder<T> {
    /// Sets the proportional gain.
    pub fn p(mut self, p: T) -> Self {
        self.p = p;
        self
    }

    /// Sets the integral gain.
    pub fn i(mut self, i: T) -> Self {
        self.i = i;
        self
    }

    /// Sets the derivative gain.
    pub fn d(mut self, d: T) -> Self {
        self.d = d;
        self
    }

    /// Sets the feed-forward gain.
    pub fn f(mut self, f: T) -> Self {
        self.f = f;
        self
    }

    /// Sets the integral zone threshold.
    pub fn integral_zone(mut self, integral_zone: u32) -> Self {
        self.integral_zone = integral_zone;
        self
    }

    /// Sets the closed-loop ramp rate.
    pub fn closed_loop_ramp_rate(mut self, closed_loop_ramp_rate: u32) -> Self {
        self.closed_loop_ramp_rate = closed_loop_ramp_rate;
        self
    }

    /// Validates the collected values and builds the profile.
    ///
    /// # Errors
    /// The first [`GainProfileError`] found, checked in P, I, D, F order.
    pub fn build(self) -> Result<GainProfile<T>, GainProfileError> {
        let mut profile = GainProfile::default();
        profile.set_gains(self.p, self.i, self.d, self.f)?;
        profile.set_integral_zone(self.integral_zone);
        profile.set_closed_loop_ramp_rate(self.closed_loop_ramp_rate);
        Ok(profile)
    }
}

/// Supplies the gain profile currently selected for a loop.
///
/// The controller calls it once per tick, so the selected profile may change between ticks (a
/// gear or mode switch) without the controller knowing. A [`GainProfile`], or a shared reference
/// to one, is a source that always returns that profile, and any `Fn() -> GainProfile<T>` is a
/// source as well.
pub trait GainSource<T: Real> {
    /// Returns the active gain profile.
    #[must_use]
    fn gain_profile(&self) -> GainProfile<T>;
}

impl<T: Real> GainSource<T> for GainProfile<T> {
    fn gain_profile(&self) -> GainProfile<T> {
        *self
    }
}

impl<T: Real> GainSource<T> for &GainProfile<T> {
    fn gain_profile(&self) -> GainProfile<T> {
        **self
    }
}

impl<T, F> GainSource<T> for F
where
    T: Real,
    F: Fn() -> GainProfile<T>,
{
    fn gain_profile(&self) -> GainProfile<T> {
        self()
    }
}
