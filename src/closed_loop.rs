// The 1 ms PIDF tick: controller state, functional controller and stateful controller
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

use core::marker::PhantomData;

use crate::log;
use crate::profile::{GainProfile, GainSource};
use crate::scalar::{self, Real};
use crate::throttle::ThrottleSource;

/// Lifecycle of a closed loop.
///
/// A loop starts `Uninitialized` and leaves that phase on its first tick, which is the only tick
/// that reads the driver throttle. Re-enabling a loop puts it back to `Uninitialized`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopPhase {
    /// No tick has run since the loop was (re)enabled.
    Uninitialized,
    /// At least one tick has run.
    Running,
}

/// Per-tick behavior flags. Both may be set at once.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutputOptions {
    /// Negate the command, for motors wired or mounted in reverse.
    pub invert_output: bool,
    /// Clamp negative PIDF sums to zero, for sensors that only measure one direction.
    pub one_direction_only: bool,
}

impl OutputOptions {
    /// Constructs the flag set.
    pub const fn new(invert_output: bool, one_direction_only: bool) -> Self {
        Self {
            invert_output,
            one_direction_only,
        }
    }
}

/// Everything a closed loop carries from one tick to the next.
///
/// The state is a plain value: the functional controller takes it by value and hands back the
/// next one. `output` is the ramp baseline for the next tick, `output_pre_ramp` is rewritten on
/// every tick and only kept for inspection.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClosedLoopState<T: Real> {
    phase: LoopPhase,
    target: T,
    error: i32,
    previous_error: i32,
    integral_accumulator: T,
    derivative: T,
    output_pre_ramp: T,
    output: T,
}

impl<T: Real> Default for ClosedLoopState<T> {
    fn default() -> Self {
        Self::new_uninit()
    }
}

impl<T: Real> ClosedLoopState<T> {
    /// Creates a zeroed state that will cold start on its first tick. The target is 0 until set.
    pub fn new_uninit() -> Self {
        Self {
            phase: LoopPhase::Uninitialized,
            target: T::zero(),
            error: 0,
            previous_error: 0,
            integral_accumulator: T::zero(),
            derivative: T::zero(),
            output_pre_ramp: T::zero(),
            output: T::zero(),
        }
    }

    /// Sets the setpoint for the next tick. Setpoint ramping is up to the caller.
    pub fn set_target(&mut self, target: T) {
        self.target = target;
    }

    /// Returns the setpoint.
    pub fn target(&self) -> T {
        self.target
    }

    /// Returns the error computed on the last tick.
    pub fn error(&self) -> i32 {
        self.error
    }

    /// Returns the error of the tick before the last one, as used for the derivative.
    pub fn previous_error(&self) -> i32 {
        self.previous_error
    }

    /// Returns the integral accumulator.
    pub fn integral_accumulator(&self) -> T {
        self.integral_accumulator
    }

    /// Returns the error difference computed on the last tick.
    pub fn derivative(&self) -> T {
        self.derivative
    }

    /// Returns the last PIDF sum after the direction and inversion adjustments, before the
    /// ramp limiter.
    pub fn output_pre_ramp(&self) -> T {
        self.output_pre_ramp
    }

    /// Returns the last rate-limited command.
    pub fn output(&self) -> T {
        self.output
    }

    /// Returns the lifecycle phase.
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    /// Whether the loop has ticked since it was last (re)enabled.
    pub fn is_initialized(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    /// Re-arms the cold start, e.g. when the loop is re-enabled. The target is kept; the
    /// accumulator and ramp baseline are re-seeded on the next tick.
    pub fn reinitialize(&mut self) {
        self.phase = LoopPhase::Uninitialized;
    }

    /// Clears the integral accumulator without touching anything else.
    pub fn clear_integral_accumulator(&mut self) {
        self.integral_accumulator = T::zero();
    }

    /// Whether `output` has the sign that `one_direction_only` is meant to exclude.
    ///
    /// The one-direction clamp acts before the ramp limiter, and the limiter walks from the
    /// previous output without re-checking it. Ramping up from a negative baseline can therefore
    /// leave a negative output (positive when inverted) for several ticks. The controller keeps
    /// that behavior; this query lets callers detect it.
    pub fn output_violates_direction(&self, options: OutputOptions) -> bool {
        if !options.one_direction_only {
            return false;
        }
        if options.invert_output {
            self.output > T::zero()
        } else {
            self.output < T::zero()
        }
    }

    // Uninitialized -> Running. Returns the derivative for the cold-start tick.
    fn cold_start<D: ThrottleSource>(&mut self, driver: &D) -> T {
        let throttle = driver.current_throttle();
        log::debug!("closed loop cold start, ramp seeded at throttle {}", throttle);
        self.integral_accumulator = T::zero();
        self.output = T::from_int(throttle);
        T::zero()
    }

    // Windup guard and derivative for a warm tick.
    fn accumulate(&mut self, gains: &GainProfile<T>, error: i32, abs_error: u32) -> T {
        if gains.within_integral_zone(abs_error) {
            self.integral_accumulator = self.integral_accumulator + T::from_int(error);
        } else {
            log::trace!("error {} outside integral zone, accumulator cleared", error);
            self.integral_accumulator = T::zero();
        }
        T::from_int(error) - T::from_int(self.previous_error)
    }
}

/// A functional implementation of the closed-loop PIDF tick.
///
/// The controller only holds its gain source. The loop state is passed in and the next state
/// handed back by [`FuncClosedLoop::compute`], which makes each tick easy to replay and test.
#[derive(Clone, Debug)]
pub struct FuncClosedLoop<T: Real, G: GainSource<T>> {
    gains: G,
    _scalar: PhantomData<T>,
}

impl<T: Real, G: GainSource<T>> FuncClosedLoop<T, G> {
    /// Creates a controller reading its gains from `gains` on every tick.
    pub fn new(gains: G) -> Self {
        Self {
            gains,
            _scalar: PhantomData,
        }
    }

    /// Returns the gain source.
    pub fn gains(&self) -> &G {
        &self.gains
    }

    /// Returns the gain source mutably, e.g. to retune a fixed profile.
    pub fn gains_mut(&mut self) -> &mut G {
        &mut self.gains
    }

    /// Runs one tick.
    ///
    /// The steps run in a fixed order:
    /// 1. read the active gain profile;
    /// 2. `error = target - process_variable`, truncated to an integer;
    /// 3. on a cold start, clear the accumulator and seed `output` from `driver`, with a zero
    ///    derivative; otherwise accumulate the error if it lies within the integral zone (or clear
    ///    the accumulator if not) and take the error difference as the derivative;
    /// 4. sum the P, I, D and F terms;
    /// 5. remember the error and mark the loop running;
    /// 6. clamp a negative sum to zero if `one_direction_only`, then negate if `invert_output`;
    /// 7. move `output` toward the sum by at most the ramp rate, or copy it when the rate is 0.
    ///
    /// The limiter does not re-apply the one-direction clamp, see
    /// [`ClosedLoopState::output_violates_direction`].
    ///
    /// # Arguments
    /// - `state`: The loop state, with the target already set.
    /// - `process_variable`: The measured position or velocity.
    /// - `options`: Inversion and one-direction flags.
    /// - `driver`: The throttle source, read only on a cold start.
    ///
    /// # Returns
    /// The rate-limited command and the next state.
    pub fn compute<D: ThrottleSource>(
        &self,
        mut state: ClosedLoopState<T>,
        process_variable: i32,
        options: OutputOptions,
        driver: &D,
    ) -> (T, ClosedLoopState<T>) {
        let gains = self.gains.gain_profile();

        // In f64 so every i32 sample stays exact, whatever the precision of T
        let error = (state.target.into_f64() - f64::from(process_variable)) as i32;
        state.error = error;
        let abs_error = error.unsigned_abs();

        state.derivative = match state.phase {
            LoopPhase::Uninitialized => state.cold_start(driver),
            LoopPhase::Running => state.accumulate(&gains, error, abs_error),
        };

        let mut output_pre_ramp = scalar::mul_unsigned(T::from_int(error), gains.p());
        if state.integral_accumulator != T::zero() && gains.i() != T::zero() {
            output_pre_ramp =
                output_pre_ramp + scalar::mul_unsigned(state.integral_accumulator, gains.i());
        }
        output_pre_ramp = output_pre_ramp + scalar::mul_unsigned(state.derivative, gains.d());
        output_pre_ramp = output_pre_ramp + scalar::mul_signed(state.target, gains.f());

        state.previous_error = error;
        state.phase = LoopPhase::Running;

        if options.one_direction_only && output_pre_ramp < T::zero() {
            output_pre_ramp = T::zero();
        }
        if options.invert_output {
            output_pre_ramp = -output_pre_ramp;
        }
        state.output_pre_ramp = output_pre_ramp;

        state.output = match gains.closed_loop_ramp_rate() {
            0 => output_pre_ramp,
            rate => scalar::step_toward(state.output, output_pre_ramp, T::from_uint(rate)),
        };

        if state.output_violates_direction(options) {
            log::warning!(
                "ramp left output at {} against one-direction mode",
                state.output.to_int_saturating()
            );
        }

        (state.output, state)
    }
}

/// A stateful implementation of the closed-loop PIDF tick.
///
/// Owns the loop state, the gain source and the throttle source, so each tick is a single
/// `compute` call.
#[derive(Clone, Debug)]
pub struct ClosedLoop<T: Real, G: GainSource<T>, D: ThrottleSource> {
    state: ClosedLoopState<T>,
    controller: FuncClosedLoop<T, G>,
    driver: D,
}

impl<T: Real, G: GainSource<T>, D: ThrottleSource> ClosedLoop<T, G, D> {
    /// Creates an uninitialized loop with a zero target.
    pub fn new(gains: G, driver: D) -> Self {
        Self {
            state: ClosedLoopState::new_uninit(),
            controller: FuncClosedLoop::new(gains),
            driver,
        }
    }

    /// Runs one tick and returns the rate-limited command.
    /// See [`FuncClosedLoop::compute`].
    pub fn compute(&mut self, process_variable: i32, options: OutputOptions) -> T {
        let (output, state) =
            self.controller
                .compute(self.state, process_variable, options, &self.driver);
        self.state = state;
        output
    }

    /// Sets the setpoint for the next tick.
    pub fn set_target(&mut self, target: T) {
        self.state.set_target(target);
    }

    /// Returns the setpoint.
    pub fn target(&self) -> T {
        self.state.target()
    }

    /// Returns the last rate-limited command.
    pub fn output(&self) -> T {
        self.state.output()
    }

    /// Returns the full loop state.
    pub fn state(&self) -> &ClosedLoopState<T> {
        &self.state
    }

    /// Whether the loop has ticked since it was last (re)enabled.
    pub fn is_initialized(&self) -> bool {
        self.state.is_initialized()
    }

    /// Re-arms the cold start. See [`ClosedLoopState::reinitialize`].
    pub fn reinitialize(&mut self) {
        self.state.reinitialize();
    }

    /// Clears the integral accumulator.
    pub fn clear_integral_accumulator(&mut self) {
        self.state.clear_integral_accumulator();
    }

    /// Returns the gain source.
    pub fn gains(&self) -> &G {
        self.controller.gains()
    }

    /// Returns the gain source mutably.
    pub fn gains_mut(&mut self) -> &mut G {
        self.controller.gains_mut()
    }

    /// Returns the throttle source.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Returns the throttle source mutably.
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}
