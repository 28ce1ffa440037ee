#![warn(missing_docs)]

//! # Closed-Loop PIDF Throttle Controller
//!
//! This library provides the 1 ms closed-loop tick of a brushed motor controller: it turns a
//! setpoint and a measured position or velocity into a ramp-limited throttle command.
//!
//! ## Features
//!
//! - Proportional, integral, derivative and feed-forward terms:
//!   - P, I and D are validated nonnegative magnitudes; the sign of each term follows the error.
//!   - F is signed and multiplies the setpoint.
//!
//! - Integral zone: the accumulator is cleared whenever the error magnitude reaches the zone,
//!   instead of winding up during large sustained errors.
//!
//! - Bumpless enable: the first tick after (re)enable seeds the ramp from the throttle the
//!   driver is already applying.
//!
//! - Closed-loop ramp: the command moves at most a configured number of throttle units per tick.
//!
//! - Output inversion and one-direction mode for reversed motors and single-ended sensors.
//!
//! - `no_std`, no allocation, no failure paths in the tick.
//!
//! ## Usage
//!
//! ### Functional controller
//!
//! The functional controller holds only its gain source; the loop state is passed in and handed
//! back on every tick.
//!
//! ```rust
//! use closed_loop_pidf::closed_loop::{ClosedLoopState, FuncClosedLoop, OutputOptions};
//! use closed_loop_pidf::profile::GainProfileBuilder;
//!
//! let profile = GainProfileBuilder::default()
//!     .p(2.0)
//!     .closed_loop_ramp_rate(10)
//!     .build()
//!     .expect("Invalid gain profile");
//! let pid = FuncClosedLoop::new(profile);
//!
//! // The driver reports it is idle
//! let driver = || 0;
//!
//! let mut state = ClosedLoopState::<f64>::new_uninit();
//! state.set_target(100.0);
//!
//! // Cold start: the ramp starts from the idle driver
//! let (output, state) = pid.compute(state, 0, OutputOptions::default(), &driver);
//! assert_eq!(state.output_pre_ramp(), 200.0);
//! assert_eq!(output, 10.0);
//!
//! let (output, _) = pid.compute(state, 0, OutputOptions::default(), &driver);
//! assert_eq!(output, 20.0);
//! ```
//!
//! ### Stateful controller
//!
//! The stateful controller owns its state, its gain source and its throttle source. Any
//! `Fn() -> GainProfile<T>` can stand in for the profile selection of the surrounding firmware.
//!
//! ```rust
//! use closed_loop_pidf::closed_loop::{ClosedLoop, OutputOptions};
//! use closed_loop_pidf::profile::{GainProfile, GainProfileBuilder};
//!
//! let slots: [GainProfile<f32>; 2] = [
//!     GainProfileBuilder::default().p(1.0).build().unwrap(),
//!     GainProfileBuilder::default().p(4.0).integral_zone(200).build().unwrap(),
//! ];
//! let selected = 1;
//!
//! let mut pid = ClosedLoop::new(move || slots[selected], || 0);
//! pid.set_target(50.0);
//!
//! let output = pid.compute(40, OutputOptions::new(false, true));
//! assert_eq!(output, 40.0);
//! assert!(pid.is_initialized());
//! ```
//!
//! ## Logging
//!
//! With the `defmt` feature the tick emits `debug`, `trace` and `warn` events through
//! [defmt](https://docs.rs/defmt). Without it, logging compiles to nothing.
//!
//! ## License
//!
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod log;

/// The closed-loop tick, its state and the functional and stateful controllers.
pub mod closed_loop;

/// Gain profiles, their builder and the gain source abstraction.
pub mod profile;

/// The real scalar abstraction and the arithmetic helpers used by the tick.
pub mod scalar;

/// The driver throttle source and throttle unit conversions.
pub mod throttle;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;
