//! Velocity step response of a brushed DC motor under the closed-loop tick, printed as CSV.
//! This demo requires the `--features simulation` flag to be enabled.
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

use closed_loop_pidf::closed_loop::{ClosedLoop, OutputOptions};
use closed_loop_pidf::profile::GainProfileBuilder;
use closed_loop_pidf::sim;
use closed_loop_pidf::throttle::{
    saturate_throttle, throttle_from_percent, throttle_to_percent, FULL_SCALE_THROTTLE,
};

use nalgebra as na;

const TICK_S: f64 = 0.001;
const STEP_TICKS: usize = 500;
const RAMP_PER_TICK: u32 = 4;
const ENABLE_THROTTLE_PERCENT: f64 = 20.0;

fn main() {
    let motor = sim::DcMotor {
        free_speed: 6000.0,
        time_constant: 0.05,
    };

    let profile = GainProfileBuilder::default()
        .p(0.05)
        .i(0.0001)
        .f(f64::from(FULL_SCALE_THROTTLE) / motor.free_speed)
        .integral_zone(500)
        .closed_loop_ramp_rate(RAMP_PER_TICK)
        .build()
        .expect("Invalid gain profile");

    // The loop is enabled while the driver still holds an open-loop command, so the ramp
    // starts from there
    let driver = sim::MotorDriver::new(saturate_throttle(throttle_from_percent(
        ENABLE_THROTTLE_PERCENT,
    )));
    let mut pid = ClosedLoop::new(profile, driver);
    let mut x = na::Vector2::<f64>::zeros();

    println!("time_s,target,velocity,throttle_percent");
    for tick in 0..4 * STEP_TICKS {
        // Square wave between standstill and half speed, reversing on the last period
        let target = match tick / STEP_TICKS {
            0 => 0.0,
            1 => 3000.0,
            2 => 0.0,
            _ => -3000.0,
        };
        pid.set_target(target);

        let output = pid.compute(motor.velocity(x), OutputOptions::default());
        let throttle = pid.driver_mut().apply(output);
        x = sim::rk4_step(|x| motor.f(x, throttle), x, TICK_S);

        println!(
            "{:.3},{},{:.1},{:.1}",
            tick as f64 * TICK_S,
            target,
            x[1],
            throttle_to_percent::<f64>(throttle)
        );
    }
}
